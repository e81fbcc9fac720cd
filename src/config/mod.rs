//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::game::entity::Team;
use crate::game::geometry::Vec2;
use crate::game::physics::BouncePolicy;
use crate::game::round::BallPlacement;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Directory holding the browser client bundle
    pub static_dir: PathBuf,
    /// Allowed CORS origins (comma-separated); any origin when unset
    pub client_origin: Option<String>,
    /// Simulation tuning
    pub game: GameConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // PORT wins over SERVER_ADDR, matching common PaaS conventions
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port.trim()),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            client_origin: lookup("CLIENT_ORIGIN").filter(|s| !s.trim().is_empty()),
            game: GameConfig::from_lookup(&lookup)?,
        })
    }
}

/// Gameplay constants. Defaults reproduce the classic two-player pitch.
#[derive(Clone, Debug)]
pub struct GameConfig {
    // Field
    pub field_width: f32,
    pub field_height: f32,
    /// Players are kept this far from every edge
    pub player_margin: f32,

    // Player movement
    /// Velocity added per tick for each held direction
    pub player_accel: f32,
    /// Velocity multiplier applied before acceleration
    pub player_friction: f32,

    // Ball
    pub ball_radius: f32,
    pub ball_friction: f32,
    /// Velocity components below this are zeroed
    pub ball_stop_speed: f32,
    pub bounce: BouncePolicy,

    // Collisions
    pub player_collision_distance: f32,
    pub ball_collision_distance: f32,
    /// Ball impulse per unit of player/ball overlap
    pub kick_strength: f32,
    /// Extra ball impulse per unit of player speed
    pub kick_speed_factor: f32,

    // Explicit kicks and charged shots
    pub kick_range: f32,
    pub kick_impulse: f32,
    /// Charge gained per tick while charging
    pub charge_rate: f32,
    pub shot_power_min: f32,
    pub shot_power_max: f32,

    // Goals and rounds
    /// Width of each goal mouth measured from its end line
    pub goal_depth: f32,
    /// Half of the goal mouth's vertical extent around the field centre
    pub goal_half_height: f32,
    pub countdown_secs: f32,
    pub ball_placement: BallPlacement,
    /// Distance from centre used by the conceding-side placements
    pub kickoff_offset: f32,
    /// Team credited when the ball enters the left mouth
    pub left_goal_scorer: Team,
    pub restrict_scorer_touch: bool,

    // Roster
    pub roster_slots: Vec<Vec2>,
    pub max_players: usize,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_width: 1000.0,
            field_height: 700.0,
            player_margin: 50.0,
            player_accel: 0.5,
            player_friction: 0.95,
            ball_radius: 15.0,
            ball_friction: 0.99,
            ball_stop_speed: 0.1,
            bounce: BouncePolicy::Elastic,
            player_collision_distance: 40.0,
            ball_collision_distance: 35.0,
            kick_strength: 0.5,
            kick_speed_factor: 0.0,
            kick_range: 40.0,
            kick_impulse: 2.0,
            charge_rate: 2.0,
            shot_power_min: 4.0,
            shot_power_max: 20.0,
            goal_depth: 20.0,
            goal_half_height: 100.0,
            countdown_secs: 5.0,
            ball_placement: BallPlacement::Center,
            kickoff_offset: 60.0,
            left_goal_scorer: Team::Blue,
            restrict_scorer_touch: false,
            roster_slots: vec![Vec2::new(100.0, 350.0), Vec2::new(900.0, 350.0)],
            max_players: 8,
            seed: 0x5eed_ba11,
        }
    }
}

impl GameConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut game = GameConfig::default();

        if let Some(v) = parse_var(lookup, "KICK_STRENGTH")? {
            game.kick_strength = v;
        }
        if let Some(v) = parse_var(lookup, "KICK_SPEED_FACTOR")? {
            game.kick_speed_factor = v;
        }
        if let Some(v) = parse_var(lookup, "GOAL_COUNTDOWN_SECS")? {
            game.countdown_secs = v;
        }
        if let Some(v) = parse_var(lookup, "BALL_BOUNCE")? {
            game.bounce = v;
        }
        if let Some(v) = parse_var(lookup, "BALL_PLACEMENT")? {
            game.ball_placement = v;
        }
        if let Some(v) = parse_var(lookup, "LEFT_GOAL_SCORER")? {
            game.left_goal_scorer = v;
        }
        if let Some(v) = parse_var(lookup, "RESTRICT_SCORER_TOUCH")? {
            game.restrict_scorer_touch = v;
        }
        if let Some(v) = parse_var(lookup, "MAX_PLAYERS")? {
            game.max_players = v;
        }
        if let Some(v) = parse_var(lookup, "GAME_SEED")? {
            game.seed = v;
        }

        game.validate()?;
        Ok(game)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let tuning = [
            self.field_width,
            self.field_height,
            self.player_margin,
            self.player_accel,
            self.player_friction,
            self.ball_radius,
            self.ball_friction,
            self.ball_stop_speed,
            self.player_collision_distance,
            self.ball_collision_distance,
            self.kick_strength,
            self.kick_speed_factor,
            self.kick_range,
            self.kick_impulse,
            self.charge_rate,
            self.shot_power_min,
            self.shot_power_max,
            self.goal_depth,
            self.goal_half_height,
            self.countdown_secs,
            self.kickoff_offset,
        ];
        if !tuning.iter().all(|v| v.is_finite())
            || !self.roster_slots.iter().all(|s| s.x.is_finite() && s.y.is_finite())
        {
            return Err(ConfigError::OutOfRange("tuning values must be finite"));
        }
        if let BouncePolicy::Damped { loss } = self.bounce {
            if !loss.is_finite() {
                return Err(ConfigError::OutOfRange("bounce loss must be finite"));
            }
        }

        if self.field_width <= self.player_margin * 2.0
            || self.field_height <= self.player_margin * 2.0
        {
            return Err(ConfigError::OutOfRange("field smaller than player margins"));
        }
        if self.max_players == 0 {
            return Err(ConfigError::OutOfRange("MAX_PLAYERS must be at least 1"));
        }
        if self.countdown_secs < 0.0 {
            return Err(ConfigError::OutOfRange("GOAL_COUNTDOWN_SECS must be non-negative"));
        }
        if self.kick_strength < 0.0 || self.kick_speed_factor < 0.0 {
            return Err(ConfigError::OutOfRange("kick factors must be non-negative"));
        }
        Ok(())
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.field_width / 2.0, self.field_height / 2.0)
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("Configuration out of range: {0}")]
    OutOfRange(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
