//! # Simulation Configuration
//!
//! Every tuning constant used by the schedulers, the match engine and the
//! discipline bookkeeping lives here, grouped per subsystem.
//!
//! ```rust
//! use season_core::config::SimConfig;
//!
//! let config = SimConfig::default();
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeasonError};

/// Outer bound: full draw restarts (pairing + orientation + scheduling).
pub const DEFAULT_DRAW_ATTEMPTS: u32 = 200;
/// Phase A bound: opponent assignment retries.
pub const DEFAULT_PAIRING_ATTEMPTS: u32 = 200;
/// Phase B bound: round scheduling retries for one pairing.
pub const DEFAULT_SCHEDULING_ATTEMPTS: u32 = 50;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub engine: MatchEngineConfig,
    pub shootout: ShootoutConfig,
    pub swiss: SwissConfig,
    pub discipline: DisciplineConfig,
}

impl SimConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: SimConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would leave an algorithm ill-defined.
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.shootout.validate()?;
        self.swiss.validate()?;
        Ok(())
    }
}

/// Match engine parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchEngineConfig {
    // === Expected goals (full time) ===
    /// Home baseline xG (default: 0.8)
    pub home_base_xg: f64,
    /// Away baseline xG (default: 0.5)
    pub away_base_xg: f64,
    /// xG added per unit of strength share (default: 1.4)
    pub strength_xg_weight: f64,

    // === Expected goals (extra time) ===
    pub extra_time_home_base_xg: f64,
    pub extra_time_away_base_xg: f64,
    pub extra_time_strength_xg_weight: f64,

    // === Event probabilities ===
    /// Chance that a goal is an own goal (default: 0.02)
    pub own_goal_chance: f64,
    /// Chance that a goal has an assist (default: 0.6)
    pub assist_chance: f64,
    /// Poisson lambda for yellow cards per side (default: 1.7)
    pub yellow_card_lambda: f64,
    /// Chance of one direct red per side (default: 0.015)
    pub direct_red_chance: f64,
    /// Chance of one injury per side (default: 0.05)
    pub injury_chance: f64,

    // === Minute windows ===
    /// Last minute a regulation goal or card can happen, stoppage included (default: 93)
    pub last_regulation_minute: u8,
    /// Last minute a regulation injury can happen (default: 85)
    pub last_injury_minute: u8,
    /// Draws before accepting a colliding minute (default: 20)
    pub minute_attempts: u32,
}

impl Default for MatchEngineConfig {
    fn default() -> Self {
        Self {
            home_base_xg: 0.8,
            away_base_xg: 0.5,
            strength_xg_weight: 1.4,

            extra_time_home_base_xg: 0.27,
            extra_time_away_base_xg: 0.17,
            extra_time_strength_xg_weight: 0.47,

            own_goal_chance: 0.02,
            assist_chance: 0.6,
            yellow_card_lambda: 1.7,
            direct_red_chance: 0.015,
            injury_chance: 0.05,

            last_regulation_minute: 93,
            last_injury_minute: 85,
            minute_attempts: 20,
        }
    }
}

impl MatchEngineConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        for (name, p) in [
            ("own_goal_chance", self.own_goal_chance),
            ("assist_chance", self.assist_chance),
            ("direct_red_chance", self.direct_red_chance),
            ("injury_chance", self.injury_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SeasonError::InvalidConfig(format!("{name} must be in [0, 1], got {p}")));
            }
        }
        for (name, v) in [
            ("home_base_xg", self.home_base_xg),
            ("away_base_xg", self.away_base_xg),
            ("strength_xg_weight", self.strength_xg_weight),
            ("extra_time_home_base_xg", self.extra_time_home_base_xg),
            ("extra_time_away_base_xg", self.extra_time_away_base_xg),
            ("extra_time_strength_xg_weight", self.extra_time_strength_xg_weight),
            ("yellow_card_lambda", self.yellow_card_lambda),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SeasonError::InvalidConfig(format!("{name} must be >= 0, got {v}")));
            }
        }
        if self.last_regulation_minute < 90 || self.last_regulation_minute > 120 {
            return Err(SeasonError::InvalidConfig(format!(
                "last_regulation_minute must be in 90..=120, got {}",
                self.last_regulation_minute
            )));
        }
        if self.last_injury_minute == 0 || self.last_injury_minute > self.last_regulation_minute {
            return Err(SeasonError::InvalidConfig(format!(
                "last_injury_minute must be in 1..={}, got {}",
                self.last_regulation_minute, self.last_injury_minute
            )));
        }
        if self.minute_attempts == 0 {
            return Err(SeasonError::InvalidConfig("minute_attempts must be > 0".into()));
        }
        Ok(())
    }
}

/// Penalty shootout parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootoutConfig {
    /// Kicks per side before sudden death (default: 5)
    pub base_rounds: u8,
    /// Conversion probability per kick (default: 0.77)
    pub conversion: f64,
}

impl Default for ShootoutConfig {
    fn default() -> Self {
        Self { base_rounds: 5, conversion: 0.77 }
    }
}

impl ShootoutConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        // 0 or 1 would never separate the sides in sudden death.
        if !(self.conversion > 0.0 && self.conversion < 1.0) {
            return Err(SeasonError::InvalidConfig(format!(
                "shootout conversion must be in (0, 1), got {}",
                self.conversion
            )));
        }
        if self.base_rounds == 0 {
            return Err(SeasonError::InvalidConfig("shootout base_rounds must be > 0".into()));
        }
        Ok(())
    }
}

/// Swiss league-phase draw parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwissConfig {
    pub pot_count: u8,
    pub pot_size: usize,
    pub opponents_per_pot: usize,
    pub max_opponents_per_country: usize,
    pub draw_attempts: u32,
    pub pairing_attempts: u32,
    pub scheduling_attempts: u32,
}

impl Default for SwissConfig {
    fn default() -> Self {
        Self {
            pot_count: 4,
            pot_size: 9,
            opponents_per_pot: 2,
            max_opponents_per_country: 2,
            draw_attempts: DEFAULT_DRAW_ATTEMPTS,
            pairing_attempts: DEFAULT_PAIRING_ATTEMPTS,
            scheduling_attempts: DEFAULT_SCHEDULING_ATTEMPTS,
        }
    }
}

impl SwissConfig {
    pub fn team_count(&self) -> usize {
        self.pot_count as usize * self.pot_size
    }

    /// Opponents (and rounds) per team.
    pub fn opponents_per_team(&self) -> usize {
        self.pot_count as usize * self.opponents_per_pot
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.pot_count == 0 || self.pot_size == 0 || self.opponents_per_pot == 0 {
            return Err(SeasonError::InvalidConfig("swiss pots must be non-empty".into()));
        }
        // Euler orientation needs even degree; round matchings need an even field.
        if self.opponents_per_team() % 2 != 0 {
            return Err(SeasonError::InvalidConfig(format!(
                "opponents per team must be even, got {}",
                self.opponents_per_team()
            )));
        }
        if self.team_count() % 2 != 0 {
            return Err(SeasonError::InvalidConfig(format!(
                "swiss team count must be even, got {}",
                self.team_count()
            )));
        }
        if self.opponents_per_pot >= self.pot_size {
            return Err(SeasonError::InvalidConfig(format!(
                "opponents_per_pot ({}) must be smaller than pot_size ({})",
                self.opponents_per_pot, self.pot_size
            )));
        }
        if self.draw_attempts == 0 || self.pairing_attempts == 0 || self.scheduling_attempts == 0 {
            return Err(SeasonError::InvalidConfig("swiss attempt counts must be > 0".into()));
        }
        Ok(())
    }
}

/// Suspension lengths (matches)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisciplineConfig {
    pub second_yellow_ban: u8,
    pub direct_red_ban: u8,
}

impl Default for DisciplineConfig {
    fn default() -> Self {
        Self { second_yellow_ban: 1, direct_red_ban: 3 }
    }
}
