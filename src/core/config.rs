//! Commander configuration with documented constants
//!
//! All tunable numbers of the BDI commander are collected here. The defaults
//! reproduce the reference behaviour; TOML files under `data/commanders/` can
//! override any subset of them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::core::error::{CommanderError, Result};

/// Map geometry shared by every team grid
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Playable width in world units, centred on the origin
    pub width: f32,
    /// Playable height in world units, centred on the origin
    pub height: f32,
    /// Side of a vision/location cell in world units
    pub cell_size: f32,
    /// Location cells per influence region side (a region is block×block cells)
    pub influence_block: i32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 2048.0,
            height: 2048.0,
            cell_size: 16.0,
            influence_block: 4,
        }
    }
}

/// Cadences of the commander loop (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How often desires are re-arbitrated
    pub deliberation_interval: f32,
    /// Execution time after which an intention is dropped regardless of relevance
    pub intention_timeout: f32,
    /// Interval between guard sweeps
    pub guard_sweep_interval: f32,
    /// Lifetime of entries in the tactical event log
    pub event_ttl: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            deliberation_interval: 1.25,
            intention_timeout: 10.0,
            guard_sweep_interval: 2.0,
            event_ttl: 5.0,
        }
    }
}

/// Thresholds used while deriving beliefs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeliefConfig {
    /// Health fraction below which a unit should retreat
    pub low_health_fraction: f32,
    /// Health fraction above which an attacker counts as healthy
    pub attacker_health_fraction: f32,
    /// Health fraction above which a scout counts as healthy
    pub scout_health_fraction: f32,
    /// Seconds after which a cell is considered unexplored again
    pub unexplored_age: f32,
    /// Unexplored cells closer than this (cells) to the scouts are ignored
    pub scout_band_min: f32,
    /// Unexplored cells farther than this (cells) from the scouts are ignored
    pub scout_band_max: f32,
    /// An enemy within this many cells of the base means the camp is under attack
    pub camp_threat_radius: f32,
}

impl Default for BeliefConfig {
    fn default() -> Self {
        Self {
            low_health_fraction: 0.3,
            attacker_health_fraction: 0.3,
            scout_health_fraction: 0.25,
            unexplored_age: 15.0,
            scout_band_min: 15.0,
            scout_band_max: 64.0,
            camp_threat_radius: 10.0,
        }
    }
}

/// Influence field parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluenceConfig {
    /// Regions farther than this from a unit receive nothing
    pub spread_radius: i32,
    /// A sub-cell seen more recently than this (seconds) counts toward confidence
    pub confidence_window: f32,
    /// Minimum recently seen sub-cells for a region to be confident
    pub confidence_min_cells: usize,
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        Self {
            spread_radius: 3,
            confidence_window: 5.0,
            confidence_min_cells: 4,
        }
    }
}

/// Plan tuning (world units unless noted)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub retreat_jitter: f32,
    pub march_jitter: f32,
    pub capture_jitter: f32,
    pub defend_radius: f32,
    pub defend_max_posts: usize,
    /// Defenders attack enemies closer than this
    pub defend_engage_range: f32,
    /// Assault location-index fallback radius for enemy units
    pub assault_unit_range: f32,
    /// Assault location-index fallback radius for enemy camps
    pub assault_enemy_camp_range: f32,
    /// Assault location-index fallback radius for neutral camps
    pub assault_neutral_camp_range: f32,
    /// Capture squads attack their camp directly inside this range
    pub capture_strike_range: f32,
    /// Maximum units per assault phase
    pub squad_size: usize,
    pub units_per_camp: usize,
    /// Scout ring radius in cells
    pub scout_ring_radius: f32,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            retreat_jitter: 40.0,
            march_jitter: 40.0,
            capture_jitter: 30.0,
            defend_radius: 60.0,
            defend_max_posts: 8,
            defend_engage_range: 250.0,
            assault_unit_range: 250.0,
            assault_enemy_camp_range: 300.0,
            assault_neutral_camp_range: 200.0,
            capture_strike_range: 150.0,
            squad_size: 5,
            units_per_camp: 3,
            scout_ring_radius: 2.0,
        }
    }
}

/// Complete commander configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommanderConfig {
    /// Name of this profile (set from filename)
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub beliefs: BeliefConfig,
    #[serde(default)]
    pub influence: InfluenceConfig,
    #[serde(default)]
    pub plans: PlanConfig,
    /// Seed for plan jitter and guard sweeps
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    42
}

impl Default for CommanderConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            map: MapConfig::default(),
            timing: TimingConfig::default(),
            beliefs: BeliefConfig::default(),
            influence: InfluenceConfig::default(),
            plans: PlanConfig::default(),
            seed: default_seed(),
        }
    }
}

impl CommanderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.map.cell_size <= 0.0 || self.map.width <= 0.0 || self.map.height <= 0.0 {
            return Err(CommanderError::InvalidConfig(
                "map dimensions and cell_size must be positive".into(),
            ));
        }

        if self.map.influence_block < 1 {
            return Err(CommanderError::InvalidConfig(format!(
                "influence_block ({}) must be at least 1",
                self.map.influence_block
            )));
        }

        if self.timing.deliberation_interval <= 0.0 || self.timing.intention_timeout <= 0.0 {
            return Err(CommanderError::InvalidConfig(
                "deliberation_interval and intention_timeout must be positive".into(),
            ));
        }

        if self.beliefs.scout_band_min >= self.beliefs.scout_band_max {
            return Err(CommanderError::InvalidConfig(format!(
                "scout_band_min ({}) should be < scout_band_max ({})",
                self.beliefs.scout_band_min, self.beliefs.scout_band_max
            )));
        }

        let block_cells = (self.map.influence_block * self.map.influence_block) as usize;
        if self.influence.confidence_min_cells > block_cells {
            return Err(CommanderError::InvalidConfig(format!(
                "confidence_min_cells ({}) exceeds cells per region ({})",
                self.influence.confidence_min_cells, block_cells
            )));
        }

        if self.plans.squad_size == 0 {
            return Err(CommanderError::InvalidConfig("squad_size must be positive".into()));
        }

        Ok(())
    }
}

/// Load a commander profile from TOML
///
/// Loads from `data/commanders/{name}.toml`
pub fn load_config(name: &str) -> Result<CommanderConfig> {
    let path = config_path(name);

    let contents = fs::read_to_string(&path).map_err(|source| CommanderError::ConfigRead {
        path: path.display().to_string(),
        source,
    })?;

    let mut config = parse_config(&contents)?;
    config.name = name.to_string();
    Ok(config)
}

/// Parse and validate a commander profile from a TOML string
pub fn parse_config(contents: &str) -> Result<CommanderConfig> {
    let config: CommanderConfig = toml::from_str(contents)?;
    if let Err(e) = config.validate() {
        tracing::warn!("Rejected commander config: {}", e);
        return Err(e);
    }
    Ok(config)
}

/// Get path to a commander profile
fn config_path(name: &str) -> PathBuf {
    PathBuf::from("data/commanders").join(format!("{}.toml", name))
}
