use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use util::Logos;

use crate::{prelude::*, Attachment, AttachmentSlot, Player, SensorType};

/// Tunable simulation constants.
///
/// Everything here is fixed for the duration of a game and saved along with
/// the game state, so a restored game runs on the same numbers it started
/// with. Config files are IDM and may leave out any field.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub fov_radius: i32,

    /// Fraction of the neighbor heat difference that flows per turn.
    pub heat_diffusion: f32,
    pub heat_decay: f32,
    pub relay_heat: f32,
    pub relay_smoke: f32,
    pub breach_heat: f32,

    /// Tiles at least this hot start producing smoke.
    pub smoke_ignition_heat: f32,
    pub smoke_from_heat: f32,
    pub smoke_diffusion: f32,
    pub smoke_decay: f32,
    /// Smoke above this blocks sight and hides entities.
    pub smoke_sight_block: f32,

    pub heat_pain_threshold: f32,
    /// Consecutive turns of heat exposure per point of damage.
    pub heat_damage_period: u32,
    pub heat_damage: i32,

    /// Walkable steps from a breach that lose pressure.
    pub breach_reach: usize,
    pub pressure_loss: f32,
    pub valve_restore: f32,
    pub pressure_danger: f32,

    /// Turns between dirt accumulation ticks.
    pub dirt_period: u64,
    pub dirt_amount: f32,
    pub clean_amount: f32,
    pub service_bot_scrub: f32,

    pub sensor_range: i32,
    pub patrol_stun: u32,
    pub medkit_heal: i32,

    pub clean_milestone: u32,
    pub relay_milestone: usize,
    pub deduction_milestone: usize,
    pub evacuation_goal: usize,
}

// Default tunables.

pub const DEFAULT_FOV_RADIUS: i32 = 8;

pub const DEFAULT_HEAT_DIFFUSION: f32 = 0.05;
pub const DEFAULT_HEAT_DECAY: f32 = 1.0;
pub const DEFAULT_RELAY_HEAT: f32 = 12.0;
pub const DEFAULT_RELAY_SMOKE: f32 = 4.0;
pub const DEFAULT_BREACH_HEAT: f32 = 3.0;

pub const DEFAULT_SMOKE_IGNITION_HEAT: f32 = 60.0;
pub const DEFAULT_SMOKE_FROM_HEAT: f32 = 2.0;
pub const DEFAULT_SMOKE_DIFFUSION: f32 = 0.1;
pub const DEFAULT_SMOKE_DECAY: f32 = 1.5;
pub const DEFAULT_SMOKE_SIGHT_BLOCK: f32 = 50.0;

pub const DEFAULT_HEAT_PAIN_THRESHOLD: f32 = 50.0;
pub const DEFAULT_HEAT_DAMAGE_PERIOD: u32 = 2;
pub const DEFAULT_HEAT_DAMAGE: i32 = 1;

pub const DEFAULT_BREACH_REACH: usize = 6;
pub const DEFAULT_PRESSURE_LOSS: f32 = 2.0;
pub const DEFAULT_VALVE_RESTORE: f32 = 4.0;
pub const DEFAULT_PRESSURE_DANGER: f32 = 25.0;

pub const DEFAULT_DIRT_PERIOD: u64 = 10;
pub const DEFAULT_DIRT_AMOUNT: f32 = 1.0;
pub const DEFAULT_CLEAN_AMOUNT: f32 = 40.0;
pub const DEFAULT_SERVICE_BOT_SCRUB: f32 = 5.0;

pub const DEFAULT_SENSOR_RANGE: i32 = 5;
pub const DEFAULT_PATROL_STUN: u32 = 2;
pub const DEFAULT_MEDKIT_HEAL: i32 = 4;

pub const DEFAULT_CLEAN_MILESTONE: u32 = 5;
pub const DEFAULT_RELAY_MILESTONE: usize = 2;
pub const DEFAULT_DEDUCTION_MILESTONE: usize = 1;
pub const DEFAULT_EVACUATION_GOAL: usize = 2;

impl Default for Config {
    fn default() -> Self {
        Config {
            fov_radius: DEFAULT_FOV_RADIUS,

            heat_diffusion: DEFAULT_HEAT_DIFFUSION,
            heat_decay: DEFAULT_HEAT_DECAY,
            relay_heat: DEFAULT_RELAY_HEAT,
            relay_smoke: DEFAULT_RELAY_SMOKE,
            breach_heat: DEFAULT_BREACH_HEAT,

            smoke_ignition_heat: DEFAULT_SMOKE_IGNITION_HEAT,
            smoke_from_heat: DEFAULT_SMOKE_FROM_HEAT,
            smoke_diffusion: DEFAULT_SMOKE_DIFFUSION,
            smoke_decay: DEFAULT_SMOKE_DECAY,
            smoke_sight_block: DEFAULT_SMOKE_SIGHT_BLOCK,

            heat_pain_threshold: DEFAULT_HEAT_PAIN_THRESHOLD,
            heat_damage_period: DEFAULT_HEAT_DAMAGE_PERIOD,
            heat_damage: DEFAULT_HEAT_DAMAGE,

            breach_reach: DEFAULT_BREACH_REACH,
            pressure_loss: DEFAULT_PRESSURE_LOSS,
            valve_restore: DEFAULT_VALVE_RESTORE,
            pressure_danger: DEFAULT_PRESSURE_DANGER,

            dirt_period: DEFAULT_DIRT_PERIOD,
            dirt_amount: DEFAULT_DIRT_AMOUNT,
            clean_amount: DEFAULT_CLEAN_AMOUNT,
            service_bot_scrub: DEFAULT_SERVICE_BOT_SCRUB,

            sensor_range: DEFAULT_SENSOR_RANGE,
            patrol_stun: DEFAULT_PATROL_STUN,
            medkit_heal: DEFAULT_MEDKIT_HEAL,

            clean_milestone: DEFAULT_CLEAN_MILESTONE,
            relay_milestone: DEFAULT_RELAY_MILESTONE,
            deduction_milestone: DEFAULT_DEDUCTION_MILESTONE,
            evacuation_goal: DEFAULT_EVACUATION_GOAL,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let text = fs::read_to_string(path)?;
        text.parse()
    }

    /// Check that the numbers can drive a stable simulation.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(Error::Config(msg.to_owned()));

        // Explicit diffusion over four neighbors goes unstable past this.
        if !(0.0..=0.25).contains(&self.heat_diffusion)
            || !(0.0..=0.25).contains(&self.smoke_diffusion)
        {
            return fail("diffusion rates must be between 0 and 0.25");
        }
        if self.heat_damage_period == 0 {
            return fail("heat-damage-period must be at least 1");
        }
        if self.dirt_period == 0 {
            return fail("dirt-period must be at least 1");
        }
        if self.fov_radius < 1 {
            return fail("fov-radius must be at least 1");
        }

        for (name, value) in [
            ("heat-decay", self.heat_decay),
            ("relay-heat", self.relay_heat),
            ("relay-smoke", self.relay_smoke),
            ("breach-heat", self.breach_heat),
            ("smoke-ignition-heat", self.smoke_ignition_heat),
            ("smoke-from-heat", self.smoke_from_heat),
            ("smoke-decay", self.smoke_decay),
            ("smoke-sight-block", self.smoke_sight_block),
            ("heat-pain-threshold", self.heat_pain_threshold),
            ("pressure-loss", self.pressure_loss),
            ("valve-restore", self.valve_restore),
            ("pressure-danger", self.pressure_danger),
            ("dirt-amount", self.dirt_amount),
            ("clean-amount", self.clean_amount),
            ("service-bot-scrub", self.service_bot_scrub),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        if self.heat_damage < 0 || self.medkit_heal < 0 || self.sensor_range < 0
        {
            return fail("damage, healing and ranges must not be negative");
        }
        Ok(())
    }
}

impl std::str::FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let config: Config =
            idm::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Starting loadout of the player robot.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Archetype {
    /// Scrubber and cleanliness sensor, tough chassis.
    #[default]
    Janitor,
    /// Thermal sensor and extended sight range.
    Scout,
    /// Atmospheric sensor and a heat shield, fragile.
    Medic,
}

impl Archetype {
    pub fn player(self, pos: IVec2) -> Player {
        let mut player = match self {
            Archetype::Janitor => Player::new(pos, 12),
            Archetype::Scout => {
                let mut p = Player::new(pos, 10);
                p.sight_bonus = 2;
                p
            }
            Archetype::Medic => Player::new(pos, 8),
        };

        let (sensor, tool) = match self {
            Archetype::Janitor => {
                (SensorType::Cleanliness, Some(Attachment::Scrubber))
            }
            Archetype::Scout => (SensorType::Thermal, None),
            Archetype::Medic => (SensorType::Atmospheric, None),
        };
        player.sensors.insert(sensor.flag());
        if let Some(tool) = tool {
            player.attachments.insert(AttachmentSlot::Tool, tool);
        }
        if self == Archetype::Medic {
            player
                .attachments
                .insert(AttachmentSlot::Utility, Attachment::HeatShield);
        }
        player
    }
}

/// Everything needed to generate a new station.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WorldSpec {
    pub seed: Logos,
    pub width: i32,
    pub height: i32,
    pub archetype: Archetype,
}

impl Default for WorldSpec {
    fn default() -> Self {
        WorldSpec {
            seed: Default::default(),
            width: 48,
            height: 32,
            archetype: Default::default(),
        }
    }
}

impl WorldSpec {
    pub fn new(seed: Logos) -> Self {
        WorldSpec {
            seed,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < 32 || self.height < 20 {
            return Err(Error::Config(format!(
                "station must be at least 32x20, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > 256 || self.height > 256 {
            return Err(Error::Config("station is too large".into()));
        }
        Ok(())
    }
}
