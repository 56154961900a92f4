use std::collections::BTreeMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::prelude::*;

bitflags! {
    /// Set of sensors the player has installed.
    #[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Sensors: u8 {
        const CLEANLINESS = 1 << 0;
        const THERMAL = 1 << 1;
        const ATMOSPHERIC = 1 << 2;
        const TRACE = 1 << 3;
    }
}

#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
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
pub enum SensorType {
    Cleanliness,
    Thermal,
    Atmospheric,
    Trace,
}

impl SensorType {
    pub fn flag(self) -> Sensors {
        match self {
            SensorType::Cleanliness => Sensors::CLEANLINESS,
            SensorType::Thermal => Sensors::THERMAL,
            SensorType::Atmospheric => Sensors::ATMOSPHERIC,
            SensorType::Trace => Sensors::TRACE,
        }
    }

    /// The hazard field an active sensor shows as a map overlay.
    pub fn overlay(self) -> Option<HazardField> {
        match self {
            SensorType::Cleanliness => Some(HazardField::Dirt),
            SensorType::Thermal => Some(HazardField::Heat),
            SensorType::Atmospheric => Some(HazardField::Pressure),
            SensorType::Trace => None,
        }
    }
}

#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttachmentSlot {
    Tool,
    Utility,
}

#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Attachment {
    /// Cleans the surrounding tiles as well.
    Scrubber,
    /// Cleaning also knocks down heat and smoke.
    Extinguisher,
    /// Halves heat damage.
    HeatShield,
}

impl Attachment {
    pub fn slot(self) -> AttachmentSlot {
        match self {
            Attachment::Scrubber | Attachment::Extinguisher => {
                AttachmentSlot::Tool
            }
            Attachment::HeatShield => AttachmentSlot::Utility,
        }
    }
}

/// Hit points and heat exposure of the player or a crew member.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Vitals {
    pub hp: i32,
    pub max_hp: i32,
    /// Consecutive turns spent on a painfully hot tile.
    pub heat_exposure: u32,
}

impl Vitals {
    pub fn new(max_hp: i32) -> Self {
        Vitals {
            hp: max_hp,
            max_hp,
            heat_exposure: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
    }

    /// Apply one turn of heat at the given level, return damage taken.
    ///
    /// Damage lands every `heat_damage_period` consecutive turns at or
    /// above the pain threshold. Stepping off the heat resets the count.
    pub fn expose_to_heat(
        &mut self,
        config: &Config,
        heat: f32,
        shielded: bool,
    ) -> i32 {
        if heat < config.heat_pain_threshold {
            self.heat_exposure = 0;
            return 0;
        }

        self.heat_exposure += 1;
        if self.heat_exposure % config.heat_damage_period.max(1) != 0 {
            return 0;
        }
        let damage = if shielded {
            (config.heat_damage + 1) / 2
        } else {
            config.heat_damage
        };
        self.hp -= damage;
        damage
    }
}

/// The player's robot.
#[derive(Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Player {
    pub pos: IVec2,
    pub vitals: Vitals,
    /// Turns left during which movement and interaction fail.
    pub stun_turns: u32,
    pub attachments: BTreeMap<AttachmentSlot, Attachment>,
    pub sensors: Sensors,
    pub active_sensor: Option<SensorType>,
    pub power_cells: u32,
    /// Extra sight radius on top of the configured one.
    pub sight_bonus: i32,
}

impl Player {
    pub fn new(pos: IVec2, max_hp: i32) -> Self {
        Player {
            pos,
            vitals: Vitals::new(max_hp),
            ..Default::default()
        }
    }

    pub fn hp(&self) -> i32 {
        self.vitals.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.vitals.max_hp
    }

    pub fn is_alive(&self) -> bool {
        self.vitals.is_alive()
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_turns > 0
    }

    pub fn has_sensor(&self, sensor: SensorType) -> bool {
        self.sensors.contains(sensor.flag())
    }

    pub fn has_attachment(&self, attachment: Attachment) -> bool {
        self.attachments.get(&attachment.slot()) == Some(&attachment)
    }

    /// Fit an attachment, returning whatever was in the slot before.
    pub fn attach(&mut self, attachment: Attachment) -> Option<Attachment> {
        self.attachments.insert(attachment.slot(), attachment)
    }

    pub fn sight_radius(&self, config: &Config) -> i32 {
        config.fov_radius + self.sight_bonus
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn heat_damage_needs_sustained_exposure() {
        let config = Config::default();
        let mut v = Vitals::new(10);

        assert_eq!(v.expose_to_heat(&config, 80.0, false), 0);
        assert_eq!(v.expose_to_heat(&config, 80.0, false), 1);
        assert_eq!(v.hp, 9);

        // Leaving the heat resets the count.
        assert_eq!(v.expose_to_heat(&config, 10.0, false), 0);
        assert_eq!(v.expose_to_heat(&config, 80.0, false), 0);
        assert_eq!(v.hp, 9);
    }

    #[test]
    fn heat_shield_halves_damage() {
        let config = Config {
            heat_damage: 4,
            heat_damage_period: 1,
            ..Default::default()
        };
        let mut v = Vitals::new(10);
        assert_eq!(v.expose_to_heat(&config, 60.0, true), 2);
        assert_eq!(v.expose_to_heat(&config, 60.0, false), 4);
        assert_eq!(v.hp, 4);
    }

    #[test]
    fn attachments_share_slots() {
        let mut p = Player::new(IVec2::ZERO, 10);
        assert_eq!(p.attach(Attachment::Scrubber), None);
        assert_eq!(
            p.attach(Attachment::Extinguisher),
            Some(Attachment::Scrubber)
        );
        assert!(p.has_attachment(Attachment::Extinguisher));
        assert!(!p.has_attachment(Attachment::Scrubber));
        p.attach(Attachment::HeatShield);
        assert_eq!(p.attachments.len(), 2);
    }

    #[test]
    fn heal_caps_at_max() {
        let mut v = Vitals::new(5);
        v.hp = 1;
        v.heal(10);
        assert_eq!(v.hp, 5);
    }
}
