//! Story content of the generated station.

use crate::{
    entity::*, Choice, Clue, Deduction, EntityKind, EntityState, Mystery,
    SensorType, Vitals,
};

pub const CREW: [&str; 3] = ["Chief Okafor", "Engineer Vasquez", "Doctor Lin"];

/// Rooms in generation order. The first is where the player starts and the
/// last is the sealed data vault.
pub const ROOMS: [(&str, crate::Zone); 10] = {
    use crate::Zone::*;
    [
        ("Maintenance Bay", Engineering),
        ("Reactor Control", Engineering),
        ("Hydroponics", Habitat),
        ("Crew Quarters", Habitat),
        ("Medbay", Habitat),
        ("Laboratory", Science),
        ("Cargo Hold", Cargo),
        ("Observation Deck", Science),
        ("Bridge", Command),
        ("Data Vault", Command),
    ]
};

/// Evidence-bearing entities in placement order.
pub fn clue_carriers() -> Vec<EntityState> {
    let clue = |id: &str, text: &str| Some(Clue::new(id, text));
    vec![
        EntityState::LogTerminal(LogTerminal {
            title: "Maintenance log".into(),
            read: false,
            clue: clue(
                "maint-log",
                "Maintenance log: Chief Okafor signed off the aft ring seals \
                 two hours before the breach.",
            ),
        }),
        EntityState::CrewItem(CrewItem {
            name: "torn ID badge".into(),
            examined: false,
            clue: clue(
                "torn-badge",
                "A torn ID badge belonging to Engineer Vasquez.",
            ),
        }),
        EntityState::EvidenceTrace(EvidenceTrace {
            sensor: SensorType::Thermal,
            examined: false,
            clue: clue(
                "scorch-marks",
                "Scorch marks on the hull plating. The breach was cut from \
                 the inside with a plasma torch.",
            ),
        }),
        EntityState::Console(Console {
            accessed: false,
            clue: clue(
                "hatch-access",
                "Security record: Vasquez's credentials opened the aft \
                 service hatch at 02:14.",
            ),
        }),
        EntityState::EvidenceTrace(EvidenceTrace {
            sensor: SensorType::Trace,
            examined: false,
            clue: clue(
                "sealant-trail",
                "A trail of sealant residue leads from the breach toward the \
                 escape pods.",
            ),
        }),
        EntityState::LogTerminal(LogTerminal {
            title: "Personal message".into(),
            read: false,
            clue: clue(
                "unsent-message",
                "Unsent message from Vasquez: \"They're selling the core \
                 data. I can't let that ship leave with it.\"",
            ),
        }),
        EntityState::CrewItem(CrewItem {
            name: "cargo manifest".into(),
            examined: false,
            clue: clue(
                "cargo-manifest",
                "Cargo manifest: the data core was booked for transfer to an \
                 unregistered buyer.",
            ),
        }),
    ]
}

pub fn data_core() -> EntityState {
    EntityState::DataCore(DataCore {
        transmitted: false,
        clue: Some(Clue::new(
            "core-contents",
            "The data core holds the station's research archive and the \
             buyer's contract.",
        )),
    })
}

pub fn crew(name: &str) -> EntityState {
    EntityState::CrewNpc(CrewNpc {
        name: name.into(),
        vitals: Vitals::new(6),
        ..Default::default()
    })
}

pub fn mystery() -> Mystery {
    Mystery {
        deductions: vec![
            Deduction::new(
                "breach-cause",
                ["scorch-marks", "maint-log"],
                "What caused the hull breach?",
                [
                    "micrometeorite strike",
                    "deliberate cut from inside",
                    "seal fatigue",
                ],
                "deliberate cut from inside",
            ),
            Deduction::new(
                "culprit",
                ["torn-badge", "hatch-access"],
                "Who opened the aft hatch?",
                ["Chief Okafor", "Engineer Vasquez", "Doctor Lin"],
                "Engineer Vasquez",
            ),
            Deduction::new(
                "motive",
                ["unsent-message", "cargo-manifest", "sealant-trail"],
                "Why was the station sabotaged?",
                [
                    "to steal the data core",
                    "to stop the data core sale",
                    "an accident covered up",
                ],
                "to stop the data core sale",
            ),
        ],
        choices: vec![Choice {
            id: "attach-message".into(),
            prompt: "Attach Vasquez's message to the core transmission?".into(),
            requires: Some("unsent-message".into()),
            chosen: false,
        }],
        ..Default::default()
    }
}

/// Kinds that every generated station must contain at least once.
pub const REQUIRED: [EntityKind; 6] = [
    EntityKind::Relay,
    EntityKind::DataCore,
    EntityKind::SecurityTerminal,
    EntityKind::CrewNpc,
    EntityKind::EscapePod,
    EntityKind::Airlock,
];
