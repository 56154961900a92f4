//! Evidence, deductions and the narrative state built on them.

use std::collections::BTreeSet;

use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

use crate::{prelude::*, ObjectivePhase};

#[derive(
    Clone,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Display,
    From,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct EvidenceId(String);

impl From<&str> for EvidenceId {
    fn from(s: &str) -> Self {
        EvidenceId(s.to_owned())
    }
}

/// Evidence carried by an entity, recorded when the player examines it.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Clue {
    pub id: EvidenceId,
    pub text: String,
}

impl Clue {
    pub fn new(id: impl Into<EvidenceId>, text: impl Into<String>) -> Self {
        Clue {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Journal entry.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Evidence {
    pub id: EvidenceId,
    pub text: String,
    pub room_id: Option<u32>,
    pub entity_id: Option<EntityId>,
}

/// Recorded evidence in discovery order, each id at most once.
#[derive(Clone, Default, Eq, PartialEq, Debug, Deref, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Journal(Vec<Evidence>);

impl Journal {
    pub fn contains(&self, id: &EvidenceId) -> bool {
        self.0.iter().any(|e| &e.id == id)
    }

    pub fn ids(&self) -> BTreeSet<&EvidenceId> {
        self.0.iter().map(|e| &e.id).collect()
    }

    /// Add evidence unless it's already recorded. Returns whether it was
    /// new.
    fn record(&mut self, evidence: Evidence) -> bool {
        if self.contains(&evidence.id) {
            return false;
        }
        self.0.push(evidence);
        true
    }
}

/// A question the player can answer once enough evidence is in.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Deduction {
    pub id: String,
    pub prerequisites: BTreeSet<EvidenceId>,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub solved: bool,
    #[serde(default)]
    pub answered_correctly: bool,
}

impl Deduction {
    pub fn new<'a>(
        id: &str,
        prerequisites: impl IntoIterator<Item = &'a str>,
        question: &str,
        options: impl IntoIterator<Item = &'a str>,
        correct_answer: &str,
    ) -> Self {
        Deduction {
            id: id.into(),
            prerequisites: prerequisites.into_iter().map(Into::into).collect(),
            question: question.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct_answer: correct_answer.into(),
            solved: false,
            answered_correctly: false,
        }
    }

    pub fn is_unlocked(&self, journal: &Journal) -> bool {
        self.prerequisites.iter().all(|id| journal.contains(id))
    }
}

/// Narrative decision gated behind a piece of evidence.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Choice {
    pub id: String,
    pub prompt: String,
    pub requires: Option<EvidenceId>,
    #[serde(default)]
    pub chosen: bool,
}

/// Crew that left the station alive or didn't make it.
#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Evacuation {
    pub crew_evacuated: Vec<EntityId>,
    pub crew_dead: Vec<EntityId>,
}

impl Evacuation {
    pub fn is_resolved(&self, id: EntityId) -> bool {
        self.crew_evacuated.contains(&id) || self.crew_dead.contains(&id)
    }
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Mystery {
    pub objective_phase: ObjectivePhase,
    pub journal: Journal,
    pub deductions: Vec<Deduction>,
    pub choices: Vec<Choice>,
    pub evacuation: Evacuation,
}

impl Mystery {
    pub fn deduction(&self, id: &str) -> Result<&Deduction> {
        self.deductions
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| Error::UnknownDeduction(id.to_owned()))
    }

    pub fn correct_deductions(&self) -> usize {
        self.deductions.iter().filter(|d| d.answered_correctly).count()
    }
}

/// Rules for recording evidence and answering deductions.
pub struct DeductionEngine;

impl DeductionEngine {
    /// Record evidence in the journal, returns whether it was new.
    pub fn record(mystery: &mut Mystery, evidence: Evidence) -> bool {
        let id = evidence.id.clone();
        let new = mystery.journal.record(evidence);
        if new {
            log::debug!("evidence recorded: {id}");
        }
        new
    }

    /// Unanswered deductions whose prerequisites are all in the journal.
    pub fn unlocked(mystery: &Mystery) -> impl Iterator<Item = &Deduction> {
        mystery
            .deductions
            .iter()
            .filter(|d| !d.solved && d.is_unlocked(&mystery.journal))
    }

    /// Answer a deduction and return whether the answer was correct.
    ///
    /// A deduction can be answered once. Answering again fails with
    /// [`Error::AlreadyAnswered`] carrying the first result.
    pub fn answer(
        mystery: &mut Mystery,
        id: &str,
        given: &str,
    ) -> Result<bool> {
        let journal = &mystery.journal;
        let Some(deduction) =
            mystery.deductions.iter_mut().find(|d| d.id == id)
        else {
            return Err(Error::UnknownDeduction(id.to_owned()));
        };

        if deduction.solved {
            return Err(Error::AlreadyAnswered {
                id: id.to_owned(),
                correct: deduction.answered_correctly,
            });
        }
        if !deduction.is_unlocked(journal) {
            return illegal("You don't have enough evidence to answer that yet.");
        }

        let correct = given.trim().eq_ignore_ascii_case(&deduction.correct_answer);
        deduction.solved = true;
        deduction.answered_correctly = correct;
        log::info!("deduction {id} answered, correct: {correct}");
        Ok(correct)
    }

    pub fn choose(mystery: &mut Mystery, id: &str) -> Result<()> {
        let journal = &mystery.journal;
        let Some(choice) = mystery.choices.iter_mut().find(|c| c.id == id)
        else {
            return illegal(format!("There's no decision called {id}."));
        };
        if choice.chosen {
            return illegal("That decision has already been made.");
        }
        if let Some(req) = &choice.requires {
            if !journal.contains(req) {
                return illegal("You don't know enough to decide that yet.");
            }
        }
        choice.chosen = true;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn evidence(id: &str) -> Evidence {
        Evidence {
            id: id.into(),
            text: format!("evidence {id}"),
            room_id: None,
            entity_id: None,
        }
    }

    fn mystery() -> Mystery {
        Mystery {
            deductions: vec![Deduction::new(
                "who",
                ["e1", "e2"],
                "Who did it?",
                ["butler", "gardener"],
                "butler",
            )],
            choices: vec![Choice {
                id: "tell".into(),
                prompt: "Tell everyone?".into(),
                requires: Some("e1".into()),
                chosen: false,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn journal_is_a_set() {
        let mut m = mystery();
        assert!(DeductionEngine::record(&mut m, evidence("e1")));
        assert!(!DeductionEngine::record(&mut m, evidence("e1")));
        assert_eq!(m.journal.len(), 1);
    }

    #[test]
    fn deduction_unlocks_with_evidence() {
        let mut m = mystery();
        assert_eq!(DeductionEngine::unlocked(&m).count(), 0);
        assert!(matches!(
            DeductionEngine::answer(&mut m, "who", "butler"),
            Err(Error::IllegalIntent(_))
        ));

        DeductionEngine::record(&mut m, evidence("e1"));
        DeductionEngine::record(&mut m, evidence("e2"));
        assert_eq!(DeductionEngine::unlocked(&m).count(), 1);
    }

    #[test]
    fn answer_once() {
        let mut m = mystery();
        DeductionEngine::record(&mut m, evidence("e1"));
        DeductionEngine::record(&mut m, evidence("e2"));

        assert!(!DeductionEngine::answer(&mut m, "who", "gardener").unwrap());
        let snapshot = m.clone();

        // Second answer fails and reports the first result.
        assert!(matches!(
            DeductionEngine::answer(&mut m, "who", "butler"),
            Err(Error::AlreadyAnswered { correct: false, .. })
        ));
        assert_eq!(m, snapshot);
        assert_eq!(m.correct_deductions(), 0);
        assert_eq!(DeductionEngine::unlocked(&m).count(), 0);
    }

    #[test]
    fn answer_is_case_insensitive() {
        let mut m = mystery();
        DeductionEngine::record(&mut m, evidence("e1"));
        DeductionEngine::record(&mut m, evidence("e2"));
        assert!(DeductionEngine::answer(&mut m, "who", " Butler ").unwrap());
        assert_eq!(m.correct_deductions(), 1);
    }

    #[test]
    fn unknown_deduction() {
        let mut m = mystery();
        assert!(matches!(
            DeductionEngine::answer(&mut m, "what", "x"),
            Err(Error::UnknownDeduction(_))
        ));
    }

    #[test]
    fn choices_need_evidence() {
        let mut m = mystery();
        assert!(DeductionEngine::choose(&mut m, "tell").is_err());
        DeductionEngine::record(&mut m, evidence("e1"));
        DeductionEngine::choose(&mut m, "tell").unwrap();
        assert!(DeductionEngine::choose(&mut m, "tell").is_err());
    }
}
