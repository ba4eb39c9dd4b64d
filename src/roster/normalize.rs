//! Input normalization: raw records to an index-based roster.

use super::types::{Dance, DanceId, Dancer, DancerId, Position, PositionId, Preference, PreferenceEdge};
use crate::error::InputError;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// A position of a dance, addressed by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Index into [`Roster::dances`].
    pub dance: usize,
    /// Index into that dance's `positions`.
    pub position: usize,
}

/// An assignable (dancer, slot) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Index into [`Roster::dancers`].
    pub dancer: usize,
    /// Index into [`Roster::slots`].
    pub slot: usize,
    /// Never [`Preference::Forbidden`].
    pub preference: Preference,
}

/// What normalization threw away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub inactive_dancers: usize,
    pub inactive_edges: usize,
    pub forbidden_edges: usize,
}

/// Validated, index-based view of one planning problem.
///
/// Only active dancers are kept. Dances keep their input order and every
/// position becomes a [`Slot`]; candidates refer to dancers and slots by
/// index, so nothing here holds references to anything else.
#[derive(Debug, Clone)]
pub struct Roster {
    dancers: Vec<Dancer>,
    dances: Vec<Dance>,
    slots: Vec<Slot>,
    dance_slots: Vec<Range<usize>>,
    candidates: Vec<Candidate>,
    report: NormalizeReport,
}

impl Roster {
    /// Validates raw records and builds the roster.
    ///
    /// Edges are checked against the full dancer list (inactive dancers
    /// included) before anything is dropped, so a dangling reference is an
    /// error even when it belongs to an inactive dancer.
    pub fn normalize(
        dancers: &[Dancer],
        dances: &[Dance],
        edges: &[PreferenceEdge],
    ) -> Result<Self, InputError> {
        let mut known_dancers: HashMap<DancerId, Option<usize>> = HashMap::new();
        let mut active = Vec::new();
        let mut report = NormalizeReport::default();

        for dancer in dancers {
            let index = if dancer.active {
                active.push(dancer.clone());
                Some(active.len() - 1)
            } else {
                report.inactive_dancers += 1;
                None
            };
            if known_dancers.insert(dancer.id, index).is_some() {
                return Err(InputError::DuplicateDancer(dancer.id));
            }
        }

        let mut dance_index: HashMap<DanceId, usize> = HashMap::new();
        let mut slot_index: HashMap<(DanceId, PositionId), usize> = HashMap::new();
        let mut slots = Vec::new();
        let mut dance_slots = Vec::with_capacity(dances.len());

        for (d, dance) in dances.iter().enumerate() {
            if dance_index.insert(dance.id, d).is_some() {
                return Err(InputError::DuplicateDance(dance.id));
            }
            let first = slots.len();
            for (p, position) in dance.positions.iter().enumerate() {
                if slot_index.insert((dance.id, position.id), slots.len()).is_some() {
                    return Err(InputError::DuplicatePosition {
                        dance: dance.id,
                        position: position.id,
                    });
                }
                slots.push(Slot { dance: d, position: p });
            }
            dance_slots.push(first..slots.len());
        }

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for edge in edges {
            let dancer = *known_dancers
                .get(&edge.dancer)
                .ok_or(InputError::UnknownDancer(edge.dancer))?;
            if !dance_index.contains_key(&edge.dance) {
                return Err(InputError::UnknownDance(edge.dance));
            }
            let slot = *slot_index
                .get(&(edge.dance, edge.position))
                .ok_or(InputError::UnknownPosition {
                    dance: edge.dance,
                    position: edge.position,
                })?;
            if !seen.insert((edge.dancer, slot)) {
                return Err(InputError::DuplicatePreference {
                    dancer: edge.dancer,
                    dance: edge.dance,
                    position: edge.position,
                });
            }

            let Some(dancer) = dancer else {
                report.inactive_edges += 1;
                continue;
            };
            if !edge.preference.is_assignable() {
                report.forbidden_edges += 1;
                continue;
            }

            candidates.push(Candidate {
                dancer,
                slot,
                preference: edge.preference,
            });
        }

        Ok(Self {
            dancers: active,
            dances: dances.to_vec(),
            slots,
            dance_slots,
            candidates,
            report,
        })
    }

    /// Active dancers, in input order.
    pub fn dancers(&self) -> &[Dancer] {
        &self.dancers
    }

    /// All dances, in input order.
    pub fn dances(&self) -> &[Dance] {
        &self.dances
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Slot indices belonging to dance `dance`.
    pub fn dance_slots(&self, dance: usize) -> Range<usize> {
        self.dance_slots[dance].clone()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn report(&self) -> NormalizeReport {
        self.report
    }

    pub fn dancer(&self, index: usize) -> &Dancer {
        &self.dancers[index]
    }

    pub fn dance(&self, index: usize) -> &Dance {
        &self.dances[index]
    }

    /// The position a slot stands for.
    pub fn position(&self, slot: usize) -> &Position {
        let Slot { dance, position } = self.slots[slot];
        &self.dances[dance].positions[position]
    }
}
