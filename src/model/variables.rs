//! Decision variables and the entities they range over.

use crate::roster::{DanceId, DancerId, PositionId, Preference};

/// Index of a variable within its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

/// A boolean decision: "dancer occupies slot".
///
/// One exists per candidate edge, so `preference` is never
/// [`Preference::Forbidden`] in a valid model.
#[derive(Debug, Clone)]
pub struct EdgeVar {
    /// Variable name (unique within a model).
    pub name: String,
    /// Dancer index in the model.
    pub dancer: usize,
    /// Slot index in the model.
    pub slot: usize,
    pub preference: Preference,
}

impl EdgeVar {
    /// Creates a variable named after the ids it stands for.
    pub fn new(
        dancer: (usize, DancerId),
        slot: (usize, DanceId, PositionId),
        preference: Preference,
    ) -> Self {
        let (dancer, dancer_id) = dancer;
        let (slot, dance_id, position_id) = slot;
        Self {
            name: format!("dancer_{dancer_id}_dance_{dance_id}_position_{position_id}"),
            dancer,
            slot,
            preference,
        }
    }
}

/// A position that needs filling, owned by one dance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotInfo {
    /// Dance index in the model.
    pub dance: usize,
    pub position: PositionId,
}

/// A dance, identified for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanceInfo {
    pub id: DanceId,
    /// Slot indices, in presentation order.
    pub slots: Vec<usize>,
}
