//! Injectable solve diagnostics.
//!
//! The engine never touches a global logger. Whatever wants to observe a
//! solve implements [`Diagnostics`] and is handed to the solver per call.

use super::types::SolverStatus;
use crate::model::Score;
use crate::roster::{DanceId, PositionId};
use std::fmt;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Why a dance can never be performed, whatever else is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unstaffable {
    /// The dance has no positions at all.
    NoPositions,
    /// Nobody is a candidate for this position.
    NoCandidates { position: PositionId },
    /// Fewer distinct candidates than positions.
    NotEnoughDancers { needed: usize, available: usize },
    /// Enough candidates overall, but no way to give each position its own.
    NoMatching,
}

impl fmt::Display for Unstaffable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unstaffable::NoPositions => f.write_str("no positions"),
            Unstaffable::NoCandidates { position } => {
                write!(f, "no dancer for position {position}")
            }
            Unstaffable::NotEnoughDancers { needed, available } => {
                write!(f, "needs {needed} dancers but only {available} can dance it")
            }
            Unstaffable::NoMatching => f.write_str("candidates cannot cover every position"),
        }
    }
}

/// Something that happened during a plan or solve.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveEvent {
    /// Raw input was filtered into a roster.
    RosterNormalized {
        dancers: usize,
        dances: usize,
        candidates: usize,
        inactive_dancers: usize,
        dropped_edges: usize,
    },
    /// The roster was encoded as a model.
    ModelBuilt { vars: usize, constraints: usize },
    /// The model failed validation; the solve ends `ModelInvalid`.
    ModelRejected { reason: String },
    SolveStarted {
        backend: &'static str,
        dances: usize,
        vars: usize,
        components: usize,
    },
    DanceUnstaffable { dance: DanceId, reason: Unstaffable },
    /// One independent group of dances finished.
    ComponentSolved {
        dances: Vec<DanceId>,
        performed: usize,
        nodes: u64,
        proven: bool,
    },
    /// A time or node budget cut the search short.
    BudgetExhausted { nodes: u64, elapsed_ms: i64 },
    SolveFinished {
        status: SolverStatus,
        performed: usize,
        score: Option<Score>,
        nodes: u64,
        elapsed_ms: i64,
    },
}

/// Receiver of [`SolveEvent`]s.
///
/// Implementations must be cheap to call; the solver reports from inside
/// its setup and merge phases, never per search node.
pub trait Diagnostics: Send + Sync {
    fn on_event(&self, _event: &SolveEvent) {}
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {}

/// Forwards events to `tracing` as structured records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn on_event(&self, event: &SolveEvent) {
        match event {
            SolveEvent::RosterNormalized {
                dancers,
                dances,
                candidates,
                inactive_dancers,
                dropped_edges,
            } => debug!(
                event = "roster_normalized",
                dancers,
                dances,
                candidates,
                inactive_dancers,
                dropped_edges,
            ),
            SolveEvent::ModelBuilt { vars, constraints } => {
                debug!(event = "model_built", vars, constraints)
            }
            SolveEvent::ModelRejected { reason } => {
                error!(event = "model_rejected", reason = %reason)
            }
            SolveEvent::SolveStarted {
                backend,
                dances,
                vars,
                components,
            } => info!(
                event = "solve_start",
                backend = *backend,
                dances,
                vars,
                components,
            ),
            SolveEvent::DanceUnstaffable { dance, reason } => {
                info!(event = "dance_unstaffable", dance = %dance, reason = %reason)
            }
            SolveEvent::ComponentSolved {
                dances,
                performed,
                nodes,
                proven,
            } => debug!(
                event = "component_solved",
                dances = ?dances,
                performed,
                nodes,
                proven,
            ),
            SolveEvent::BudgetExhausted { nodes, elapsed_ms } => {
                warn!(event = "budget_exhausted", nodes, elapsed_ms)
            }
            SolveEvent::SolveFinished {
                status,
                performed,
                score,
                nodes,
                elapsed_ms,
            } => info!(
                event = "solve_end",
                status = %status,
                performed,
                score = ?score.as_ref().map(Score::levels),
                nodes,
                elapsed_ms,
            ),
        }
    }
}

/// Records every event in memory.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<SolveEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far, in arrival order.
    pub fn events(&self) -> Vec<SolveEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of recorded events matching `pred`.
    pub fn count(&self, pred: impl Fn(&SolveEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|e| pred(e))
            .count()
    }
}

impl Diagnostics for EventLog {
    fn on_event(&self, event: &SolveEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_records_in_order() {
        let log = EventLog::new();
        log.on_event(&SolveEvent::ModelBuilt { vars: 3, constraints: 2 });
        log.on_event(&SolveEvent::BudgetExhausted { nodes: 10, elapsed_ms: 1 });

        let events = log.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SolveEvent::ModelBuilt { vars: 3, .. }));
        assert_eq!(
            log.count(|e| matches!(e, SolveEvent::BudgetExhausted { .. })),
            1
        );
    }

    #[test]
    fn test_null_and_tracing_accept_everything() {
        let event = SolveEvent::DanceUnstaffable {
            dance: DanceId(4),
            reason: Unstaffable::NoPositions,
        };
        NullDiagnostics.on_event(&event);
        TracingDiagnostics.on_event(&event);
    }

    #[test]
    fn test_unstaffable_display() {
        assert_eq!(
            Unstaffable::NotEnoughDancers { needed: 6, available: 4 }.to_string(),
            "needs 6 dancers but only 4 can dance it"
        );
        assert_eq!(
            Unstaffable::NoCandidates { position: PositionId(2) }.to_string(),
            "no dancer for position 2"
        );
    }
}
