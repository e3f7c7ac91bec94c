//! The selection gate -- the single check that allows or vetoes moving past date selection.
//!
//! [`can_proceed`] is what both the inline feedback and the final commit
//! check call, so what the buyer sees and what is enforced cannot drift apart.
//! [`DeliverySelection`] tracks the surrounding workflow and re-runs the gate at
//! commit time against whatever configuration is current then.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Configuration;
use crate::evaluator::{self, BlockReason, Decision};

/// Shown when the workflow is blocked because nothing was selected.
pub const NO_SELECTION_REASON: &str = "You must select a delivery date.";

/// Shown when the selected date is blocked by any rule.
pub const UNAVAILABLE_REASON: &str = "The selected date is not available for delivery.";

/// Decide whether the workflow may proceed with `selection`.
///
/// A missing selection is blocked with [`BlockReason::NoSelection`] without
/// consulting the evaluator; otherwise the evaluator's decision is returned as-is.
pub fn can_proceed(
    config: &Configuration,
    selection: Option<NaiveDate>,
    today: NaiveDate,
) -> Decision {
    match selection {
        None => Decision::Blocked(BlockReason::NoSelection),
        Some(candidate) => evaluator::evaluate(config, candidate, today),
    }
}

/// Allow or block, as reported to the workflow host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    Allow,
    Block,
}

/// One entry of a blocked response's error list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateMessage {
    pub message: String,
}

/// Consumer-facing form of a gate decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResponse {
    pub behavior: Behavior,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GateMessage>,
}

impl GateResponse {
    pub fn may_proceed(&self) -> bool {
        self.behavior == Behavior::Allow
    }
}

impl From<Decision> for GateResponse {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Available => GateResponse {
                behavior: Behavior::Allow,
                reason: None,
                errors: Vec::new(),
            },
            Decision::Blocked(BlockReason::NoSelection) => GateResponse {
                behavior: Behavior::Block,
                reason: Some(NO_SELECTION_REASON.to_string()),
                errors: vec![GateMessage {
                    message: BlockReason::NoSelection.message().to_string(),
                }],
            },
            Decision::Blocked(reason) => GateResponse {
                behavior: Behavior::Block,
                reason: Some(UNAVAILABLE_REASON.to_string()),
                errors: vec![GateMessage {
                    message: reason.message().to_string(),
                }],
            },
        }
    }
}

/// A commit attempt the gate refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("delivery date rejected: {reason}")]
pub struct GateRejection {
    pub reason: BlockReason,
}

/// Where the buyer is in the date-selection workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Empty,
    /// A date is chosen; `decision` is advisory and may be stale by commit time.
    Selected { date: NaiveDate, decision: Decision },
    Committed(NaiveDate),
}

/// Workflow wrapper that keeps inline feedback and the commit check on the same gate.
#[derive(Debug, Clone, Default)]
pub struct DeliverySelection {
    state: SelectionState,
}

impl DeliverySelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// The currently selected or committed date.
    pub fn date(&self) -> Option<NaiveDate> {
        match self.state {
            SelectionState::Empty => None,
            SelectionState::Selected { date, .. } | SelectionState::Committed(date) => Some(date),
        }
    }

    /// Advisory feedback for the current state.
    pub fn feedback(&self) -> Decision {
        match self.state {
            SelectionState::Empty => Decision::Blocked(BlockReason::NoSelection),
            SelectionState::Selected { decision, .. } => decision,
            SelectionState::Committed(_) => Decision::Available,
        }
    }

    /// Choose a date and evaluate it for inline feedback.
    ///
    /// Selecting after a commit starts a new selection.
    pub fn select(
        &mut self,
        config: &Configuration,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Decision {
        let decision = can_proceed(config, Some(date), today);
        debug!(%date, ?decision, "delivery date selected");
        self.state = SelectionState::Selected { date, decision };
        decision
    }

    pub fn clear(&mut self) {
        self.state = SelectionState::Empty;
    }

    /// Authoritatively re-check the selection and commit it if allowed.
    ///
    /// The advisory decision recorded by [`select`](Self::select) is ignored: the
    /// gate runs again against `config` and `today` as they are now.
    pub fn commit(
        &mut self,
        config: &Configuration,
        today: NaiveDate,
    ) -> Result<NaiveDate, GateRejection> {
        if let SelectionState::Committed(date) = self.state {
            return Ok(date);
        }

        match can_proceed(config, self.date(), today) {
            Decision::Available => {
                // `Available` implies a date was selected.
                let date = self.date().ok_or(GateRejection {
                    reason: BlockReason::NoSelection,
                })?;
                info!(%date, "delivery date committed");
                self.state = SelectionState::Committed(date);
                Ok(date)
            }
            Decision::Blocked(reason) => {
                if let SelectionState::Selected { date, .. } = self.state {
                    // Keep the stored feedback in line with what was enforced.
                    self.state = SelectionState::Selected {
                        date,
                        decision: Decision::Blocked(reason),
                    };
                }
                warn!(date = ?self.date(), ?reason, "delivery date commit rejected");
                Err(GateRejection { reason })
            }
        }
    }
}
