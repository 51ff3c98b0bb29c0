use serde::Serialize;

use crate::core::RecordId;
use crate::model::DealStage;

/// Drag gesture state of the pipeline board.
///
/// `Idle -> Dragging` on drag start, `Dragging -> Committing` on a drop that
/// changes the deal's stage, `Committing -> Idle` once the update settles.
/// Every other drop goes straight back to `Idle`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        deal_id: RecordId,
    },
    Committing {
        deal_id: RecordId,
        target: DealStage,
    },
}

/// Why a drop did not start a stage update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    NothingDragged,
    UnknownDeal,
    SameStage,
    /// A previous drop is still waiting on the record service.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropDecision {
    Commit {
        deal_id: RecordId,
        from: DealStage,
        to: DealStage,
    },
    Skip(SkipReason),
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn dragged_deal(&self) -> Option<RecordId> {
        match self {
            Self::Idle => None,
            Self::Dragging { deal_id } | Self::Committing { deal_id, .. } => Some(*deal_id),
        }
    }

    /// Begin dragging `deal_id`. Ignored while a commit is in flight.
    pub fn drag_start(&mut self, deal_id: RecordId) -> bool {
        if matches!(self, Self::Committing { .. }) {
            return false;
        }
        *self = Self::Dragging { deal_id };
        true
    }

    /// Gesture ended without a drop.
    pub fn cancel(&mut self) {
        if let Self::Dragging { .. } = self {
            *self = Self::Idle;
        }
    }

    /// Drop onto `target`. `stage_of` looks up the dragged deal's current
    /// stage in the board's collection.
    pub fn drop_on<F>(&mut self, target: DealStage, stage_of: F) -> DropDecision
    where
        F: FnOnce(RecordId) -> Option<DealStage>,
    {
        let deal_id = match self {
            Self::Idle => return DropDecision::Skip(SkipReason::NothingDragged),
            Self::Committing { .. } => return DropDecision::Skip(SkipReason::Busy),
            Self::Dragging { deal_id } => *deal_id,
        };

        let decision = match stage_of(deal_id) {
            None => DropDecision::Skip(SkipReason::UnknownDeal),
            Some(current) if current == target => DropDecision::Skip(SkipReason::SameStage),
            Some(current) => DropDecision::Commit {
                deal_id,
                from: current,
                to: target.clone(),
            },
        };

        *self = match &decision {
            DropDecision::Commit { .. } => Self::Committing { deal_id, target },
            DropDecision::Skip(_) => Self::Idle,
        };
        decision
    }

    /// The update finished, either way.
    pub fn settle(&mut self) {
        *self = Self::Idle;
    }
}
