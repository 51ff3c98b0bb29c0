//! Pipeline board: stage columns plus the drag/drop stage transition.

mod board;
mod transition;

pub use board::{LOAD_FAILED, MOVE_FAILED, PipelineBoard, TransitionOutcome};
pub use transition::{DragState, DropDecision, SkipReason};
