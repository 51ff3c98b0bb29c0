use std::sync::Arc;

use chrono::Utc;
use log::{debug, error};
use tracing::{Instrument, Level, event, info_span};

use super::transition::{DragState, DropDecision, SkipReason};
use crate::core::{CrmError, RecordId};
use crate::gateway::{DealGateway, Gateways, StageGateway};
use crate::model::{Deal, DealPatch, DealStage, Stage};
use crate::notify::Notifier;
use crate::page::{LoadState, PageScope, settle_load};
use crate::view::{StageBucket, build_stage_buckets};

pub const LOAD_FAILED: &str = "Failed to load pipeline data";
pub const MOVE_FAILED: &str = "Failed to update deal";

/// What a drop ended up doing.
#[derive(Debug)]
pub enum TransitionOutcome {
    Skipped(SkipReason),
    /// The server accepted the move; carries the record it returned.
    Moved(Deal),
    Failed(CrmError),
}

impl TransitionOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved(_))
    }
}

/// Kanban view of the deal pipeline. Owns its deal and stage collections
/// for as long as it is mounted.
pub struct PipelineBoard {
    deal_gateway: DealGateway,
    stage_gateway: StageGateway,
    notifier: Arc<dyn Notifier>,
    scope: PageScope,
    state: LoadState,
    deals: Vec<Deal>,
    stages: Vec<Stage>,
    drag: DragState,
}

impl PipelineBoard {
    pub fn new(gateways: &Gateways) -> Self {
        Self::with_scope(gateways, PageScope::new())
    }

    pub fn with_scope(gateways: &Gateways, scope: PageScope) -> Self {
        Self {
            deal_gateway: gateways.deals.clone(),
            stage_gateway: gateways.stages.clone(),
            notifier: Arc::clone(gateways.deals.notifier()),
            scope,
            state: LoadState::Loading,
            deals: Vec::new(),
            stages: Vec::new(),
            drag: DragState::Idle,
        }
    }

    pub fn scope(&self) -> &PageScope {
        &self.scope
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Fetch deals and stages together; either failing fails the page.
    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        let result = futures::try_join!(
            self.deal_gateway.try_get_all(),
            self.stage_gateway.try_get_all_ordered()
        );
        if let Some((deals, stages)) =
            settle_load("pipeline", &self.scope, &mut self.state, result, LOAD_FAILED)
        {
            self.deals = deals;
            self.stages = stages;
        }
    }

    pub async fn retry(&mut self) {
        self.load().await;
    }

    /// Stage columns in display order, built in one pass.
    pub fn buckets(&self) -> Vec<StageBucket> {
        build_stage_buckets(&self.stages, &self.deals)
    }

    pub fn drag_start(&mut self, deal_id: RecordId) -> bool {
        self.drag.drag_start(deal_id)
    }

    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    /// Drop the dragged deal onto `target`.
    ///
    /// The collection only changes after the server answers, and then only
    /// by swapping in the record it returned. The drag context is clear
    /// when this returns, whatever the outcome.
    pub async fn drop_on(&mut self, target: impl Into<DealStage>) -> TransitionOutcome {
        let target = target.into();
        let deals = &self.deals;
        let decision = self.drag.drop_on(target, |id| {
            deals.iter().find(|d| d.id == id).map(|d| d.stage.clone())
        });

        let (deal_id, from, to) = match decision {
            DropDecision::Skip(reason) => {
                debug!("pipeline drop skipped: {:?}", reason);
                return TransitionOutcome::Skipped(reason);
            }
            DropDecision::Commit { deal_id, from, to } => (deal_id, from, to),
        };

        let span = info_span!(
            "pipeline.stage_transition",
            deal_id = deal_id,
            from = %from,
            target = %to
        );
        let outcome = self.commit(deal_id, to).instrument(span).await;
        self.drag.settle();
        outcome
    }

    async fn commit(&mut self, deal_id: RecordId, target: DealStage) -> TransitionOutcome {
        let patch = DealPatch::new()
            .stage(target.clone())
            .updated_at(Utc::now());

        match self.deal_gateway.try_update(deal_id, &patch).await {
            Ok(updated) => {
                event!(Level::INFO, "deal stage updated");
                if self.scope.is_mounted() {
                    if let Some(slot) = self.deals.iter_mut().find(|d| d.id == deal_id) {
                        *slot = updated.clone();
                    }
                } else {
                    event!(Level::DEBUG, "board unmounted, keeping collection");
                }
                self.notifier.success(&format!("Deal moved to {}", target));
                TransitionOutcome::Moved(updated)
            }
            Err(err) => {
                event!(Level::ERROR, error = %err, "deal stage update failed");
                error!("Error updating deal {}: {}", deal_id, err);
                self.notifier.error(MOVE_FAILED);
                TransitionOutcome::Failed(err)
            }
        }
    }
}
