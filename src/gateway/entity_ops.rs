use super::Gateway;
use crate::core::{IntoRecordId, Result};
use crate::model::{Activity, Stage};

impl Gateway<Stage> {
    /// Stages in display order. Equal `order` values keep service order.
    pub async fn get_all_ordered(&self) -> Vec<Stage> {
        let mut stages = self.get_all().await;
        stages.sort_by_key(|stage| stage.order);
        stages
    }

    pub async fn try_get_all_ordered(&self) -> Result<Vec<Stage>> {
        let mut stages = self.try_get_all().await?;
        stages.sort_by_key(|stage| stage.order);
        Ok(stages)
    }
}

impl Gateway<Activity> {
    /// Activities logged against a contact. An id that does not coerce
    /// matches nothing.
    pub async fn get_by_contact_id(&self, contact_id: impl IntoRecordId) -> Vec<Activity> {
        let Some(contact_id) = contact_id.into_record_id() else {
            return Vec::new();
        };
        self.get_all()
            .await
            .into_iter()
            .filter(|activity| activity.contact_id == Some(contact_id))
            .collect()
    }

    pub async fn get_by_deal_id(&self, deal_id: impl IntoRecordId) -> Vec<Activity> {
        let Some(deal_id) = deal_id.into_record_id() else {
            return Vec::new();
        };
        self.get_all()
            .await
            .into_iter()
            .filter(|activity| activity.deal_id == Some(deal_id))
            .collect()
    }
}
