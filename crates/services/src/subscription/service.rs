use async_trait::async_trait;
use std::sync::Arc;

use super::mapper::{to_plan_dto, to_plan_list_dto};
use super::ports::{
    PlanResponse, SubscriptionError, SubscriptionPlanFields, SubscriptionPlanPatch,
    SubscriptionPlanService,
};
use crate::repository::{Filter, FindOptions, Repository, SortDirection};
use crate::DocumentId;

pub struct SubscriptionPlanServiceImpl {
    plan_repo: Arc<dyn Repository<SubscriptionPlanFields>>,
}

impl SubscriptionPlanServiceImpl {
    pub fn new(plan_repo: Arc<dyn Repository<SubscriptionPlanFields>>) -> Self {
        Self { plan_repo }
    }
}

#[async_trait]
impl SubscriptionPlanService for SubscriptionPlanServiceImpl {
    async fn list_active_plans(&self) -> Result<Vec<PlanResponse>, SubscriptionError> {
        tracing::debug!("Listing active subscription plans");

        let filter = Filter::new().eq("is_active", true);
        let options = FindOptions::new().sort_by("price", SortDirection::Asc);
        let plans = self.plan_repo.find(&filter, &options).await.map_err(|e| {
            tracing::error!(error = ?e, "Failed to list subscription plans");
            e
        })?;

        tracing::debug!("Found {} active plan(s)", plans.len());

        Ok(to_plan_list_dto(plans))
    }

    async fn get_plan(&self, plan_id: DocumentId) -> Result<PlanResponse, SubscriptionError> {
        self.plan_repo
            .find_by_id(plan_id)
            .await?
            .map(to_plan_dto)
            .ok_or(SubscriptionError::PlanNotFound)
    }

    async fn deactivate_plan(&self, plan_id: DocumentId) -> Result<PlanResponse, SubscriptionError> {
        tracing::info!("Deactivating subscription plan: plan_id={}", plan_id);

        let patch = SubscriptionPlanPatch {
            is_active: Some(false),
            ..Default::default()
        };

        self.plan_repo
            .update(plan_id, patch)
            .await?
            .map(to_plan_dto)
            .ok_or(SubscriptionError::PlanNotFound)
    }
}
