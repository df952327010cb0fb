use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::{Document, DocumentRepository, Entity, RepositoryError};
use crate::validation::{require_non_empty, require_non_empty_opt, ValidationError};
use crate::DocumentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Month,
    Year,
}

/// Persisted subscription plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlanFields {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in minor currency units (e.g. cents, paise)
    pub price: i64,
    /// ISO 4217 code, upper case
    pub currency: String,
    pub interval: BillingInterval,
    #[serde(default)]
    pub features: Vec<String>,
    /// Monthly token allowance; `None` means unlimited
    #[serde(default)]
    pub monthly_tokens: Option<u64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlanPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<BillingInterval>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

pub(crate) fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ValidationError::new(
            "currency",
            format!("expected a three-letter upper-case code, got {currency:?}"),
        ));
    }
    Ok(())
}

fn validate_price(price: i64) -> Result<(), ValidationError> {
    if price < 0 {
        return Err(ValidationError::new("price", "cannot be negative"));
    }
    Ok(())
}

impl Entity for SubscriptionPlanFields {
    const COLLECTION: &'static str = "subscription_plans";
    type Patch = SubscriptionPlanPatch;

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("name", &self.name)?;
        validate_price(self.price)?;
        validate_currency(&self.currency)
    }

    fn validate_patch(patch: &SubscriptionPlanPatch) -> Result<(), ValidationError> {
        require_non_empty_opt("name", patch.name.as_deref())?;
        if let Some(price) = patch.price {
            validate_price(price)?;
        }
        if let Some(currency) = &patch.currency {
            validate_currency(currency)?;
        }
        Ok(())
    }
}

pub type SubscriptionPlan = Document<SubscriptionPlanFields>;
pub type SubscriptionPlanRepository = DocumentRepository<SubscriptionPlanFields>;

/// Plan as listed to clients: every stored field plus its string id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: i64,
    pub currency: String,
    pub interval: BillingInterval,
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_tokens: Option<u64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("Plan not found")]
    PlanNotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[async_trait]
pub trait SubscriptionPlanService: Send + Sync {
    /// Active plans, cheapest first
    async fn list_active_plans(&self) -> Result<Vec<PlanResponse>, SubscriptionError>;

    async fn get_plan(&self, plan_id: DocumentId) -> Result<PlanResponse, SubscriptionError>;

    /// Hide a plan from listings without deleting it
    async fn deactivate_plan(&self, plan_id: DocumentId) -> Result<PlanResponse, SubscriptionError>;
}
