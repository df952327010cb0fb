use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::repository::{Document, DocumentRepository, Entity, RepositoryError};
use crate::subscription::ports::validate_currency;
use crate::validation::{require_non_empty, ValidationError};
use crate::UserId;

/// Order object as returned by the payment gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrder {
    /// Gateway-assigned order id
    pub id: String,
    /// Amount in minor currency units
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Response handed to the client to open the gateway checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositInitResponse {
    pub success: bool,
    pub order_id: String,
    /// Amount in major currency units
    pub amount: f64,
    pub currency: String,
    /// Publishable gateway key
    pub key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    Created,
    Paid,
    Failed,
}

/// Persisted record of a deposit attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrderFields {
    pub user_id: UserId,
    pub gateway_order_id: String,
    /// Minor currency units, as the gateway reports them
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    pub status: DepositStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DepositStatus>,
}

impl Entity for PaymentOrderFields {
    const COLLECTION: &'static str = "payment_orders";
    type Patch = PaymentOrderPatch;

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("gatewayOrderId", &self.gateway_order_id)?;
        if self.amount <= 0 {
            return Err(ValidationError::new("amount", "must be positive"));
        }
        validate_currency(&self.currency)
    }
}

pub type PaymentOrderRecord = Document<PaymentOrderFields>;
pub type PaymentOrderRepository = DocumentRepository<PaymentOrderFields>;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment order not found")]
    OrderNotFound,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for PaymentError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(e) => Self::Validation(e),
            other => Self::Repository(other),
        }
    }
}

#[async_trait]
pub trait DepositService: Send + Sync {
    /// Record a gateway order for the user and build the checkout response
    async fn initiate_deposit(
        &self,
        user_id: UserId,
        order: PaymentOrder,
    ) -> Result<DepositInitResponse, PaymentError>;

    /// Move a recorded order to a new status, looked up by gateway order id
    async fn record_status(
        &self,
        gateway_order_id: &str,
        status: DepositStatus,
    ) -> Result<PaymentOrderRecord, PaymentError>;
}
