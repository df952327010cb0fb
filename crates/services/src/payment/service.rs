use async_trait::async_trait;
use config::PaymentConfig;
use std::sync::Arc;

use super::mapper::to_deposit_init_response;
use super::ports::{
    DepositInitResponse, DepositService, DepositStatus, PaymentError, PaymentOrder,
    PaymentOrderFields, PaymentOrderPatch, PaymentOrderRecord,
};
use crate::repository::{Filter, FindOptions, Repository};
use crate::UserId;

pub struct DepositServiceImpl {
    order_repo: Arc<dyn Repository<PaymentOrderFields>>,
    payment_config: PaymentConfig,
}

impl DepositServiceImpl {
    pub fn new(
        order_repo: Arc<dyn Repository<PaymentOrderFields>>,
        payment_config: PaymentConfig,
    ) -> Self {
        Self {
            order_repo,
            payment_config,
        }
    }
}

#[async_trait]
impl DepositService for DepositServiceImpl {
    async fn initiate_deposit(
        &self,
        user_id: UserId,
        order: PaymentOrder,
    ) -> Result<DepositInitResponse, PaymentError> {
        tracing::info!(
            "Initiating deposit: user_id={}, order_id={}, amount={} {}",
            user_id,
            order.id,
            order.amount,
            order.currency
        );

        let record = self
            .order_repo
            .create(PaymentOrderFields {
                user_id,
                gateway_order_id: order.id.clone(),
                amount: order.amount,
                currency: order.currency.clone(),
                receipt: order.receipt.clone(),
                status: DepositStatus::Created,
            })
            .await?;

        tracing::debug!(
            "Deposit recorded: record_id={}, order_id={}",
            record.id,
            order.id
        );

        Ok(to_deposit_init_response(&order, &self.payment_config))
    }

    async fn record_status(
        &self,
        gateway_order_id: &str,
        status: DepositStatus,
    ) -> Result<PaymentOrderRecord, PaymentError> {
        tracing::info!(
            "Recording deposit status: order_id={}, status={:?}",
            gateway_order_id,
            status
        );

        let filter = Filter::new().eq("gateway_order_id", gateway_order_id);
        let record = self
            .order_repo
            .find(&filter, &FindOptions::new().limit(1))
            .await?
            .into_iter()
            .next()
            .ok_or(PaymentError::OrderNotFound)?;

        let patch = PaymentOrderPatch {
            status: Some(status),
        };
        self.order_repo
            .update(record.id, patch)
            .await?
            .ok_or(PaymentError::OrderNotFound)
    }
}
