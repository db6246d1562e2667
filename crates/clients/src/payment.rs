//! Payment service API: payment records.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Payment, PaymentStatus, PaymentUid};
use serde::Serialize;

use crate::backend::{HttpBackend, Method};
use crate::dependency::Dependency;
use crate::error::{ClientError, Result};
use crate::facade::DependencyClient;

/// Operations offered by the payment service.
#[async_trait]
pub trait PaymentApi: Send + Sync {
    /// Fetches a payment by its public identifier.
    async fn get_payment(&self, payment_uid: PaymentUid) -> Result<Payment>;

    /// Creates a captured (PAID) payment for the given amount.
    async fn create_payment(&self, price: i64) -> Result<Payment>;

    /// Persists an updated payment record.
    async fn update_payment(&self, payment: &Payment) -> Result<()>;

    /// Deletes a payment record. Used as the booking saga's compensation.
    async fn delete_payment(&self, payment_uid: PaymentUid) -> Result<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentRequest {
    status: PaymentStatus,
    price: i64,
}

/// HTTP implementation over the breaker-gated facade.
#[derive(Clone)]
pub struct HttpPaymentClient<B> {
    client: DependencyClient<B>,
}

impl<B: HttpBackend> HttpPaymentClient<B> {
    /// Wraps a facade for the payment dependency.
    pub fn new(client: DependencyClient<B>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<B: HttpBackend> PaymentApi for HttpPaymentClient<B> {
    async fn get_payment(&self, payment_uid: PaymentUid) -> Result<Payment> {
        self.client
            .request_json(
                Method::Get,
                &format!("/api/v1/payments/{payment_uid}"),
                &[],
                None,
                &format!("payment {payment_uid}"),
            )
            .await
    }

    async fn create_payment(&self, price: i64) -> Result<Payment> {
        let request = CreatePaymentRequest {
            status: PaymentStatus::Paid,
            price,
        };
        let body = serde_json::to_value(&request).map_err(|e| ClientError::Failed {
            dependency: Dependency::Payment,
            status: None,
            message: format!("unserializable request: {e}"),
        })?;
        self.client
            .request_json(
                Method::Post,
                "/api/v1/payments",
                &[],
                Some(&body),
                "created payment",
            )
            .await
    }

    async fn update_payment(&self, payment: &Payment) -> Result<()> {
        let body = serde_json::to_value(payment).map_err(|e| ClientError::Failed {
            dependency: Dependency::Payment,
            status: None,
            message: format!("unserializable request: {e}"),
        })?;
        self.client
            .request_unit(Method::Put, "/api/v1/payments", &[], Some(&body))
            .await
    }

    async fn delete_payment(&self, payment_uid: PaymentUid) -> Result<()> {
        self.client
            .request_unit(
                Method::Delete,
                &format!("/api/v1/payments/{payment_uid}"),
                &[],
                None,
            )
            .await
    }
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    payments: HashMap<PaymentUid, Payment>,
    fail_create: bool,
    fail_get: bool,
    fail_update: bool,
    fail_delete: bool,
}

/// In-memory payment service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentClient {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentClient {
    /// Creates an empty in-memory payment service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a payment record.
    pub fn add_payment(&self, payment: Payment) {
        self.state
            .write()
            .unwrap()
            .payments
            .insert(payment.payment_uid, payment);
    }

    /// Makes payment creation fail.
    pub fn set_fail_create(&self, fail: bool) {
        self.state.write().unwrap().fail_create = fail;
    }

    /// Makes payment lookups fail.
    pub fn set_fail_get(&self, fail: bool) {
        self.state.write().unwrap().fail_get = fail;
    }

    /// Makes payment updates fail.
    pub fn set_fail_update(&self, fail: bool) {
        self.state.write().unwrap().fail_update = fail;
    }

    /// Makes payment deletion fail.
    pub fn set_fail_delete(&self, fail: bool) {
        self.state.write().unwrap().fail_delete = fail;
    }

    /// Returns the number of stored payments.
    pub fn payment_count(&self) -> usize {
        self.state.read().unwrap().payments.len()
    }

    /// Returns true if a payment exists with the given identifier.
    pub fn has_payment(&self, payment_uid: PaymentUid) -> bool {
        self.state
            .read()
            .unwrap()
            .payments
            .contains_key(&payment_uid)
    }

    /// Looks up a stored payment.
    pub fn payment(&self, payment_uid: PaymentUid) -> Option<Payment> {
        self.state
            .read()
            .unwrap()
            .payments
            .get(&payment_uid)
            .cloned()
    }

    fn failed(&self) -> ClientError {
        ClientError::Failed {
            dependency: Dependency::Payment,
            status: Some(503),
            message: "simulated failure".to_string(),
        }
    }
}

#[async_trait]
impl PaymentApi for InMemoryPaymentClient {
    async fn get_payment(&self, payment_uid: PaymentUid) -> Result<Payment> {
        let state = self.state.read().unwrap();
        if state.fail_get {
            return Err(self.failed());
        }
        state
            .payments
            .get(&payment_uid)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                what: format!("payment {payment_uid}"),
            })
    }

    async fn create_payment(&self, price: i64) -> Result<Payment> {
        let mut state = self.state.write().unwrap();
        if state.fail_create {
            return Err(self.failed());
        }
        let payment = Payment {
            payment_uid: PaymentUid::new(),
            status: PaymentStatus::Paid,
            price,
        };
        state.payments.insert(payment.payment_uid, payment.clone());
        Ok(payment)
    }

    async fn update_payment(&self, payment: &Payment) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_update {
            return Err(self.failed());
        }
        state.payments.insert(payment.payment_uid, payment.clone());
        Ok(())
    }

    async fn delete_payment(&self, payment_uid: PaymentUid) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_delete {
            return Err(self.failed());
        }
        state.payments.remove(&payment_uid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_get_and_delete() {
        let service = InMemoryPaymentClient::new();

        let payment = service.create_payment(2700).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(payment.price, 2700);
        assert_eq!(service.payment_count(), 1);

        let fetched = service.get_payment(payment.payment_uid).await.unwrap();
        assert_eq!(fetched, payment);

        service.delete_payment(payment.payment_uid).await.unwrap();
        assert_eq!(service.payment_count(), 0);
        assert!(
            service
                .get_payment(payment.payment_uid)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn update_overwrites_status() {
        let service = InMemoryPaymentClient::new();
        let mut payment = service.create_payment(1000).await.unwrap();

        payment.status = PaymentStatus::Canceled;
        service.update_payment(&payment).await.unwrap();

        let fetched = service.get_payment(payment.payment_uid).await.unwrap();
        assert_eq!(fetched.status, PaymentStatus::Canceled);
    }

    #[tokio::test]
    async fn failure_toggle() {
        let service = InMemoryPaymentClient::new();
        service.set_fail_create(true);
        assert!(service.create_payment(100).await.is_err());
        assert_eq!(service.payment_count(), 0);
    }
}
