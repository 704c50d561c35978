//! Hosted-checkout client for the payment gateway.
//!
//! Implements [`PaymentGateway`] over the gateway's REST API. Checkout
//! creation is the only outbound call; confirmations arrive as callbacks
//! on the settlements routes.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use gearbox_core::gateway::{CheckoutRequest, CheckoutSession, GatewayError, PaymentGateway};
use gearbox_shared::GatewayConfig;

/// Payment gateway client backed by the hosted checkout API.
pub struct HostedCheckoutGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

/// Wire request for checkout creation.
#[derive(Serialize)]
struct CreateCheckoutBody<'a> {
    amount: Decimal,
    reference: &'a str,
    return_url: &'a str,
}

/// Wire response for checkout creation.
#[derive(Deserialize)]
struct CreateCheckoutResponse {
    checkout_url: String,
    reference: String,
}

impl HostedCheckoutGateway {
    /// Creates a gateway client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl PaymentGateway for HostedCheckoutGateway {
    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let url = format!("{}/checkouts", self.config.base_url.trim_end_matches('/'));
        let body = CreateCheckoutBody {
            amount: request.amount,
            reference: &request.invoice_ref,
            return_url: &request.return_url,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Checkout(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GatewayError::Checkout(format!(
                "gateway returned {status}: {detail}"
            )));
        }

        let payload: CreateCheckoutResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Checkout(e.to_string()))?;

        info!(
            reference = %payload.reference,
            amount = %request.amount,
            "hosted checkout created"
        );

        Ok(CheckoutSession {
            checkout_url: payload.checkout_url,
            gateway_reference: payload.reference,
        })
    }
}
