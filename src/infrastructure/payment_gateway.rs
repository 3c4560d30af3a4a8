use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::payment::{PaymentOutcome, PaymentStatus};
use crate::domain::ports::PaymentGateway;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRequest {
    order_reference: String,
    amount: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentResponse {
    status: String,
    transaction_id: Option<String>,
    message: Option<String>,
}

/// Why a call to the payment authority produced no usable answer.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment API responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed payment API response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Blocking HTTP client of the external payment authority.
///
/// Must be called off the async reactor (the placement saga runs on the
/// blocking pool). No retries are attempted here.
pub struct HttpPaymentGateway {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpPaymentGateway {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    fn call(&self, order_id: Uuid, amount: i64) -> Result<PaymentOutcome, GatewayError> {
        let response = self
            .client
            .post(&self.url)
            .json(&PaymentRequest {
                order_reference: order_id.to_string(),
                amount,
            })
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_response(&body)
    }
}

impl PaymentGateway for HttpPaymentGateway {
    fn request_payment(&self, order_id: Uuid, amount: i64) -> PaymentOutcome {
        match self.call(order_id, amount) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("failed payment api call for Order ID: {}: {}", order_id, e);
                PaymentOutcome::transport_failure()
            }
        }
    }
}

fn parse_response(body: &str) -> Result<PaymentOutcome, GatewayError> {
    let parsed: PaymentResponse = serde_json::from_str(body)?;
    Ok(PaymentOutcome {
        status: PaymentStatus::from_gateway(&parsed.status),
        transaction_id: parsed.transaction_id,
        message: parsed.message,
    })
}
