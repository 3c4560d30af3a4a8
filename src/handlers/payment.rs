use actix_web::{http::StatusCode, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::{OrderPlacement, PaymentDetails};
use crate::domain::payment::PaymentStatus;
use crate::errors::AppError;

use super::orders::{OrderItemResponse, OrderResponse, Orders};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub customer_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// `SUCCESS` or `FAILED`.
    pub status: String,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_items: Vec<OrderItemResponse>,
}

impl From<OrderPlacement> for PlaceOrderResponse {
    fn from(p: OrderPlacement) -> Self {
        PlaceOrderResponse {
            order_id: p.order_id,
            customer_id: p.customer_id,
            customer_name: p.customer_name,
            transaction_id: p.transaction_id,
            status: p.status.to_string(),
            message: p.message,
            total_price: p.total_price,
            order_items: p.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentDetailsResponse {
    pub payment_id: Uuid,
    pub transaction_id: Option<String>,
    pub status: String,
    pub message: Option<String>,
    pub payment_date: String,
    pub order: OrderResponse,
}

impl From<PaymentDetails> for PaymentDetailsResponse {
    fn from(details: PaymentDetails) -> Self {
        let PaymentDetails { payment, order } = details;
        PaymentDetailsResponse {
            payment_id: payment.id,
            transaction_id: payment.transaction_id,
            status: payment.status.to_string(),
            message: payment.message,
            payment_date: payment.created_at.to_rfc3339(),
            order: order.into(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/v1/payment
///
/// Turns the customer's cart into an order, charges it, and settles stock.
/// A declined payment still produces a terminal FAILED order and answers 402.
#[utoipa::path(
    post,
    path = "/api/v1/payment",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order paid", body = PlaceOrderResponse),
        (status = 402, description = "Payment declined, order FAILED", body = PlaceOrderResponse),
        (status = 400, description = "Cart empty"),
        (status = 404, description = "Customer or product not found"),
        (status = 409, description = "Concurrent stock update"),
        (status = 422, description = "Out of stock"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "payment"
)]
pub async fn place_order(
    orders: web::Data<Orders>,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let customer_id = body.into_inner().customer_id;

    let placement = web::block(move || orders.place_order(customer_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let status = match placement.status {
        PaymentStatus::Success => StatusCode::CREATED,
        PaymentStatus::Failed => StatusCode::PAYMENT_REQUIRED,
    };
    Ok(HttpResponse::build(status).json(PlaceOrderResponse::from(placement)))
}

/// GET /api/v1/payment/{order_id}
#[utoipa::path(
    get,
    path = "/api/v1/payment/{order_id}",
    params(
        ("order_id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Payment record with its order", body = PaymentDetailsResponse),
        (status = 404, description = "Payment or order not found"),
    ),
    tag = "payment"
)]
pub async fn get_payment(
    orders: web::Data<Orders>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let details = web::block(move || orders.get_payment(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(PaymentDetailsResponse::from(details)))
}
