use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::domain::order::{Order, OrderItem};
use crate::errors::AppError;
use crate::infrastructure::DieselStore;

pub type Orders = OrderService<DieselStore>;

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub product_name: String,
    /// Unit price captured when the order was drafted.
    pub product_price: i64,
    pub quantity: i32,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        OrderItemResponse {
            product_id: item.product_id,
            product_name: item.name,
            product_price: item.price,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub order_status: String,
    pub total_amount: i64,
    pub created_at: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_items: Vec<OrderItemResponse>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            order_id: order.id,
            customer_id: order.customer_id,
            order_status: order.status.to_string(),
            total_amount: order.total_amount,
            created_at: order.created_at.to_rfc3339(),
            order_items: order.items.into_iter().map(Into::into).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/v1/orders/{order_id}
///
/// Returns the order together with its items, in the order they were drafted.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{order_id}",
    params(
        ("order_id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    orders: web::Data<Orders>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || orders.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
