use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::cart_service::CartService;
use crate::domain::cart::{CartLineDelta, CartView};
use crate::errors::AppError;
use crate::infrastructure::DieselStore;

pub type Carts = CartService<DieselStore>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartLineRequest {
    pub product_id: Uuid,
    /// Signed change applied to the stored quantity. A line that drops to
    /// zero or below is removed.
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MergeCartRequest {
    pub customer_id: Uuid,
    #[serde(default)]
    pub products: Vec<CartLineRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartProductResponse {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub stock: i32,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub customer_id: Uuid,
    pub products: Vec<CartProductResponse>,
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        CartResponse {
            customer_id: view.customer_id,
            products: view
                .entries
                .into_iter()
                .map(|e| CartProductResponse {
                    id: e.product.id,
                    name: e.product.name,
                    price: e.product.price,
                    stock: e.product.stock,
                    quantity: e.line.quantity,
                })
                .collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/v1/cart
///
/// Applies every quantity change of the request atomically. A concurrent
/// modification of any touched line yields 409 and nothing is written.
#[utoipa::path(
    post,
    path = "/api/v1/cart",
    request_body = MergeCartRequest,
    responses(
        (status = 204, description = "Cart updated"),
        (status = 400, description = "Bad parameter"),
        (status = 404, description = "Customer or product not found"),
        (status = 409, description = "Concurrent modification, retry the request"),
        (status = 422, description = "Out of stock"),
    ),
    tag = "cart"
)]
pub async fn merge_cart(
    carts: web::Data<Carts>,
    body: web::Json<MergeCartRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let deltas: Vec<CartLineDelta> = body
        .products
        .iter()
        .map(|p| CartLineDelta {
            product_id: p.product_id,
            quantity: p.quantity,
        })
        .collect();

    web::block(move || carts.merge(body.customer_id, &deltas))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/cart/{customer_id}
#[utoipa::path(
    get,
    path = "/api/v1/cart/{customer_id}",
    params(
        ("customer_id" = Uuid, Path, description = "Customer UUID"),
    ),
    responses(
        (status = 200, description = "Cart lines with current product state", body = CartResponse),
        (status = 404, description = "Customer not found"),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    carts: web::Data<Carts>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let customer_id = path.into_inner();

    let view = web::block(move || carts.view(customer_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartResponse::from(view)))
}

/// DELETE /api/v1/cart/{customer_id}
///
/// Best-effort; always answers 204.
#[utoipa::path(
    delete,
    path = "/api/v1/cart/{customer_id}",
    params(
        ("customer_id" = Uuid, Path, description = "Customer UUID"),
    ),
    responses(
        (status = 204, description = "Cart cleared"),
    ),
    tag = "cart"
)]
pub async fn clear_cart(
    carts: web::Data<Carts>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let customer_id = path.into_inner();

    web::block(move || carts.clear(customer_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::NoContent().finish())
}
