pub mod cart;
pub mod orders;
pub mod payment;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        cart::merge_cart,
        cart::get_cart,
        cart::clear_cart,
        payment::place_order,
        payment::get_payment,
        orders::get_order,
    ),
    components(schemas(
        cart::CartLineRequest,
        cart::MergeCartRequest,
        cart::CartProductResponse,
        cart::CartResponse,
        payment::PlaceOrderRequest,
        payment::PlaceOrderResponse,
        payment::PaymentDetailsResponse,
        orders::OrderItemResponse,
        orders::OrderResponse,
    )),
    tags(
        (name = "cart", description = "Customer cart lines"),
        (name = "payment", description = "Order placement and payment records"),
        (name = "orders", description = "Order details"),
    )
)]
pub struct ApiDoc;
