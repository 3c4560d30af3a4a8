use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Customer ID: {0}")]
    CustomerNotFound(Uuid),

    #[error("Product IDs not found: {}", format_ids(.0))]
    ProductNotFound(Vec<Uuid>),

    #[error("Order ID: {0}")]
    OrderNotFound(Uuid),

    #[error("Payment not found for Order ID: {0}")]
    PaymentNotFound(Uuid),

    /// `product_id` is absent when the rejected request is a cart merge, which
    /// reports the requested delta instead of the resulting quantity.
    #[error("{}", out_of_stock_details(.product_id, .requested, .available))]
    OutOfStock {
        product_id: Option<Uuid>,
        requested: i64,
        available: i64,
    },

    #[error("No items in cart")]
    CartEmpty,

    /// Optimistic-lock collision. The whole operation was rolled back and may be
    /// retried by the caller.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad parameter: {0}")]
    BadParameter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Stable machine-readable code reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            DomainError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            DomainError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            DomainError::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            DomainError::OutOfStock { .. } => "OUT_OF_STOCK",
            DomainError::CartEmpty => "CART_EMPTY",
            DomainError::Conflict(_) => "CONFLICT",
            DomainError::BadParameter(_) => "BAD_PARAMETER",
            DomainError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Human-readable summary matching `code()`.
    pub fn summary(&self) -> &'static str {
        match self {
            DomainError::CustomerNotFound(_) => "Customer not found",
            DomainError::ProductNotFound(_) => "Product not found",
            DomainError::OrderNotFound(_) => "Order not found",
            DomainError::PaymentNotFound(_) => "Payment not found",
            DomainError::OutOfStock { .. } => "Out of stock",
            DomainError::CartEmpty => "Cart is empty",
            DomainError::Conflict(_) => "Conflict",
            DomainError::BadParameter(_) => "Bad parameter",
            DomainError::Internal(_) => "Internal server error",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::CustomerNotFound(_)
                | DomainError::ProductNotFound(_)
                | DomainError::OrderNotFound(_)
                | DomainError::PaymentNotFound(_)
        )
    }
}

fn format_ids(ids: &[Uuid]) -> String {
    let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    format!("[{}]", ids.join(", "))
}

fn out_of_stock_details(product_id: &Option<Uuid>, requested: &i64, available: &i64) -> String {
    match product_id {
        Some(id) => format!(
            "Product ID: {}, Requested: {}, Available: {}",
            id, requested, available
        ),
        None => format!("Requested quantity: {}, Available: {}", requested, available),
    }
}
