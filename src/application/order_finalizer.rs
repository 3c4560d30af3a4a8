use crate::application::cart_service::clear_cart;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::payment::{Payment, PaymentOutcome};
use crate::domain::ports::{CartRepository, OrderRepository};
use crate::domain::settlement::Settlement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedOrder {
    pub order: Order,
    pub payment: Payment,
}

/// Moves a CREATED order to PAID or FAILED according to the payment outcome.
///
/// The settlement is atomic. If it cannot be applied (a product vanished or
/// ran short, a row changed underneath) nothing is written, the order stays
/// CREATED without a payment record and the error is returned: `Conflict`
/// for version collisions, `Internal` for everything else. The gateway's
/// transaction id is logged and carried in the error, since the payment
/// authority may already have charged the customer.
pub struct OrderFinalizer<R> {
    repo: R,
}

impl<R> OrderFinalizer<R>
where
    R: OrderRepository + CartRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn finalize(
        &self,
        mut order: Order,
        outcome: PaymentOutcome,
    ) -> Result<FinalizedOrder, DomainError> {
        let order_id = order.id;
        let settlement = Settlement::plan(&mut order, outcome)?;
        let payment = self.repo.settle(&settlement).map_err(|e| {
            let charged = &settlement.payment;
            log::error!(
                "Order ID: {} settlement rolled back after payment {} (transaction id: {}, message: {}): {}",
                order_id,
                charged.status,
                charged.transaction_id.as_deref().unwrap_or("none"),
                charged.message.as_deref().unwrap_or("none"),
                e
            );
            settlement_error(order_id, charged, e)
        })?;

        match order.status {
            OrderStatus::Paid => {
                log::info!("Order ID: {} order PAID", order.id);
                // The purchase is settled; stale cart lines are preferable to
                // failing it here.
                clear_cart(&self.repo, order.customer_id);
            }
            _ => log::info!("Order ID: {} order FAILED", order.id),
        }

        Ok(FinalizedOrder { order, payment })
    }
}

fn settlement_error(
    order_id: uuid::Uuid,
    charged: &PaymentOutcome,
    err: DomainError,
) -> DomainError {
    let reference = charged.transaction_id.as_deref().unwrap_or("none");
    match err {
        DomainError::Conflict(msg) => {
            DomainError::Conflict(format!("{} (payment transaction {})", msg, reference))
        }
        other => DomainError::Internal(format!(
            "settlement of order {} rolled back, payment transaction {}: {}",
            order_id, reference, other
        )),
    }
}
