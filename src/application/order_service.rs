use std::sync::Arc;

use uuid::Uuid;

use crate::application::draft_calculator::OrderDraftCalculator;
use crate::application::order_finalizer::{FinalizedOrder, OrderFinalizer};
use crate::domain::catalog::Customer;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::ports::{CartRepository, CustomerRepository, OrderRepository, PaymentGateway};

/// Result of one placement, ready to be rendered to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlacement {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
    pub message: Option<String>,
    /// Only present when the order was paid.
    pub total_price: Option<i64>,
    pub items: Vec<OrderItem>,
}

impl OrderPlacement {
    fn new(customer: &Customer, finalized: FinalizedOrder) -> Self {
        let FinalizedOrder { order, payment } = finalized;
        let paid = order.status == OrderStatus::Paid;
        OrderPlacement {
            order_id: order.id,
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            transaction_id: payment.transaction_id,
            status: if paid {
                PaymentStatus::Success
            } else {
                PaymentStatus::Failed
            },
            message: payment.message,
            total_price: paid.then_some(order.total_amount),
            items: order.items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub payment: Payment,
    pub order: Order,
}

/// Runs the placement saga: draft, persist, pay, finalize.
///
/// Steps run sequentially on the calling thread and only move forward; there
/// is no compensation. Once the order row exists, a declined or failed payment
/// still ends in a terminal FAILED order.
pub struct OrderService<R> {
    repo: R,
    calculator: OrderDraftCalculator<R>,
    finalizer: OrderFinalizer<R>,
    gateway: Arc<dyn PaymentGateway>,
}

impl<R> OrderService<R>
where
    R: CustomerRepository + CartRepository + OrderRepository + Clone,
{
    pub fn new(repo: R, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            calculator: OrderDraftCalculator::new(repo.clone()),
            finalizer: OrderFinalizer::new(repo.clone()),
            repo,
            gateway,
        }
    }

    pub fn place_order(&self, customer_id: Uuid) -> Result<OrderPlacement, DomainError> {
        // 1. Price the cart; no order row exists if this fails.
        let draft = self.calculator.calculate(customer_id)?;

        // 2. Persist the CREATED order with its items.
        let order = self.repo.create(&draft)?;
        log::info!(
            "Order ID: {} created for Customer ID: {} (total {})",
            order.id,
            customer_id,
            order.total_amount
        );

        // 3. Ask the payment authority; never fails.
        let outcome = self.gateway.request_payment(order.id, order.total_amount);
        log::info!(
            "Payment for Order ID: {} returned {} (transaction id: {})",
            order.id,
            outcome.status,
            outcome.transaction_id.as_deref().unwrap_or("none")
        );

        // 4. Settle stock or clean up.
        let finalized = self.finalizer.finalize(order, outcome)?;

        Ok(OrderPlacement::new(draft.customer(), finalized))
    }

    pub fn get_order(&self, order_id: Uuid) -> Result<Order, DomainError> {
        self.repo
            .find_by_id(order_id)?
            .ok_or(DomainError::OrderNotFound(order_id))
    }

    pub fn get_payment(&self, order_id: Uuid) -> Result<PaymentDetails, DomainError> {
        let payment = self
            .repo
            .find_payment(order_id)?
            .ok_or(DomainError::PaymentNotFound(order_id))?;
        let order = self.get_order(order_id)?;
        Ok(PaymentDetails { payment, order })
    }
}
