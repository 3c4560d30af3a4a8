use uuid::Uuid;

use super::errors::DomainError;
use super::order::{Order, OrderStatus};
use super::payment::PaymentOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDecrement {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Writes that move a CREATED order into its terminal state.
///
/// A store applies a settlement atomically: stock decrements, the guarded
/// status transition, item removal and the payment record commit together
/// or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub clear_items: bool,
    pub stock_decrements: Vec<StockDecrement>,
    pub payment: PaymentOutcome,
}

impl Settlement {
    /// Apply `outcome` to `order` in memory and describe the matching writes.
    pub fn plan(order: &mut Order, outcome: PaymentOutcome) -> Result<Self, DomainError> {
        let stock_decrements = if outcome.is_success() {
            order.mark_paid()?;
            order
                .items
                .iter()
                .map(|item| StockDecrement {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect()
        } else {
            order.mark_failed()?;
            Vec::new()
        };

        Ok(Settlement {
            order_id: order.id,
            customer_id: order.customer_id,
            status: order.status,
            total_amount: order.total_amount,
            clear_items: order.status == OrderStatus::Failed,
            stock_decrements,
            payment: outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::order::OrderItem;
    use crate::domain::payment::PaymentStatus;

    fn created_order() -> Order {
        Order {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            total_amount: 8000,
            status: OrderStatus::Created,
            items: vec![
                OrderItem {
                    product_id: Uuid::new_v4(),
                    name: "p1".into(),
                    price: 1000,
                    quantity: 2,
                },
                OrderItem {
                    product_id: Uuid::new_v4(),
                    name: "p2".into(),
                    price: 2000,
                    quantity: 3,
                },
            ],
            created_at: Utc::now(),
        }
    }

    fn success() -> PaymentOutcome {
        PaymentOutcome {
            status: PaymentStatus::Success,
            transaction_id: Some("tx-1".into()),
            message: Some("approved".into()),
        }
    }

    #[test]
    fn success_decrements_every_item() {
        let mut order = created_order();
        let settlement = Settlement::plan(&mut order, success()).unwrap();

        assert_eq!(settlement.status, OrderStatus::Paid);
        assert_eq!(settlement.total_amount, 8000);
        assert!(!settlement.clear_items);
        assert_eq!(
            settlement.stock_decrements,
            vec![
                StockDecrement {
                    product_id: order.items[0].product_id,
                    quantity: 2
                },
                StockDecrement {
                    product_id: order.items[1].product_id,
                    quantity: 3
                },
            ]
        );
        assert_eq!(settlement.payment.transaction_id.as_deref(), Some("tx-1"));
    }

    #[test]
    fn failure_clears_items_and_leaves_stock_alone() {
        let mut order = created_order();
        let settlement = Settlement::plan(&mut order, PaymentOutcome::transport_failure()).unwrap();

        assert_eq!(settlement.status, OrderStatus::Failed);
        assert_eq!(settlement.total_amount, 0);
        assert!(settlement.clear_items);
        assert!(settlement.stock_decrements.is_empty());
        assert!(order.items.is_empty());
    }

    #[test]
    fn finalized_order_cannot_be_settled_twice() {
        let mut order = created_order();
        Settlement::plan(&mut order, success()).unwrap();
        assert!(Settlement::plan(&mut order, PaymentOutcome::transport_failure()).is_err());
        assert_eq!(order.status, OrderStatus::Paid);
    }
}
