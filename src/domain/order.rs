use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cart::CartEntry;
use super::catalog::Customer;
use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Created,
    Paid,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Paid => "PAID",
            OrderStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Created)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(OrderStatus::Created),
            "PAID" => Ok(OrderStatus::Paid),
            "FAILED" => Ok(OrderStatus::Failed),
            other => Err(DomainError::Internal(format!(
                "unknown order status '{}'",
                other
            ))),
        }
    }
}

/// Priced line of an order. Name and price are copied from the product when
/// the draft is calculated and never re-read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
}

impl OrderItem {
    pub fn line_amount(&self) -> Result<i64, DomainError> {
        self.price
            .checked_mul(i64::from(self.quantity))
            .ok_or_else(|| overflow(self.product_id))
    }
}

/// Immutable, fully priced snapshot of a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    customer: Customer,
    total_amount: i64,
    items: Vec<OrderItem>,
}

impl OrderDraft {
    /// Price every cart entry against the product state it was loaded with.
    ///
    /// Stock is re-verified per line since it may have moved after the line
    /// was merged into the cart.
    pub fn from_cart(customer: Customer, entries: Vec<CartEntry>) -> Result<Self, DomainError> {
        if entries.is_empty() {
            return Err(DomainError::CartEmpty);
        }

        let mut total_amount: i64 = 0;
        let mut items = Vec::with_capacity(entries.len());

        for CartEntry { line, product } in entries {
            if product.stock < line.quantity {
                return Err(DomainError::OutOfStock {
                    product_id: Some(product.id),
                    requested: i64::from(line.quantity),
                    available: i64::from(product.stock),
                });
            }

            let item = OrderItem {
                product_id: product.id,
                name: product.name,
                price: product.price,
                quantity: line.quantity,
            };
            total_amount = total_amount
                .checked_add(item.line_amount()?)
                .ok_or_else(|| overflow(item.product_id))?;

            items.push(item);
        }

        Ok(OrderDraft {
            customer,
            total_amount,
            items,
        })
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn total_amount(&self) -> i64 {
        self.total_amount
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }
}

/// Order aggregate. Items are owned by the order and never exist on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn mark_paid(&mut self) -> Result<(), DomainError> {
        self.ensure_created(OrderStatus::Paid)?;
        self.status = OrderStatus::Paid;
        Ok(())
    }

    /// A failed order keeps no billable lines, so the total drops with them.
    pub fn mark_failed(&mut self) -> Result<(), DomainError> {
        self.ensure_created(OrderStatus::Failed)?;
        self.status = OrderStatus::Failed;
        self.items.clear();
        self.total_amount = 0;
        Ok(())
    }

    pub fn items_total(&self) -> Result<i64, DomainError> {
        self.items.iter().try_fold(0i64, |acc, item| {
            acc.checked_add(item.line_amount()?)
                .ok_or_else(|| overflow(item.product_id))
        })
    }

    fn ensure_created(&self, target: OrderStatus) -> Result<(), DomainError> {
        if self.status != OrderStatus::Created {
            return Err(DomainError::Internal(format!(
                "order {} is already {} and cannot become {}",
                self.id, self.status, target
            )));
        }
        Ok(())
    }
}

fn overflow(product_id: Uuid) -> DomainError {
    DomainError::BadParameter(format!("order amount overflows for product {}", product_id))
}
