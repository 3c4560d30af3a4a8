use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
}

/// Product as seen by the checkout flow. `version` is the optimistic-lock
/// token read together with `stock`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub stock: i32,
    pub version: i32,
}

impl Product {
    pub fn decrease_stock(&mut self, amount: i32) -> Result<(), DomainError> {
        if amount <= 0 {
            return Err(DomainError::BadParameter(format!(
                "stock decrement must be positive, got {} for product {}",
                amount, self.id
            )));
        }
        if self.stock < amount {
            return Err(DomainError::OutOfStock {
                product_id: Some(self.id),
                requested: i64::from(amount),
                available: i64::from(self.stock),
            });
        }
        self.stock -= amount;
        Ok(())
    }
}
