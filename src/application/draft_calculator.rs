use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::OrderDraft;
use crate::domain::ports::{CartRepository, CustomerRepository};

/// Turns the current cart of a customer into a priced `OrderDraft`.
pub struct OrderDraftCalculator<R> {
    repo: R,
}

impl<R> OrderDraftCalculator<R>
where
    R: CustomerRepository + CartRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn calculate(&self, customer_id: Uuid) -> Result<OrderDraft, DomainError> {
        let customer = self
            .repo
            .find_customer(customer_id)?
            .ok_or(DomainError::CustomerNotFound(customer_id))?;

        let entries = self.repo.find_entries(customer_id)?;
        OrderDraft::from_cart(customer, entries)
    }
}
