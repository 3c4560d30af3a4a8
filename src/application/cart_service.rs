use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::cart::{plan_merge, CartLineDelta, CartView};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartRepository, CustomerRepository, ProductRepository};

pub struct CartService<R> {
    repo: R,
}

impl<R> CartService<R>
where
    R: CustomerRepository + ProductRepository + CartRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Apply signed quantity deltas to the customer's cart.
    ///
    /// All referenced products and existing lines are read in one batch each.
    /// Lines dropping to zero or below are deleted. Either every write commits
    /// or none does; a concurrent modification surfaces as `Conflict` and the
    /// caller may retry the whole request.
    pub fn merge(&self, customer_id: Uuid, deltas: &[CartLineDelta]) -> Result<(), DomainError> {
        self.repo
            .find_customer(customer_id)?
            .ok_or(DomainError::CustomerNotFound(customer_id))?;

        if deltas.is_empty() {
            return Ok(());
        }

        let mut seen = HashSet::new();
        let product_ids: Vec<Uuid> = deltas
            .iter()
            .map(|d| d.product_id)
            .filter(|id| seen.insert(*id))
            .collect();

        let products = self.repo.find_products(&product_ids)?;
        let existing = self.repo.find_lines(customer_id, &product_ids)?;
        let changes = plan_merge(customer_id, deltas, &products, &existing)?;

        if changes.is_empty() {
            return Ok(());
        }
        self.repo.apply_changes(&changes)?;

        log::debug!(
            "Cart of customer {} merged: {} upserted, {} deleted",
            customer_id,
            changes.upserts.len(),
            changes.deletions.len()
        );
        Ok(())
    }

    pub fn view(&self, customer_id: Uuid) -> Result<CartView, DomainError> {
        self.repo
            .find_customer(customer_id)?
            .ok_or(DomainError::CustomerNotFound(customer_id))?;

        Ok(CartView {
            customer_id,
            entries: self.repo.find_entries(customer_id)?,
        })
    }

    /// Best-effort; failures are logged and swallowed.
    pub fn clear(&self, customer_id: Uuid) {
        clear_cart(&self.repo, customer_id);
    }
}

/// Delete every cart line of the customer without ever reporting failure.
pub fn clear_cart<R: CartRepository + ?Sized>(repo: &R, customer_id: Uuid) {
    match repo.clear(customer_id) {
        Ok(removed) => log::debug!("Cleared {} cart line(s) for customer {}", removed, customer_id),
        Err(e) => log::error!(
            "Failed to clear cart for Customer ID: {}. Error: {}",
            customer_id,
            e
        ),
    }
}
