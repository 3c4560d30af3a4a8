use uuid::Uuid;

use super::cart::{CartChangeSet, CartEntry, CartLine};
use super::catalog::{Customer, Product};
use super::errors::DomainError;
use super::order::{Order, OrderDraft};
use super::payment::{Payment, PaymentOutcome};
use super::settlement::Settlement;

pub trait CustomerRepository: Send + Sync + 'static {
    fn find_customer(&self, id: Uuid) -> Result<Option<Customer>, DomainError>;
}

pub trait ProductRepository: Send + Sync + 'static {
    /// Batch read; ids that do not exist are simply absent from the result.
    fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    /// Stored lines for exactly the given (customer, product) pairs.
    fn find_lines(&self, customer_id: Uuid, product_ids: &[Uuid])
        -> Result<Vec<CartLine>, DomainError>;

    /// Every line of the customer joined with its current product.
    fn find_entries(&self, customer_id: Uuid) -> Result<Vec<CartEntry>, DomainError>;

    /// Apply all deletions and upserts in one transaction. Any version
    /// mismatch rolls everything back and yields `DomainError::Conflict`.
    fn apply_changes(&self, changes: &CartChangeSet) -> Result<(), DomainError>;

    /// Delete every line of the customer, returning how many were removed.
    fn clear(&self, customer_id: Uuid) -> Result<usize, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Persist a CREATED order together with its items.
    fn create(&self, draft: &OrderDraft) -> Result<Order, DomainError>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;

    /// Apply a settlement atomically and return the stored payment record.
    fn settle(&self, settlement: &Settlement) -> Result<Payment, DomainError>;

    fn find_payment(&self, order_id: Uuid) -> Result<Option<Payment>, DomainError>;
}

/// Client of the external payment authority.
///
/// Infallible by contract: transport problems come back as a FAILED outcome.
pub trait PaymentGateway: Send + Sync + 'static {
    fn request_payment(&self, order_id: Uuid, amount: i64) -> PaymentOutcome;
}
