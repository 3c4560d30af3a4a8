use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{DbConnection, DbPool};
use crate::domain::catalog::{Customer, Product};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CustomerRepository, ProductRepository};
use crate::schema::{customers, products};

use super::models::{CustomerRow, ProductRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// PostgreSQL-backed implementation of every repository port.
///
/// Each port method checks out its own pooled connection and runs in its own
/// transaction (read committed). Row-level races are caught through the
/// `version` columns rather than locks.
#[derive(Clone)]
pub struct DieselStore {
    pool: DbPool,
}

impl DieselStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(crate) fn conn(&self) -> Result<DbConnection, DomainError> {
        Ok(self.pool.get()?)
    }
}

impl CustomerRepository for DieselStore {
    fn find_customer(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        let mut conn = self.conn()?;

        let row = customers::table
            .find(id)
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Customer::from))
    }
}

impl ProductRepository for DieselStore {
    fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut conn = self.conn()?;

        let rows = products::table
            .filter(products::id.eq_any(ids.to_vec()))
            .select(ProductRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
