use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::cart::{CartChangeSet, CartEntry, CartLine};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::{cart_lines, products};

use super::models::{CartLineRow, NewCartLineRow, ProductRow};
use super::store::DieselStore;

fn stale_line(product_id: Uuid) -> DomainError {
    DomainError::Conflict(format!(
        "Cart update conflict for product {}. Please try again.",
        product_id
    ))
}

impl CartRepository for DieselStore {
    fn find_lines(
        &self,
        customer_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<Vec<CartLine>, DomainError> {
        if product_ids.is_empty() {
            return Ok(vec![]);
        }
        let mut conn = self.conn()?;

        let rows = cart_lines::table
            .filter(cart_lines::customer_id.eq(customer_id))
            .filter(cart_lines::product_id.eq_any(product_ids.to_vec()))
            .select(CartLineRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    fn find_entries(&self, customer_id: Uuid) -> Result<Vec<CartEntry>, DomainError> {
        let mut conn = self.conn()?;

        let rows: Vec<(CartLineRow, ProductRow)> = cart_lines::table
            .inner_join(products::table)
            .filter(cart_lines::customer_id.eq(customer_id))
            .order((cart_lines::created_at.asc(), cart_lines::product_id.asc()))
            .select((CartLineRow::as_select(), ProductRow::as_select()))
            .load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(line, product)| CartEntry {
                line: line.into(),
                product: product.into(),
            })
            .collect())
    }

    fn apply_changes(&self, changes: &CartChangeSet) -> Result<(), DomainError> {
        let mut conn = self.conn()?;
        let customer_id = changes.customer_id;

        conn.transaction::<_, DomainError, _>(|conn| {
            let now = Utc::now();

            // 1. Deletions, each guarded by the version that was read
            for d in &changes.deletions {
                let deleted = diesel::delete(
                    cart_lines::table
                        .filter(cart_lines::customer_id.eq(customer_id))
                        .filter(cart_lines::product_id.eq(d.product_id))
                        .filter(cart_lines::version.eq(d.expected_version)),
                )
                .execute(conn)?;
                if deleted != 1 {
                    return Err(stale_line(d.product_id));
                }
            }

            // 2. Upserts: version-checked update, or insert that must not collide
            for u in &changes.upserts {
                let written = match u.expected_version {
                    Some(version) => diesel::update(
                        cart_lines::table
                            .filter(cart_lines::customer_id.eq(customer_id))
                            .filter(cart_lines::product_id.eq(u.product_id))
                            .filter(cart_lines::version.eq(version)),
                    )
                    .set((
                        cart_lines::quantity.eq(u.quantity),
                        cart_lines::version.eq(version + 1),
                        cart_lines::updated_at.eq(now),
                    ))
                    .execute(conn)?,
                    None => diesel::insert_into(cart_lines::table)
                        .values(&NewCartLineRow {
                            customer_id,
                            product_id: u.product_id,
                            quantity: u.quantity,
                        })
                        .on_conflict_do_nothing()
                        .execute(conn)?,
                };
                if written != 1 {
                    return Err(stale_line(u.product_id));
                }
            }

            Ok(())
        })
    }

    fn clear(&self, customer_id: Uuid) -> Result<usize, DomainError> {
        let mut conn = self.conn()?;

        let removed = diesel::delete(cart_lines::table.filter(cart_lines::customer_id.eq(customer_id)))
            .execute(&mut conn)?;

        Ok(removed)
    }
}
