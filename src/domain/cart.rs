use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::catalog::Product;
use super::errors::DomainError;

/// A stored (customer, product) quantity record. Stored lines always have a
/// quantity of at least one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub version: i32,
}

/// A signed quantity change requested for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLineDelta {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A cart line joined with the current state of its product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEntry {
    pub line: CartLine,
    pub product: Product,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub customer_id: Uuid,
    pub entries: Vec<CartEntry>,
}

/// Insert (`expected_version == None`) or version-checked update of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineUpsert {
    pub product_id: Uuid,
    pub quantity: i32,
    pub expected_version: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineDeletion {
    pub product_id: Uuid,
    pub expected_version: i32,
}

/// Every write produced by one merge request. Applied in a single storage
/// transaction or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartChangeSet {
    pub customer_id: Uuid,
    pub upserts: Vec<CartLineUpsert>,
    pub deletions: Vec<CartLineDeletion>,
}

impl CartChangeSet {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletions.is_empty()
    }
}

/// Ids in `requested` that are absent from `found`, in request order.
pub fn missing_product_ids(requested: &[Uuid], found: &[Product]) -> Vec<Uuid> {
    let found: HashSet<Uuid> = found.iter().map(|p| p.id).collect();
    let mut seen = HashSet::new();
    requested
        .iter()
        .filter(|id| !found.contains(id) && seen.insert(**id))
        .copied()
        .collect()
}

/// Compute the writes that apply `deltas` to the customer's cart.
///
/// `products` must hold every referenced product and `existing` the stored
/// lines for the requested (customer, product) pairs. The request is rejected
/// as a whole when any line would exceed its product's stock; nothing is
/// partially applied.
pub fn plan_merge(
    customer_id: Uuid,
    deltas: &[CartLineDelta],
    products: &[Product],
    existing: &[CartLine],
) -> Result<CartChangeSet, DomainError> {
    let mut seen = HashSet::new();
    if let Some(dup) = deltas.iter().find(|d| !seen.insert(d.product_id)) {
        return Err(DomainError::BadParameter(format!(
            "product {} appears more than once in the request",
            dup.product_id
        )));
    }

    let requested: Vec<Uuid> = deltas.iter().map(|d| d.product_id).collect();
    let missing = missing_product_ids(&requested, products);
    if !missing.is_empty() {
        return Err(DomainError::ProductNotFound(missing));
    }

    let products: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();
    let existing: HashMap<Uuid, &CartLine> = existing
        .iter()
        .filter(|l| l.customer_id == customer_id)
        .map(|l| (l.product_id, l))
        .collect();

    let mut changes = CartChangeSet {
        customer_id,
        upserts: Vec::new(),
        deletions: Vec::new(),
    };

    for delta in deltas {
        let product = products[&delta.product_id];
        let line = existing.get(&delta.product_id);
        let existing_qty = line.map_or(0, |l| i64::from(l.quantity));
        let new_qty = existing_qty + i64::from(delta.quantity);

        if i64::from(product.stock) < new_qty {
            return Err(DomainError::OutOfStock {
                product_id: None,
                requested: i64::from(delta.quantity),
                available: i64::from(product.stock),
            });
        }

        if new_qty <= 0 {
            if let Some(line) = line {
                changes.deletions.push(CartLineDeletion {
                    product_id: delta.product_id,
                    expected_version: line.version,
                });
            }
        } else {
            // bounded by stock, which is an i32
            let quantity = new_qty as i32;
            changes.upserts.push(CartLineUpsert {
                product_id: delta.product_id,
                quantity,
                expected_version: line.map(|l| l.version),
            });
        }
    }

    Ok(changes)
}
