//! In-memory store and stub gateway used by service tests.
//!
//! Mirrors the transactional rules of the Diesel store: every multi-row write
//! is validated up front and applied only when all checks pass.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::cart::{CartChangeSet, CartEntry, CartLine};
use crate::domain::catalog::{Customer, Product};
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderDraft, OrderStatus};
use crate::domain::payment::{Payment, PaymentOutcome};
use crate::domain::ports::{
    CartRepository, CustomerRepository, OrderRepository, PaymentGateway, ProductRepository,
};
use crate::domain::settlement::Settlement;

#[derive(Default)]
struct State {
    customers: HashMap<Uuid, Customer>,
    products: HashMap<Uuid, Product>,
    cart: BTreeMap<(Uuid, Uuid), CartLine>,
    orders: HashMap<Uuid, Order>,
    payments: HashMap<Uuid, Payment>,
    fail_cart_clear: bool,
    settle_race: Option<Uuid>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("store mutex poisoned")
    }

    pub fn add_customer(&self, name: &str) -> Customer {
        let customer = Customer {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.lock().customers.insert(customer.id, customer.clone());
        customer
    }

    pub fn add_product(&self, name: &str, price: i64, stock: i32) -> Product {
        let product = Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price,
            stock,
            version: 0,
        };
        self.lock().products.insert(product.id, product.clone());
        product
    }

    pub fn put_line(&self, customer_id: Uuid, product_id: Uuid, quantity: i32) {
        self.lock().cart.insert(
            (customer_id, product_id),
            CartLine {
                customer_id,
                product_id,
                quantity,
                version: 0,
            },
        );
    }

    pub fn stock(&self, product_id: Uuid) -> Option<i32> {
        self.lock().products.get(&product_id).map(|p| p.stock)
    }

    pub fn set_stock(&self, product_id: Uuid, stock: i32) {
        if let Some(p) = self.lock().products.get_mut(&product_id) {
            p.stock = stock;
            p.version += 1;
        }
    }

    pub fn remove_product(&self, product_id: Uuid) {
        self.lock().products.remove(&product_id);
    }

    pub fn line_quantity(&self, customer_id: Uuid, product_id: Uuid) -> Option<i32> {
        self.lock()
            .cart
            .get(&(customer_id, product_id))
            .map(|l| l.quantity)
    }

    pub fn cart_size(&self, customer_id: Uuid) -> usize {
        self.lock()
            .cart
            .keys()
            .filter(|(c, _)| *c == customer_id)
            .count()
    }

    /// Simulate a concurrent writer touching the line.
    pub fn bump_line_version(&self, customer_id: Uuid, product_id: Uuid) {
        if let Some(l) = self.lock().cart.get_mut(&(customer_id, product_id)) {
            l.version += 1;
        }
    }

    /// The next settlement sees another writer bump this product's version
    /// between its read and its guarded write.
    pub fn race_settlement_on(&self, product_id: Uuid) {
        self.lock().settle_race = Some(product_id);
    }

    pub fn fail_cart_clear(&self) {
        self.lock().fail_cart_clear = true;
    }

    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    pub fn payment_count(&self) -> usize {
        self.lock().payments.len()
    }
}

impl CustomerRepository for InMemoryStore {
    fn find_customer(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        Ok(self.lock().customers.get(&id).cloned())
    }
}

impl ProductRepository for InMemoryStore {
    fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let state = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }
}

impl CartRepository for InMemoryStore {
    fn find_lines(
        &self,
        customer_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<Vec<CartLine>, DomainError> {
        let state = self.lock();
        Ok(product_ids
            .iter()
            .filter_map(|p| state.cart.get(&(customer_id, *p)).cloned())
            .collect())
    }

    fn find_entries(&self, customer_id: Uuid) -> Result<Vec<CartEntry>, DomainError> {
        let state = self.lock();
        Ok(state
            .cart
            .values()
            .filter(|l| l.customer_id == customer_id)
            .filter_map(|l| {
                state.products.get(&l.product_id).map(|p| CartEntry {
                    line: l.clone(),
                    product: p.clone(),
                })
            })
            .collect())
    }

    fn apply_changes(&self, changes: &CartChangeSet) -> Result<(), DomainError> {
        let mut state = self.lock();
        let customer_id = changes.customer_id;

        for d in &changes.deletions {
            let current = state.cart.get(&(customer_id, d.product_id)).map(|l| l.version);
            if current != Some(d.expected_version) {
                return Err(DomainError::Conflict(format!(
                    "cart line for product {} was modified concurrently",
                    d.product_id
                )));
            }
        }
        for u in &changes.upserts {
            let current = state.cart.get(&(customer_id, u.product_id)).map(|l| l.version);
            if current != u.expected_version {
                return Err(DomainError::Conflict(format!(
                    "cart line for product {} was modified concurrently",
                    u.product_id
                )));
            }
        }

        for d in &changes.deletions {
            state.cart.remove(&(customer_id, d.product_id));
        }
        for u in &changes.upserts {
            let version = u.expected_version.map_or(0, |v| v + 1);
            state.cart.insert(
                (customer_id, u.product_id),
                CartLine {
                    customer_id,
                    product_id: u.product_id,
                    quantity: u.quantity,
                    version,
                },
            );
        }
        Ok(())
    }

    fn clear(&self, customer_id: Uuid) -> Result<usize, DomainError> {
        let mut state = self.lock();
        if state.fail_cart_clear {
            return Err(DomainError::Internal("cart storage unavailable".into()));
        }
        let before = state.cart.len();
        state.cart.retain(|(c, _), _| *c != customer_id);
        Ok(before - state.cart.len())
    }
}

impl OrderRepository for InMemoryStore {
    fn create(&self, draft: &OrderDraft) -> Result<Order, DomainError> {
        let order = Order {
            id: Uuid::new_v4(),
            customer_id: draft.customer().id,
            total_amount: draft.total_amount(),
            status: OrderStatus::Created,
            items: draft.items().to_vec(),
            created_at: Utc::now(),
        };
        self.lock().orders.insert(order.id, order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.lock().orders.get(&id).cloned())
    }

    fn settle(&self, settlement: &Settlement) -> Result<Payment, DomainError> {
        let mut state = self.lock();

        let mut touched: HashMap<Uuid, Product> = HashMap::new();
        for dec in &settlement.stock_decrements {
            let mut product = match touched.remove(&dec.product_id) {
                Some(p) => p,
                None => state
                    .products
                    .get(&dec.product_id)
                    .cloned()
                    .ok_or_else(|| DomainError::ProductNotFound(vec![dec.product_id]))?,
            };
            let read_version = product.version;
            product.decrease_stock(dec.quantity)?;

            if state.settle_race == Some(product.id) {
                state.settle_race = None;
                if let Some(stored) = state.products.get_mut(&product.id) {
                    stored.version += 1;
                }
            }
            if state.products.get(&product.id).map(|p| p.version) != Some(read_version) {
                return Err(DomainError::Conflict(format!(
                    "product {} was modified concurrently",
                    product.id
                )));
            }
            touched.insert(product.id, product);
        }

        let order = state
            .orders
            .get(&settlement.order_id)
            .ok_or(DomainError::OrderNotFound(settlement.order_id))?;
        if order.status != OrderStatus::Created {
            return Err(DomainError::Conflict(format!(
                "order {} was already finalized",
                settlement.order_id
            )));
        }

        for (id, mut product) in touched {
            product.version += 1;
            state.products.insert(id, product);
        }
        if let Some(order) = state.orders.get_mut(&settlement.order_id) {
            order.status = settlement.status;
            order.total_amount = settlement.total_amount;
            if settlement.clear_items {
                order.items.clear();
            }
        }
        let payment = Payment {
            id: Uuid::new_v4(),
            order_id: settlement.order_id,
            transaction_id: settlement.payment.transaction_id.clone(),
            status: settlement.payment.status,
            message: settlement.payment.message.clone(),
            created_at: Utc::now(),
        };
        state.payments.insert(payment.order_id, payment.clone());
        Ok(payment)
    }

    fn find_payment(&self, order_id: Uuid) -> Result<Option<Payment>, DomainError> {
        Ok(self.lock().payments.get(&order_id).cloned())
    }
}

/// Gateway that always answers with a fixed outcome and counts calls.
pub struct StubGateway {
    outcome: PaymentOutcome,
    calls: AtomicUsize,
}

impl StubGateway {
    pub fn new(outcome: PaymentOutcome) -> Self {
        StubGateway {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for StubGateway {
    fn request_payment(&self, _order_id: Uuid, _amount: i64) -> PaymentOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
