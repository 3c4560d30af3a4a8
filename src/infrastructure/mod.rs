pub mod cart_repo;
pub mod models;
pub mod order_repo;
pub mod payment_gateway;
pub mod store;

#[cfg(test)]
pub mod memory;
#[cfg(test)]
pub(crate) mod test_db;

pub use payment_gateway::HttpPaymentGateway;
pub use store::DieselStore;
