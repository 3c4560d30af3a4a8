pub mod cart_service;
pub mod draft_calculator;
pub mod order_finalizer;
pub mod order_service;
