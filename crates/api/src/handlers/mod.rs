pub mod downgrade;
pub mod products;
pub mod quota;
