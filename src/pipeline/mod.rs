pub mod context;
pub mod cycle;
pub mod driver;
