pub mod connection;
pub mod dao;
pub mod entities;
pub mod error;
pub mod schema;

pub use error::StoreError;
