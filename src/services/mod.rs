pub mod context;
pub mod todo_service;

pub use context::ServiceContext;
