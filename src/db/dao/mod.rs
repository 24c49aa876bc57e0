mod context;
pub mod error;
pub mod filter;
pub mod patch;
pub mod todo_dao;

pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use filter::{FilterOptions, SortField, SortOrder};
pub use patch::Patch;
pub use todo_dao::{CreateTodo, TodoDao, UpdateTodo};
