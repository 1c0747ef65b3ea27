pub mod connection;
pub mod ddl;
pub mod models;
pub mod repository;
pub mod schema;
pub mod validation;

// Re-export commonly used items
pub use connection::establish_connection;
pub use diesel::prelude::*;
pub use repository::{DatabaseContext, RepositoryError, RepositoryResult};
pub use validation::{ValidationError, Violation};
