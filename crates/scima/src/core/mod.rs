//! Core abstractions shared by every database backend.
//!
//! - [`Connection`]: narrowed SQL execution capability (execute / query)
//! - [`Dialect`]: bookkeeping-table operations for one database engine
//! - [`DialectCatalog`]: explicit name → dialect registry

pub mod catalog;
pub mod traits;
pub mod value;

pub use catalog::DialectCatalog;
pub use traits::{AppliedVersions, Connection, Dialect};
pub use value::{Row, Rows};
