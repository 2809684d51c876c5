//! Persistence layer: save records, the file store, and its errors.

mod error;
mod record;
mod repository;

pub use error::{StoreError, StoreErrorKind};
pub use record::{FirstMove, GameRecord};
pub use repository::SaveStore;
