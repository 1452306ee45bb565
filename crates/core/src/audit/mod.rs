//! Activity log vocabulary.
//!
//! Repositories build an [`ActivityEntry`] for every mutation and write it in
//! the same database transaction as the change.

mod types;

pub use types::{ActivityAction, ActivityEntry, EntityKind};
