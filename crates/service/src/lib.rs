//! Service layer providing business-oriented CRUD operations on top of models.
//! - Separates business rules from data access.
//! - Reuses validation and entity definitions in the `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod dish;
pub mod errors;
