//! Service layer providing business-oriented operations on top of models.
//! - Separates business rules from data access via repository traits.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod auth;
pub mod store_hours;
pub mod pagination;
#[cfg(test)]
pub mod test_support;
