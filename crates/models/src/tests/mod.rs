
/// CRUD operations against a migrated in-memory SQLite database
pub mod crud_tests;
