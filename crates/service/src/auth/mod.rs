//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Backs the capability gates: who is signed in, and whether their email is verified.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;
pub mod tokens;

pub use service::AuthService;
