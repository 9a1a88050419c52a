//! Store hours: one record per calendar day, layered as domain, repository and service.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::StoreHoursService;
