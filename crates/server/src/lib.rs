pub mod errors;
pub mod gate;
pub mod inertia;
pub mod openapi;
pub mod pages;
pub mod routes;
pub mod startup;
pub mod state;

pub use startup::serve;
