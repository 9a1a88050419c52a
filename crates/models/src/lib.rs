pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod store_hours;

#[cfg(test)]
mod tests;
