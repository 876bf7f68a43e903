//! Forkful - a recipe sharing service.
//!
//! Users author recipes, rate and comment on each other's cooking, keep
//! favorites, and group recipes into shareable collections. Everything is
//! persisted in MongoDB; the HTTP surface is a JSON API served by axum.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod server;

pub use config::Config;
pub use db::Store;
pub use error::ServiceError;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
