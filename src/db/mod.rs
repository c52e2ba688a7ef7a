pub mod connection;
mod migrations;
pub mod repositories;

pub use connection::Database;
