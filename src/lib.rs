//! artspace - art marketplace backend
//!
//! Accounts with artist and collector roles, cookie sessions and bearer
//! tokens, and the catalog of artworks, artists and sales behind them.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;

pub use config::Config;
pub use error::Error;
