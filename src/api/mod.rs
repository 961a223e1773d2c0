//! HTTP API server

pub mod catalog;
mod extract;
pub mod routes;
pub mod server;

pub use extract::{JsonBody, PathParam};
pub use server::*;
