pub mod auth;
pub mod config;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
