//! HTTP front door for a search service: a JSON search API plus the bundled
//! single-page frontend.

pub mod api;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod services;
