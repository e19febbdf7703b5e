//! Request handler module
//!
//! Top-level dispatch between the API surface and the frontend bundle.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
