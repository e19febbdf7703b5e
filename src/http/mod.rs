//! HTTP protocol layer module
//!
//! Protocol helpers shared by the API routers and the frontend handler,
//! decoupled from search semantics.

pub mod cache;
pub mod cors;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use cache::CachePolicy;
pub use cors::CorsPolicy;
pub use range::{parse_range_header, RangeOutcome};
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_416_response, build_empty_response, build_options_response,
};
