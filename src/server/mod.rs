// Server module entry
// TCP listener, per-connection HTTP serving, accept loop and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_listener;
pub use server_loop::run;
pub use signal::{start_signal_handler, Shutdown};
