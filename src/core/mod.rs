//! Core process state shared across threads.

mod state;

pub use state::{
    is_serving, is_shutdown, register_server, request_shutdown, set_serving,
    setup_shutdown_handler,
};
