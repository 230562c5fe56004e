//! Command implementations behind the `tempograph` binary.
//!
//! - **analyze**: build the graph, export it or lint it
//! - **init**: write a default `.tempograph.toml`

pub mod analyze;
pub mod init;

pub use analyze::handle_analyze;
pub use init::init_config;
