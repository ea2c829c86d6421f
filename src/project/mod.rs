//! Project-level glue: where a project's index is persisted and how the
//! daemon is reached.

mod config;
mod storage;

pub use config::{DEFAULT_TCP_PORT, ServerConfig, parse_host};
pub use storage::{DATABASE_VERSION, ProjectStorage, decode_project_path, encode_project_path};
