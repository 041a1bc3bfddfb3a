// src/config/mod.rs
pub mod secrets;
pub mod watch;

pub use secrets::Secrets;
pub use watch::{SourceCfg, SourceKind, WatchConfig};
