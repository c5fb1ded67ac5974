//! hisab-engine: reconciles the local parse with a remote inference call
//!
//! The local parser always runs first and synchronously. The remote call runs
//! on a tokio task tagged with a generation number; only an outcome carrying
//! the current generation may change what callers see.

pub mod config;
pub mod controller;
pub mod merge;
pub mod remote;
pub mod session;

pub use config::{EngineConfig, ParserSection, RemoteSection, Today};
pub use controller::{Disposition, Reconciler, RemoteOutcome, Update};
pub use merge::merge;
pub use remote::{HttpInferenceClient, InferenceClient, RemoteError, RemoteFields, RemoteParse};
pub use session::{CancelHandle, ParseSession};
