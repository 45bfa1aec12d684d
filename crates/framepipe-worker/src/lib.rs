//! Analysis worker run-loop and capability interface.
//!
//! A worker is long-lived: it performs one-time setup, then repeatedly
//! requests a frame from the supervisor, runs a pluggable analysis
//! capability on it, and reports results and timing, until the input
//! stream ends.

pub mod capability;
pub mod codec;
pub mod error;
pub mod runtime;
pub mod state;

pub use capability::{Capability, WorkerContext};
pub use codec::{ImageCodec, JpegCodec};
pub use error::{Result, WorkerError};
pub use runtime::Worker;
pub use state::StateBag;
