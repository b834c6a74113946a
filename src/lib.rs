//! Rate limit discovery by adaptive probing.

pub mod cli;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod probe;
pub mod resilience;
pub mod transport;

pub use config::schema::ProbeConfig;
pub use error::{ProbeError, ProbeResult};
pub use lifecycle::Shutdown;
pub use probe::{ProbeLoop, ProbeReport};
pub use transport::{HttpTransport, Transport};
