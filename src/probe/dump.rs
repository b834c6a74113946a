//! Request history dump written on exit in debug mode.
//!
//! # Format
//! ```text
//! {
//!   "request_times": [0.0, 15.0, ...],
//!   "fail_times": [[59.7, 1, 1], ...]
//! }
//! ```
//! Times are seconds since the session started.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, ProbeResult};
use crate::probe::history::ProbeHistory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugDump {
    pub request_times: Vec<f64>,
    /// `(time, consecutive fail index, weight)`
    pub fail_times: Vec<(f64, u32, u32)>,
}

impl DebugDump {
    pub fn from_history(history: &ProbeHistory) -> Self {
        Self {
            request_times: history
                .attempts()
                .iter()
                .map(|a| history.offset_secs(a.timestamp))
                .collect(),
            fail_times: history
                .failures()
                .iter()
                .map(|f| (history.offset_secs(f.timestamp), f.consecutive_index, f.weight))
                .collect(),
        }
    }

    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn write_to(&self, path: &Path) -> ProbeResult<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ProbeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            requests = self.request_times.len(),
            "Request history written"
        );
        Ok(())
    }
}
