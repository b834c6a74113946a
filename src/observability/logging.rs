//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Human-readable INFO output on stderr
//! - Verbose DEBUG output to a size-capped rotating file in debug mode

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::ObservabilityConfig;
use crate::error::{ProbeError, ProbeResult};

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> ProbeResult<()> {
    let stderr_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rate_unlimiter={}", config.log_level)));
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_filter(stderr_filter);

    let file_layer = if config.debug {
        let file = RotatingFile::open(&config.log_file, config.log_max_bytes).map_err(|source| {
            ProbeError::Io {
                path: PathBuf::from(&config.log_file),
                source,
            }
        })?;
        Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(EnvFilter::new("rate_unlimiter=debug")),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ProbeError::Logging(e.to_string()))
}

/// Append-only log file that rolls over to `<path>.1` past `max_bytes`.
///
/// One backup is kept; the previous backup is overwritten.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    written: u64,
    file: File,
}

impl RotatingFile {
    pub fn open(path: impl AsRef<Path>, max_bytes: u64) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            written,
            file,
        })
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".1");
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        fs::rename(&self.path, self.backup_path())?;
        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let over_limit = self.written + buf.len() as u64 > self.max_bytes;
        if self.max_bytes > 0 && self.written > 0 && over_limit {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_below_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.log");

        let mut file = RotatingFile::open(&path, 1024).unwrap();
        file.write_all(b"first line\n").unwrap();
        file.write_all(b"second line\n").unwrap();
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first line\nsecond line\n");
        assert!(!file.backup_path().exists());
    }

    #[test]
    fn test_rotates_past_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.log");

        let mut file = RotatingFile::open(&path, 16).unwrap();
        file.write_all(b"0123456789\n").unwrap();
        file.write_all(b"abcdefghij\n").unwrap();
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "abcdefghij\n");
        assert_eq!(fs::read_to_string(file.backup_path()).unwrap(), "0123456789\n");
    }

    #[test]
    fn test_resumes_existing_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.log");
        fs::write(&path, "previous run output\n").unwrap();

        let mut file = RotatingFile::open(&path, 24).unwrap();
        file.write_all(b"new run\n").unwrap();
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new run\n");
        assert_eq!(
            fs::read_to_string(file.backup_path()).unwrap(),
            "previous run output\n"
        );
    }
}
