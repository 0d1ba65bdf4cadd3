//! AVIF encoder configuration
//!
//! Provides configuration for [`AvifEncoder`](crate::AvifEncoder) with a
//! builder pattern for ergonomic construction.
//!
//! The worker thread hint is computed once per process, from the CPU count
//! or the `LAMCO_AVIF_THREADS` environment variable, and then carried
//! explicitly in [`AvifConfig::max_threads`].
//!
//! # Examples
//!
//! ```rust
//! use lamco_avif::AvifConfig;
//!
//! // Using builder pattern
//! let config = AvifConfig::builder().max_threads(2).build();
//! assert_eq!(config.max_threads, 2);
//!
//! // Using struct literal with defaults
//! let config = AvifConfig {
//!     max_threads: 1,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::dump::{DirectoryDump, PayloadDump};

/// Environment variable overriding the worker thread hint
pub const THREADS_ENV: &str = "LAMCO_AVIF_THREADS";

/// Environment variable enabling the payload dump directory
pub const DUMP_DIR_ENV: &str = "LAMCO_AVIF_DUMP_DIR";

/// Upper bound of the CPU-derived default thread hint
pub const MAX_DEFAULT_THREADS: usize = 4;

/// Hard ceiling accepted by [`AvifConfig::validate`]
pub const MAX_THREADS: usize = 64;

static PROCESS_THREAD_HINT: OnceLock<usize> = OnceLock::new();

/// Default thread hint for `cpus` logical processors
///
/// Half the processors, at least 1 and at most [`MAX_DEFAULT_THREADS`].
pub fn default_thread_count(cpus: usize) -> usize {
    (cpus / 2).clamp(1, MAX_DEFAULT_THREADS)
}

/// Thread hint from an optional override value
///
/// An integer override in `1..=MAX_THREADS` wins. Anything else falls back
/// to [`default_thread_count`].
pub fn thread_hint_from(value: Option<&str>, cpus: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| (1..=MAX_THREADS).contains(n))
        .unwrap_or_else(|| default_thread_count(cpus))
}

/// Logical processors available to this process
pub fn available_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Process-wide thread hint
///
/// Read once on first use; later changes to the environment are ignored.
pub fn thread_hint() -> usize {
    *PROCESS_THREAD_HINT.get_or_init(|| {
        let value = env::var(THREADS_ENV).ok();
        let cpus = available_cpus();
        let hint = thread_hint_from(value.as_deref(), cpus);

        if let Some(raw) = value.as_deref() {
            if !matches!(raw.trim().parse::<usize>(), Ok(n) if (1..=MAX_THREADS).contains(&n)) {
                warn!("Ignoring {}={:?}, using {} threads", THREADS_ENV, raw, hint);
            }
        }
        debug!("AVIF thread hint: {} ({} CPUs)", hint, cpus);
        hint
    })
}

/// Configuration for the AVIF encoder
#[derive(Clone)]
pub struct AvifConfig {
    /// Worker threads the codec may use (default: process thread hint)
    pub max_threads: usize,

    /// Receives a copy of every encoded payload (default: None)
    ///
    /// Intended for debugging; failures inside the hook are logged and never
    /// affect the encode result.
    pub dump: Option<Arc<dyn PayloadDump>>,
}

impl Default for AvifConfig {
    fn default() -> Self {
        Self {
            max_threads: thread_hint(),
            dump: None,
        }
    }
}

impl fmt::Debug for AvifConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvifConfig")
            .field("max_threads", &self.max_threads)
            .field("dump", &self.dump.as_ref().map(|_| "PayloadDump"))
            .finish()
    }
}

impl AvifConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> AvifConfigBuilder {
        AvifConfigBuilder::default()
    }

    /// Configuration from the process environment
    ///
    /// Uses the process thread hint and enables a [`DirectoryDump`] when
    /// `LAMCO_AVIF_DUMP_DIR` is set to a non-empty path.
    #[must_use]
    pub fn from_env() -> Self {
        let mut builder = Self::builder();
        if let Some(dir) = env::var_os(DUMP_DIR_ENV).filter(|v| !v.is_empty()) {
            debug!("AVIF payload dump enabled: {:?}", dir);
            builder = builder.dump_dir(dir);
        }
        builder.build()
    }

    /// Validate configuration and return any issues
    ///
    /// Returns `Ok(())` if configuration is valid, or a list of issues.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();

        if self.max_threads == 0 {
            issues.push("max_threads must be at least 1".to_string());
        }

        if self.max_threads > MAX_THREADS {
            issues.push(format!("max_threads should not exceed {MAX_THREADS}"));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

/// Builder for [`AvifConfig`]
#[derive(Default)]
pub struct AvifConfigBuilder {
    max_threads: Option<usize>,
    dump: Option<Arc<dyn PayloadDump>>,
}

impl AvifConfigBuilder {
    /// Set worker thread count
    #[must_use]
    pub fn max_threads(mut self, threads: usize) -> Self {
        self.max_threads = Some(threads);
        self
    }

    /// Set the payload dump hook
    #[must_use]
    pub fn dump(mut self, dump: Arc<dyn PayloadDump>) -> Self {
        self.dump = Some(dump);
        self
    }

    /// Dump payloads into `dir`
    #[must_use]
    pub fn dump_dir(self, dir: impl Into<PathBuf>) -> Self {
        self.dump(Arc::new(DirectoryDump::new(dir)))
    }

    /// Build the configuration
    ///
    /// Returns an [`AvifConfig`] with builder values overriding defaults.
    #[must_use]
    pub fn build(self) -> AvifConfig {
        AvifConfig {
            max_threads: self.max_threads.unwrap_or_else(thread_hint),
            dump: self.dump,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thread_count() {
        assert_eq!(default_thread_count(0), 1);
        assert_eq!(default_thread_count(1), 1);
        assert_eq!(default_thread_count(2), 1);
        assert_eq!(default_thread_count(4), 2);
        assert_eq!(default_thread_count(6), 3);
        assert_eq!(default_thread_count(8), 4);
        assert_eq!(default_thread_count(64), 4);
    }

    #[test]
    fn test_thread_override() {
        assert_eq!(thread_hint_from(Some("2"), 16), 2);
        assert_eq!(thread_hint_from(Some(" 12 "), 2), 12);
        assert_eq!(thread_hint_from(None, 16), 4);
    }

    #[test]
    fn test_invalid_override_falls_back() {
        assert_eq!(thread_hint_from(Some("0"), 8), 4);
        assert_eq!(thread_hint_from(Some("-3"), 8), 4);
        assert_eq!(thread_hint_from(Some("many"), 2), 1);
        assert_eq!(thread_hint_from(Some(""), 6), 3);
        assert_eq!(thread_hint_from(Some("100000"), 8), 4);
        assert_eq!(thread_hint_from(Some("65"), 2), 1);
        assert_eq!(thread_hint_from(Some("64"), 2), 64);
    }

    #[test]
    fn test_process_hint_is_stable() {
        let first = thread_hint();
        assert!(first >= 1);
        assert_eq!(thread_hint(), first);
    }

    #[test]
    fn test_builder_pattern() {
        let config = AvifConfig::builder()
            .max_threads(3)
            .dump_dir("/tmp/avif-dump")
            .build();

        assert_eq!(config.max_threads, 3);
        assert!(config.dump.is_some());
        assert!(format!("{config:?}").contains("max_threads: 3"));
    }

    #[test]
    fn test_builder_defaults() {
        let config = AvifConfig::builder().build();
        assert_eq!(config.max_threads, thread_hint());
        assert!(config.dump.is_none());
    }

    #[test]
    fn test_config_validation() {
        let valid_config = AvifConfig::default();
        assert!(valid_config.validate().is_ok());

        let invalid_config = AvifConfig {
            max_threads: 0,
            ..Default::default()
        };
        assert!(invalid_config.validate().is_err());

        let issues = AvifConfig {
            max_threads: 65,
            dump: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(issues.len(), 1);
    }
}
