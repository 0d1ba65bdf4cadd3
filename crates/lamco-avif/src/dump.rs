//! Payload dump hook
//!
//! A debugging aid: every successful encode can be handed to a
//! [`PayloadDump`] after the result is built. The hook runs outside the
//! encode pipeline and cannot fail the call.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lamco_codec::EncodeOutcome;
use parking_lot::Mutex;
use tracing::{trace, warn};

/// Receives encoded payloads for inspection
pub trait PayloadDump: Send + Sync {
    /// Called once per successful encode
    fn dump(&self, outcome: &EncodeOutcome);
}

/// Writes each payload to `<dir>/<codec>-<seq>-<width>x<height>.avif`
///
/// The directory is created on first write. Sequence numbers start at 0 and
/// are shared by all encoders holding this dump.
#[derive(Debug)]
pub struct DirectoryDump {
    dir: PathBuf,
    next_seq: Mutex<u64>,
}

impl DirectoryDump {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next_seq: Mutex::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file for sequence number `seq`
    pub fn path_for(&self, seq: u64, outcome: &EncodeOutcome) -> PathBuf {
        self.dir.join(format!(
            "{}-{:06}-{}x{}.avif",
            outcome.codec, seq, outcome.width, outcome.height
        ))
    }

    /// Write one payload and return the file it went to
    pub fn write(&self, outcome: &EncodeOutcome) -> io::Result<PathBuf> {
        let seq = {
            let mut next = self.next_seq.lock();
            let seq = *next;
            *next += 1;
            seq
        };

        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(seq, outcome);
        fs::write(&path, &outcome.payload)?;
        Ok(path)
    }
}

impl PayloadDump for DirectoryDump {
    fn dump(&self, outcome: &EncodeOutcome) {
        match self.write(outcome) {
            Ok(path) => trace!("Dumped {} byte payload to {}", outcome.len(), path.display()),
            Err(e) => warn!("Failed to dump payload into {}: {}", self.dir.display(), e),
        }
    }
}
