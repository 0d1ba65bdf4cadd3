//! Runtime encoder selection
//!
//! The registry maps encoding names to adapters. Registering an adapter calls
//! its `init_module` hook; removing it (or dropping the registry) calls
//! `cleanup_module`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::encoder::ImageEncoder;
use crate::error::{CodecError, Result};
use crate::image::PixelSource;
use crate::options::EncodeOptions;
use crate::outcome::EncodeOutcome;

/// Encoders indexed by encoding name
///
/// Cheap to share: wrap in an `Arc` and call from any thread.
#[derive(Default)]
pub struct EncoderRegistry {
    encoders: RwLock<HashMap<&'static str, Arc<dyn ImageEncoder>>>,
}

impl EncoderRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under every encoding it advertises
    ///
    /// An encoding already claimed by another adapter is taken over by the
    /// new one.
    pub fn register(&self, encoder: Arc<dyn ImageEncoder>) {
        encoder.init_module();

        let mut encoders = self.encoders.write();
        for &encoding in encoder.get_encodings() {
            if encoders.insert(encoding, Arc::clone(&encoder)).is_some() {
                debug!("Replacing existing encoder for '{}'", encoding);
            }
        }

        info!(
            "Registered {} encoder {} for {:?}",
            encoder.get_type(),
            encoder.get_version(),
            encoder.get_encodings()
        );
    }

    /// Remove the adapter serving `encoding`
    ///
    /// All encodings served by the same adapter are removed with it.
    pub fn unregister(&self, encoding: &str) -> Option<Arc<dyn ImageEncoder>> {
        let mut encoders = self.encoders.write();
        let encoder = encoders.remove(encoding)?;
        encoders.retain(|_, other| !Arc::ptr_eq(other, &encoder));
        drop(encoders);

        encoder.cleanup_module();
        info!("Unregistered {} encoder", encoder.get_type());
        Some(encoder)
    }

    /// Adapter for an encoding name
    pub fn get(&self, encoding: &str) -> Option<Arc<dyn ImageEncoder>> {
        self.encoders.read().get(encoding).cloned()
    }

    /// Sorted list of registered encoding names
    pub fn encodings(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.encoders.read().keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Encode with the adapter registered for `encoding`
    pub fn encode(
        &self,
        encoding: &str,
        image: &dyn PixelSource,
        options: &EncodeOptions,
    ) -> Result<EncodeOutcome> {
        let encoder = self
            .get(encoding)
            .ok_or_else(|| CodecError::UnknownEncoding(encoding.to_string()))?;
        encoder.encode(encoding, image, options)
    }
}

impl Drop for EncoderRegistry {
    fn drop(&mut self) {
        let encoders = std::mem::take(self.encoders.get_mut());
        let mut seen: Vec<Arc<dyn ImageEncoder>> = Vec::new();

        for encoder in encoders.into_values() {
            if seen.iter().any(|other| Arc::ptr_eq(other, &encoder)) {
                continue;
            }
            encoder.cleanup_module();
            seen.push(encoder);
        }
    }
}
