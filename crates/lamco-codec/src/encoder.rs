//! Encoder adapter interface
//!
//! Each codec adapter implements [`ImageEncoder`] so the pipeline can select
//! it by encoding name at runtime.

use std::fmt;

use crate::error::Result;
use crate::image::PixelSource;
use crate::options::EncodeOptions;
use crate::outcome::EncodeOutcome;

/// Semantic version of an adapter's codec library
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a `major.minor.patch` string
    ///
    /// Trailing text after the patch number (`1.0.4-dev`) is ignored and
    /// missing components default to 0.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split('.');
        let major = leading_number(parts.next()?)?;
        let minor = parts.next().and_then(leading_number).unwrap_or(0);
        let patch = parts.next().and_then(leading_number).unwrap_or(0);
        Some(Self::new(major, minor, patch))
    }

    /// As a `(major, minor, patch)` tuple
    pub fn as_tuple(self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch)
    }
}

fn leading_number(part: &str) -> Option<u32> {
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part[..end].parse().ok()
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Capability summary reported by an adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderInfo {
    /// Codec library version
    pub version: Version,
    /// Encoding names the adapter produces
    pub encodings: Vec<&'static str>,
}

/// A pluggable still-image encoder
///
/// Implementations must be usable from several threads at once; each call to
/// [`encode`](ImageEncoder::encode) owns all native state it creates.
pub trait ImageEncoder: Send + Sync {
    /// Short codec name
    fn get_type(&self) -> &'static str;

    /// Encoding names this adapter can produce
    fn get_encodings(&self) -> &'static [&'static str];

    /// Version of the underlying codec library
    fn get_version(&self) -> Version;

    /// Version and encodings in one record
    fn get_info(&self) -> EncoderInfo {
        EncoderInfo {
            version: self.get_version(),
            encodings: self.get_encodings().to_vec(),
        }
    }

    /// Called once when the adapter is registered
    fn init_module(&self) {}

    /// Called once when the adapter is removed
    fn cleanup_module(&self) {}

    /// Compress one image
    ///
    /// `format_hint` is the encoding the caller asked for; adapters treat it
    /// as informational. `options` may contain keys the adapter ignores.
    fn encode(
        &self,
        format_hint: &str,
        image: &dyn PixelSource,
        options: &EncodeOptions,
    ) -> Result<EncodeOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        assert_eq!(Version::parse("1.0.4"), Some(Version::new(1, 0, 4)));
        assert_eq!(Version::parse("1.1.1-dev"), Some(Version::new(1, 1, 1)));
        assert_eq!(Version::parse("2"), Some(Version::new(2, 0, 0)));
        assert_eq!(Version::parse("v1"), None);
        assert_eq!(Version::parse(""), None);
    }

    #[test]
    fn test_version_display_and_order() {
        let v = Version::new(1, 0, 4);
        assert_eq!(v.to_string(), "1.0.4");
        assert_eq!(v.as_tuple(), (1, 0, 4));
        assert!(Version::new(1, 1, 0) > v);
    }
}
