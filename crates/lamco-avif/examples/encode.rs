//! AVIF Encode Example
//!
//! Runs the built-in self-test, then encodes a synthetic frame in each
//! supported 32-bit format and optionally writes the results to disk.
//!
//! # Running
//!
//! ```bash
//! cargo run --example encode
//! cargo run --example encode -- /tmp/avif-out
//! LAMCO_AVIF_THREADS=2 cargo run --example encode
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use lamco_avif::{selftest, AvifBackend, AvifConfig, AvifEncoder, DirectoryDump};
use lamco_codec::{EncodeOptions, PixelFormat};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("lamco-avif Encode Example");
    println!("=========================");

    let mut builder = AvifConfig::builder();
    if let Some(dir) = std::env::args().nth(1).map(PathBuf::from) {
        println!("Writing payloads to {}", dir.display());
        builder = builder.dump(Arc::new(DirectoryDump::new(dir)));
    }
    let config = builder.build();

    println!("Configuration:");
    println!("  Threads: {}", config.max_threads);
    println!("  Dump: {}", config.dump.is_some());

    let encoder = AvifEncoder::new(config);
    println!("Backend: {} {}", encoder.backend().name(), lamco_avif::get_version());

    let checked = selftest::run(&encoder)?;
    println!("\nSelf-test passed ({checked} payloads)");

    println!("\nEncoding 320x200 frames:");
    for format in [
        PixelFormat::BGRX,
        PixelFormat::BGRA,
        PixelFormat::RGBX,
        PixelFormat::RGBA,
    ] {
        let frame = selftest::synthetic_image(format, 320, 200)?;
        let outcome = encoder.encode("avif", &frame, &EncodeOptions::new())?;
        println!(
            "  {format}: {} bytes, alpha={}, {:.1}% of raw",
            outcome.len(),
            outcome.client_options.alpha,
            outcome.compression_ratio() * 100.0
        );
    }

    // Packed 24-bit rows cannot be read as 4-byte samples
    let packed = selftest::synthetic_image(PixelFormat::BGR, 320, 200)?;
    match encoder.encode("avif", &packed, &EncodeOptions::new()) {
        Ok(_) => println!("  BGR: unexpectedly accepted"),
        Err(e) => println!("  BGR: rejected ({e})"),
    }

    Ok(())
}
