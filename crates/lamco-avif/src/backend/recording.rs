//! Recording test double
//!
//! Logs every native call in order and can be told to fail at any stage, so
//! tests can check exactly which objects were created and released.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use lamco_codec::Version;
use parking_lot::Mutex;

use super::{AddImageFlags, AvifBackend, EncoderSettings, ImageParams, ResultCode};
use crate::negotiate::RgbView;

/// Stage at which the double reports failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailPoint {
    ImageAllocation,
    Conversion,
    EncoderAllocation,
    AddImage,
    Finish,
}

/// One native call
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    CreateImage { id: u32, params: ImageParams },
    DestroyImage(u32),
    RgbToYuv { image: u32, ignore_alpha: bool },
    CreateEncoder(u32),
    ConfigureEncoder(EncoderSettings),
    DestroyEncoder(u32),
    AddImage { encoder: u32, image: u32, duration: u64, flags: AddImageFlags },
    CreateOutput(u32),
    Finish { encoder: u32, output: u32 },
    FreeOutput(u32),
}

#[derive(Debug)]
pub(crate) struct FakeImage {
    id: u32,
    width: u32,
    height: u32,
    checksum: u64,
}

#[derive(Debug)]
pub(crate) struct FakeEncoder {
    id: u32,
    frames: Vec<(u32, u32, u64)>,
}

#[derive(Debug)]
pub(crate) struct FakeOutput {
    id: u32,
    data: Vec<u8>,
}

pub(crate) struct RecordingBackend {
    fail_at: Option<FailPoint>,
    fail_code: ResultCode,
    empty_output: bool,
    messages: HashMap<ResultCode, String>,
    events: Mutex<Vec<Event>>,
    next_id: AtomicU32,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self {
            fail_at: None,
            fail_code: ResultCode::UNKNOWN_ERROR,
            empty_output: false,
            messages: HashMap::new(),
            events: Mutex::new(Vec::new()),
            next_id: AtomicU32::new(1),
        }
    }

    pub(crate) fn failing_at(point: FailPoint, code: ResultCode) -> Self {
        Self {
            fail_at: Some(point),
            fail_code: code,
            ..Self::new()
        }
    }

    pub(crate) fn with_message(mut self, code: ResultCode, message: &str) -> Self {
        self.messages.insert(code, message.to_string());
        self
    }

    pub(crate) fn with_empty_output(mut self) -> Self {
        self.empty_output = true;
        self
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    pub(crate) fn images_created(&self) -> usize {
        self.count(|e| matches!(e, Event::CreateImage { .. }))
    }

    pub(crate) fn images_destroyed(&self) -> usize {
        self.count(|e| matches!(e, Event::DestroyImage(_)))
    }

    pub(crate) fn encoders_created(&self) -> usize {
        self.count(|e| matches!(e, Event::CreateEncoder(_)))
    }

    pub(crate) fn encoders_destroyed(&self) -> usize {
        self.count(|e| matches!(e, Event::DestroyEncoder(_)))
    }

    pub(crate) fn outputs_created(&self) -> usize {
        self.count(|e| matches!(e, Event::CreateOutput(_)))
    }

    pub(crate) fn outputs_freed(&self) -> usize {
        self.count(|e| matches!(e, Event::FreeOutput(_)))
    }

    /// Objects created but not yet released
    pub(crate) fn live_objects(&self) -> usize {
        (self.images_created() + self.encoders_created() + self.outputs_created())
            - (self.images_destroyed() + self.encoders_destroyed() + self.outputs_freed())
    }

    /// Release events in the order they happened
    pub(crate) fn release_order(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::DestroyImage(_) => Some("image"),
                Event::DestroyEncoder(_) => Some("encoder"),
                Event::FreeOutput(_) => Some("output"),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Event) {
        self.events.lock().push(event);
    }

    fn next_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn fails_at(&self, point: FailPoint) -> bool {
        self.fail_at == Some(point)
    }
}

impl AvifBackend for RecordingBackend {
    type Image = FakeImage;
    type Encoder = FakeEncoder;
    type Output = FakeOutput;

    fn name(&self) -> &'static str {
        "recording"
    }

    fn version(&self) -> Version {
        Version::new(1, 0, 4)
    }

    fn create_image(&self, params: &ImageParams) -> Option<FakeImage> {
        if self.fails_at(FailPoint::ImageAllocation) {
            return None;
        }
        let id = self.next_id();
        self.record(Event::CreateImage {
            id,
            params: *params,
        });
        Some(FakeImage {
            id,
            width: params.width,
            height: params.height,
            checksum: 0,
        })
    }

    fn destroy_image(&self, image: FakeImage) {
        self.record(Event::DestroyImage(image.id));
    }

    fn rgb_to_yuv(&self, image: &mut FakeImage, rgb: &RgbView<'_>) -> ResultCode {
        self.record(Event::RgbToYuv {
            image: image.id,
            ignore_alpha: rgb.descriptor.ignore_alpha,
        });
        if self.fails_at(FailPoint::Conversion) {
            return self.fail_code;
        }

        let mut checksum = 0u64;
        for y in 0..image.height {
            let Some(row) = rgb.row(y) else {
                return ResultCode::REFORMAT_FAILED;
            };
            checksum = row
                .iter()
                .fold(checksum, |acc, &b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
        }
        image.checksum = checksum;
        ResultCode::OK
    }

    fn create_encoder(&self) -> Option<FakeEncoder> {
        if self.fails_at(FailPoint::EncoderAllocation) {
            return None;
        }
        let id = self.next_id();
        self.record(Event::CreateEncoder(id));
        Some(FakeEncoder {
            id,
            frames: Vec::new(),
        })
    }

    fn configure_encoder(&self, _encoder: &mut FakeEncoder, settings: &EncoderSettings) {
        self.record(Event::ConfigureEncoder(*settings));
    }

    fn destroy_encoder(&self, encoder: FakeEncoder) {
        self.record(Event::DestroyEncoder(encoder.id));
    }

    fn add_image(
        &self,
        encoder: &mut FakeEncoder,
        image: &FakeImage,
        duration: u64,
        flags: AddImageFlags,
    ) -> ResultCode {
        self.record(Event::AddImage {
            encoder: encoder.id,
            image: image.id,
            duration,
            flags,
        });
        if self.fails_at(FailPoint::AddImage) {
            return self.fail_code;
        }
        encoder
            .frames
            .push((image.width, image.height, image.checksum));
        ResultCode::OK
    }

    fn create_output(&self) -> FakeOutput {
        let id = self.next_id();
        self.record(Event::CreateOutput(id));
        FakeOutput {
            id,
            data: Vec::new(),
        }
    }

    fn finish(&self, encoder: &mut FakeEncoder, output: &mut FakeOutput) -> ResultCode {
        self.record(Event::Finish {
            encoder: encoder.id,
            output: output.id,
        });
        if self.fails_at(FailPoint::Finish) {
            // libavif may leave partial data behind on failure
            output.data.extend_from_slice(b"partial");
            return self.fail_code;
        }
        if self.empty_output {
            return ResultCode::OK;
        }

        output.data.extend_from_slice(b"\0\0\0\x14ftypavif");
        for (width, height, checksum) in &encoder.frames {
            output.data.extend_from_slice(&width.to_be_bytes());
            output.data.extend_from_slice(&height.to_be_bytes());
            output.data.extend_from_slice(&checksum.to_be_bytes());
        }
        ResultCode::OK
    }

    fn output_bytes<'o>(&self, output: &'o FakeOutput) -> &'o [u8] {
        &output.data
    }

    fn free_output(&self, output: FakeOutput) {
        self.record(Event::FreeOutput(output.id));
    }

    fn result_to_string(&self, code: ResultCode) -> Option<String> {
        self.messages.get(&code).cloned()
    }
}
