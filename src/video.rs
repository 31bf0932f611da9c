//! Video frame boundary and frame-starvation gate.
//!
//! The overlay never touches pixel data. It only asks the video layer whether
//! a decoded frame is ready, which frame it is, and how the calibration maps
//! road space onto the screen. The lock around that handle is held just long
//! enough to copy those values out.
//!
//! # Starvation
//!
//! When no frame is ready the gate skips up to [`FRAME_SKIP_LIMIT`] draws in
//! a row, then lets the overlay redraw stale state. Any ready frame refills
//! the budget.

use std::sync::Mutex;

use tracing::debug;

use crate::{canvas::PointF, config::FRAME_SKIP_LIMIT};

/// Screen transform for projected road geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    pub zoom: f32,
    pub offset: PointF,
}

impl Calibration {
    pub const IDENTITY: Self = Self { zoom: 1.0, offset: PointF::new(0.0, 0.0) };

    /// Map a point in calibrated camera space to screen space.
    #[inline]
    pub fn project(&self, p: PointF) -> PointF {
        PointF::new(p.x * self.zoom + self.offset.x, p.y * self.zoom + self.offset.y)
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// What the overlay needs to know about the newest decoded frame.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInfo {
    pub id: u64,
    pub calibration: Calibration,
}

/// Anything that can report the newest decoded frame.
pub trait VideoFrameSource {
    fn latest_frame(&self) -> Option<FrameInfo>;
}

impl VideoFrameSource for Option<FrameInfo> {
    fn latest_frame(&self) -> Option<FrameInfo> {
        *self
    }
}

/// Frame handle shared between a decoder thread and the render tick.
#[derive(Debug, Default)]
pub struct SharedFrameSlot {
    inner: Mutex<Option<FrameInfo>>,
}

impl SharedFrameSlot {
    pub const fn new() -> Self {
        Self { inner: Mutex::new(None) }
    }

    /// Publish a newly decoded frame.
    pub fn publish(&self, frame: FrameInfo) {
        let mut guard = match self.inner.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        *guard = Some(frame);
    }

    /// Drop the current frame, e.g. on a camera switch.
    pub fn clear(&self) {
        let mut guard = match self.inner.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        *guard = None;
    }
}

impl VideoFrameSource for SharedFrameSlot {
    fn latest_frame(&self) -> Option<FrameInfo> {
        match self.inner.lock() {
            Ok(g) => *g,
            Err(e) => *e.into_inner(),
        }
    }
}

/// Bounded skip-and-retry while frames are missing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameGate {
    skips_left: u8,
    last_frame_id: Option<u64>,
}

impl FrameGate {
    pub const fn new() -> Self {
        Self { skips_left: FRAME_SKIP_LIMIT, last_frame_id: None }
    }

    /// True when this tick should draw.
    pub fn admit(&mut self, frame: Option<FrameInfo>) -> bool {
        match frame {
            Some(info) => {
                self.skips_left = FRAME_SKIP_LIMIT;
                self.last_frame_id = Some(info.id);
                true
            }
            None if self.skips_left > 0 => {
                self.skips_left -= 1;
                debug!(skips_left = self.skips_left, "skipping draw, no frame ready");
                false
            }
            None => true,
        }
    }

    #[inline]
    pub const fn skips_left(&self) -> u8 {
        self.skips_left
    }

    /// Id of the last frame that was ready.
    #[inline]
    pub const fn last_frame_id(&self) -> Option<u64> {
        self.last_frame_id
    }
}

impl Default for FrameGate {
    fn default() -> Self {
        Self::new()
    }
}
