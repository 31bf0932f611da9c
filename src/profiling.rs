//! Draw-time metrics and the per-tick timing output.
//!
//! The engine reports one scalar per drawn tick: how long composing the
//! overlay took, in milliseconds. Anything that wants it implements
//! [`TimingSink`]; closures work directly.
//!
//! # Usage
//!
//! ```ignore
//! let mut history = Vec::new();
//! engine.render_frame(&mut canvas, &snapshot, &scene, &frames, now, &mut |ms| history.push(ms));
//! println!("avg {:.2} ms", engine.metrics().avg_ms());
//! ```

use std::time::Duration;

use crate::filter::FirstOrderFilter;

// =============================================================================
// Timing Sink
// =============================================================================

/// Receives the draw time of every drawn tick.
pub trait TimingSink {
    fn record(&mut self, draw_ms: f64);
}

impl<F: FnMut(f64)> TimingSink for F {
    fn record(&mut self, draw_ms: f64) {
        self(draw_ms);
    }
}

/// Sink that drops every sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TimingSink for NoopSink {
    fn record(&mut self, _draw_ms: f64) {}
}

// =============================================================================
// Render Metrics
// =============================================================================

/// Draw-time statistics since the engine was built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderMetrics {
    /// Draw time of the last drawn tick, in microseconds.
    pub last_us: u32,
    pub min_us: u32,
    pub max_us: u32,
    avg_us: f32,
    pub total_frames: u64,
    pub skipped_frames: u64,
}

impl RenderMetrics {
    /// Exponential moving average weight of the newest sample.
    const EMA_ALPHA: f32 = 0.1;

    pub const fn new() -> Self {
        Self { last_us: 0, min_us: u32::MAX, max_us: 0, avg_us: 0.0, total_frames: 0, skipped_frames: 0 }
    }

    pub fn record_draw(&mut self, draw_time: Duration) {
        let us = u32::try_from(draw_time.as_micros()).unwrap_or(u32::MAX);
        self.last_us = us;
        self.min_us = self.min_us.min(us);
        self.max_us = self.max_us.max(us);

        if self.total_frames == 0 {
            self.avg_us = us as f32;
        } else {
            self.avg_us = Self::EMA_ALPHA.mul_add(us as f32, (1.0 - Self::EMA_ALPHA) * self.avg_us);
        }
        self.total_frames += 1;
    }

    #[inline]
    pub const fn record_skip(&mut self) {
        self.skipped_frames += 1;
    }

    #[inline]
    pub const fn avg_us(&self) -> u32 {
        self.avg_us as u32
    }

    #[inline]
    pub fn avg_ms(&self) -> f32 {
        self.avg_us / 1000.0
    }
}

impl Default for RenderMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Frame Rate
// =============================================================================

/// Smoothed frame rate from the interval between drawn ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FpsMonitor {
    filter: FirstOrderFilter,
}

impl FpsMonitor {
    pub fn new(ui_frequency: f32, rc: f32) -> Self {
        Self { filter: FirstOrderFilter::new(ui_frequency, rc, 1.0 / ui_frequency) }
    }

    /// Feed the interval since the previous drawn tick; returns the filtered fps.
    pub fn update(&mut self, interval: Duration) -> f32 {
        let secs = interval.as_secs_f32();
        if secs <= 0.0 {
            return self.filter.value();
        }
        self.filter.update(1.0 / secs)
    }

    #[inline]
    pub const fn fps(&self) -> f32 {
        self.filter.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = RenderMetrics::new();
        assert_eq!(metrics.total_frames, 0);
        assert_eq!(metrics.min_us, u32::MAX, "Min starts at the ceiling");
        assert_eq!(metrics.max_us, 0);
    }

    #[test]
    fn test_min_max_avg() {
        let mut metrics = RenderMetrics::new();
        metrics.record_draw(Duration::from_micros(2000));
        assert_eq!(metrics.avg_us(), 2000, "First sample seeds the average");
        metrics.record_draw(Duration::from_micros(1000));
        metrics.record_draw(Duration::from_micros(4000));

        assert_eq!(metrics.min_us, 1000);
        assert_eq!(metrics.max_us, 4000);
        assert_eq!(metrics.last_us, 4000);
        assert_eq!(metrics.total_frames, 3);
        assert!(metrics.avg_us() > 1000 && metrics.avg_us() < 4000);
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |ms: f64| seen.push(ms);
            sink.record(1.5);
            sink.record(2.5);
        }
        assert_eq!(seen, vec![1.5, 2.5]);
    }

    #[test]
    fn test_fps_settles_toward_rate() {
        let mut fps = FpsMonitor::new(20.0, 3.0);
        assert_eq!(fps.fps(), 20.0);
        for _ in 0..2000 {
            fps.update(Duration::from_millis(100));
        }
        assert!((fps.fps() - 10.0).abs() < 0.1, "Filtered fps should settle near 10, got {}", fps.fps());
        assert_eq!(fps.update(Duration::ZERO), fps.fps(), "Zero interval is ignored");
    }
}
