//! Tick orchestration.
//!
//! [`HudEngine`] owns everything that outlives a tick: derived state, the
//! timers, the lead label box, the turn-signal animator, the frame gate and
//! the metrics. [`HudEngine::render_frame`] is the single per-frame entry
//! point.
//!
//! # Tick Order
//!
//! 1. Frame gate: skip the tick if no video frame is ready and the skip
//!    budget is not spent.
//! 2. Derive state from the snapshot.
//! 3. Advance the timers and the signal animator.
//! 4. Draw, back to front: lanes and leads, driver monitor, header, MAX box,
//!    curve advisory, speed-limit sign, current speed, status bar, insights
//!    bar, turn signal.
//! 5. Report the draw time and update the frame-rate filter.
//!
//! A tick never fails; missing data degrades to placeholders.

use std::time::{Duration, Instant};

use embedded_graphics::geometry::Size;
use tracing::{debug, trace, warn};

use crate::{
    canvas::{Canvas, SizeF},
    config::{FPS_FILTER_RC, HudSettings, SLOW_FPS},
    error::ConfigError,
    profiling::{FpsMonitor, RenderMetrics, TimingSink},
    state::DerivedHudState,
    telemetry::{SceneGeometry, TelemetrySnapshot},
    timers::TimerState,
    video::{FrameGate, VideoFrameSource},
    widgets::{
        HudFrame,
        current_speed::draw_current_speed,
        curve_speed::draw_curve_speed,
        driver_state::draw_driver_state,
        lanes::draw_lanes,
        lead::{LeadLabelTracker, draw_leads},
        lead_info::{draw_lead_info, rounded_acceleration, tracks_peak},
        set_speed::{draw_header, draw_set_speed},
        speed_limit::draw_speed_limit,
        status_bar::{draw_status_bar, resolve_status, road_name},
        turn_signals::{SignalLayout, TurnSignalAnimator, draw_turn_signal, should_animate},
    },
};

/// Overlay engine for one display.
#[derive(Debug)]
pub struct HudEngine {
    settings: HudSettings,
    size: SizeF,
    state: DerivedHudState,
    timers: TimerState,
    labels: LeadLabelTracker,
    signals: TurnSignalAnimator,
    gate: FrameGate,
    fps: FpsMonitor,
    last_draw: Option<Instant>,
    metrics: RenderMetrics,
}

impl HudEngine {
    /// Build an engine for a display of `display` pixels.
    pub fn new(settings: HudSettings, display: Size) -> Result<Self, ConfigError> {
        settings.validate()?;
        if display.width == 0 || display.height == 0 {
            return Err(ConfigError::EmptyDisplay { width: display.width, height: display.height });
        }
        let fps = FpsMonitor::new(settings.ui_frequency, FPS_FILTER_RC);
        Ok(Self {
            settings,
            size: SizeF::new(display.width as f32, display.height as f32),
            state: DerivedHudState::new(),
            timers: TimerState::default(),
            labels: LeadLabelTracker::new(),
            signals: TurnSignalAnimator::new(),
            gate: FrameGate::new(),
            fps,
            last_draw: None,
            metrics: RenderMetrics::new(),
        })
    }

    #[inline]
    pub const fn settings(&self) -> &HudSettings {
        &self.settings
    }

    /// Swap in new user settings. Derived state and timers carry over; the
    /// turn-signal animation restarts at frame 0 when the theme changes.
    pub fn set_settings(&mut self, settings: HudSettings) -> Result<(), ConfigError> {
        settings.validate()?;
        if settings.turn_signal_theme != self.settings.turn_signal_theme {
            debug!("turn signal theme changed");
            self.signals = TurnSignalAnimator::new();
        }
        self.settings = settings;
        Ok(())
    }

    #[inline]
    pub const fn size(&self) -> SizeF {
        self.size
    }

    #[inline]
    pub const fn state(&self) -> &DerivedHudState {
        &self.state
    }

    #[inline]
    pub const fn timers(&self) -> &TimerState {
        &self.timers
    }

    #[inline]
    pub const fn labels(&self) -> &LeadLabelTracker {
        &self.labels
    }

    #[inline]
    pub const fn metrics(&self) -> &RenderMetrics {
        &self.metrics
    }

    #[inline]
    pub const fn signal_frame(&self) -> usize {
        self.signals.frame()
    }

    /// Smoothed frame rate of drawn ticks.
    #[inline]
    pub const fn fps(&self) -> f32 {
        self.fps.fps()
    }

    /// Run one tick. Returns whether anything was drawn.
    pub fn render_frame(
        &mut self,
        canvas: &mut impl Canvas,
        snapshot: &TelemetrySnapshot,
        scene: &SceneGeometry,
        frames: &impl VideoFrameSource,
        now: Instant,
        sink: &mut impl TimingSink,
    ) -> bool {
        if !self.gate.admit(frames.latest_frame()) {
            self.metrics.record_skip();
            return false;
        }
        let draw_start = Instant::now();

        self.state.update(snapshot, &self.settings);
        let animate_signal = self.advance_timers(snapshot, now);
        self.compose(canvas, snapshot, scene, now, animate_signal);

        let draw_time = draw_start.elapsed();
        self.metrics.record_draw(draw_time);
        let draw_ms = draw_time.as_secs_f64() * 1000.0;
        trace!(draw_ms, frame_id = ?self.gate.last_frame_id(), "overlay drawn");
        sink.record(draw_ms);

        self.track_fps(now);
        true
    }

    /// Step every timed transition. Returns whether the turn signal plays.
    fn advance_timers(&mut self, snapshot: &TelemetrySnapshot, now: Instant) -> bool {
        let state = &self.state;
        let settings = &self.settings;
        let timers = &mut self.timers;

        timers.pending_limit.update(state.speed_limit_changed, now);
        timers.standstill.update(state.standstill_timer_running, now);

        if state.status_bar_visible {
            let status = resolve_status(snapshot, state, settings);
            let road = road_name(snapshot, settings);
            timers.status_crossfade.update(&status, road.is_some(), now);
        }

        if settings.lead_metrics && !state.big_map_open {
            timers.peak_acceleration.update(
                rounded_acceleration(snapshot.acceleration),
                tracks_peak(snapshot.status),
                now,
            );
        }

        let Some(theme) = settings.turn_signal_theme.as_ref() else {
            return false;
        };
        let animate = should_animate(
            theme,
            snapshot.turn_signal_active(),
            state.big_map_open,
            state.map_open,
            !timers.standstill.duration().is_zero(),
        );
        self.signals.update(theme, animate, now);
        animate
    }

    fn compose(
        &mut self,
        canvas: &mut impl Canvas,
        snapshot: &TelemetrySnapshot,
        scene: &SceneGeometry,
        now: Instant,
        animate_signal: bool,
    ) {
        let frame = HudFrame {
            snapshot,
            scene,
            settings: &self.settings,
            state: &self.state,
            timers: &self.timers,
            now,
        };
        canvas.set_opacity(1.0);

        if scene.world_objects_visible {
            draw_lanes(canvas, &frame);
            if snapshot.longitudinal_control && snapshot.radar_fresh && !self.settings.hide_lead_marker {
                draw_leads(canvas, &frame, &mut self.labels);
            }
        }

        draw_driver_state(canvas, &frame);

        draw_header(canvas);
        let set_speed_rect = draw_set_speed(canvas, &frame);
        draw_curve_speed(canvas, &frame, set_speed_rect);
        draw_speed_limit(canvas, &frame, set_speed_rect);
        draw_current_speed(canvas, &frame);

        draw_status_bar(canvas, &frame);
        draw_lead_info(canvas, &frame);

        if animate_signal && let Some(theme) = self.settings.turn_signal_theme.as_ref() {
            let car = &snapshot.car;
            let left = car.left_blinker;
            let layout = SignalLayout {
                screen: canvas.size(),
                frame: self.signals.frame(),
                left,
                blindspot: if left { car.left_blindspot } else { car.right_blindspot },
                alert_height: snapshot.controls.alert_height,
                status_bar_height: self.state.status_bar_height(),
            };
            draw_turn_signal(canvas, theme, &layout);
        }
    }

    fn track_fps(&mut self, now: Instant) {
        if let Some(prev) = self.last_draw {
            let interval = now.saturating_duration_since(prev);
            if interval > Duration::ZERO {
                let fps = self.fps.update(interval);
                if fps < SLOW_FPS {
                    warn!(fps, "slow frame rate");
                }
            }
        }
        self.last_draw = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        canvas::{RecordingCanvas, Sprite},
        profiling::NoopSink,
        telemetry::CarState,
        video::FrameInfo,
        widgets::turn_signals::SignalTheme,
    };

    const DISPLAY: Size = Size::new(2160, 1080);

    fn ready() -> Option<FrameInfo> {
        Some(FrameInfo::default())
    }

    #[test]
    fn test_rejects_empty_display() {
        let err = HudEngine::new(HudSettings::default(), Size::new(0, 1080)).unwrap_err();
        assert_eq!(err, ConfigError::EmptyDisplay { width: 0, height: 1080 });
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let settings = HudSettings { ui_frequency: -1.0, ..HudSettings::default() };
        assert!(HudEngine::new(settings, DISPLAY).is_err());
    }

    #[test]
    fn test_starved_ticks_skip_then_draw() {
        let mut engine = HudEngine::new(HudSettings::default(), DISPLAY).unwrap();
        let mut canvas = RecordingCanvas::new(2160.0, 1080.0);
        let snapshot = TelemetrySnapshot::default();
        let scene = SceneGeometry::default();
        let now = Instant::now();
        let none: Option<FrameInfo> = None;

        for _ in 0..5 {
            assert!(!engine.render_frame(&mut canvas, &snapshot, &scene, &none, now, &mut NoopSink));
        }
        assert!(canvas.commands().is_empty(), "Skipped ticks draw nothing");
        assert!(engine.render_frame(&mut canvas, &snapshot, &scene, &none, now, &mut NoopSink));
        assert!(!canvas.commands().is_empty(), "Stale state is redrawn once the budget is spent");
        assert_eq!(engine.metrics().skipped_frames, 5);
    }

    #[test]
    fn test_timing_reported_per_drawn_tick() {
        let mut engine = HudEngine::new(HudSettings::default(), DISPLAY).unwrap();
        let mut canvas = RecordingCanvas::new(2160.0, 1080.0);
        let snapshot = TelemetrySnapshot::default();
        let scene = SceneGeometry::default();
        let t0 = Instant::now();
        let mut samples = Vec::new();

        for i in 0..3 {
            let now = t0 + Duration::from_millis(50 * i);
            engine.render_frame(&mut canvas, &snapshot, &scene, &ready(), now, &mut |ms: f64| samples.push(ms));
        }
        assert_eq!(samples.len(), 3);
        assert!(samples.iter().all(|ms| *ms >= 0.0));
        assert_eq!(engine.metrics().total_frames, 3);
        assert!((engine.fps() - 20.0).abs() < 0.01, "Steady 20 Hz keeps the filter at 20");
    }

    #[test]
    fn test_opacity_restored_after_tick() {
        let settings = HudSettings {
            road_name_ui: true,
            lead_metrics: true,
            ..HudSettings::default()
        };
        let mut engine = HudEngine::new(settings, DISPLAY).unwrap();
        let mut canvas = RecordingCanvas::new(2160.0, 1080.0);
        let snapshot = TelemetrySnapshot { controls_alive: true, ..TelemetrySnapshot::default() };
        engine.render_frame(&mut canvas, &snapshot, &SceneGeometry::default(), &ready(), Instant::now(), &mut NoopSink);
        assert_eq!(canvas.opacity(), 1.0);
    }

    fn theme(descriptor: &str, frames: usize) -> SignalTheme {
        SignalTheme::from_descriptor(descriptor, frames, SizeF::new(360.0, 480.0), false, true).unwrap()
    }

    fn signalling() -> TelemetrySnapshot {
        TelemetrySnapshot {
            controls_alive: true,
            car: CarState { left_blinker: true, ..CarState::default() },
            ..TelemetrySnapshot::default()
        }
    }

    fn signal_frames(canvas: &RecordingCanvas) -> Vec<usize> {
        canvas
            .sprites()
            .filter_map(|(sprite, _)| match sprite {
                Sprite::TurnSignal { frame, .. } => Some(frame),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_theme_swap_restarts_signal_animation() {
        let settings = HudSettings { turn_signal_theme: Some(theme("traditional_100", 8)), ..HudSettings::default() };
        let mut engine = HudEngine::new(settings.clone(), DISPLAY).unwrap();
        let mut canvas = RecordingCanvas::new(2160.0, 1080.0);
        let snapshot = signalling();
        let scene = SceneGeometry::default();
        let t0 = Instant::now();

        engine.render_frame(&mut canvas, &snapshot, &scene, &ready(), t0, &mut NoopSink);
        engine.render_frame(&mut canvas, &snapshot, &scene, &ready(), t0 + Duration::from_millis(650), &mut NoopSink);
        assert_eq!(engine.signal_frame(), 6);

        let smaller = HudSettings { turn_signal_theme: Some(theme("traditional_100", 4)), ..settings };
        engine.set_settings(smaller).unwrap();
        assert_eq!(engine.signal_frame(), 0, "A new theme starts from its first frame");

        canvas.clear();
        engine.render_frame(&mut canvas, &snapshot, &scene, &ready(), t0 + Duration::from_millis(700), &mut NoopSink);
        let frames = signal_frames(&canvas);
        assert!(!frames.is_empty(), "Signal still drawn after the swap");
        assert!(frames.iter().all(|f| *f < 4), "Frame index within the new theme, got {frames:?}");
    }

    #[test]
    fn test_unchanged_theme_keeps_signal_frame() {
        let settings = HudSettings { turn_signal_theme: Some(theme("traditional_100", 8)), ..HudSettings::default() };
        let mut engine = HudEngine::new(settings.clone(), DISPLAY).unwrap();
        let mut canvas = RecordingCanvas::new(2160.0, 1080.0);
        let t0 = Instant::now();
        let (snapshot, scene) = (signalling(), SceneGeometry::default());

        engine.render_frame(&mut canvas, &snapshot, &scene, &ready(), t0, &mut NoopSink);
        engine.render_frame(&mut canvas, &snapshot, &scene, &ready(), t0 + Duration::from_millis(350), &mut NoopSink);
        engine.set_settings(HudSettings { lead_metrics: true, ..settings }).unwrap();
        assert_eq!(engine.signal_frame(), 3);
    }

    #[test]
    fn test_static_signal_hidden_as_soon_as_standstill_timer_runs() {
        let settings = HudSettings {
            show_standstill_timer: true,
            turn_signal_theme: Some(theme("static_100", 4)),
            ..HudSettings::default()
        };
        let mut engine = HudEngine::new(settings, DISPLAY).unwrap();
        let mut canvas = RecordingCanvas::new(2160.0, 1080.0);
        let scene = SceneGeometry::default();
        let mut snapshot = signalling();
        snapshot.car.standstill = true;
        snapshot.started_frames = 400;
        let t0 = Instant::now();

        engine.render_frame(&mut canvas, &snapshot, &scene, &ready(), t0, &mut NoopSink);
        assert!(!signal_frames(&canvas).is_empty(), "Timer has not counted anything yet");

        canvas.clear();
        engine.render_frame(&mut canvas, &snapshot, &scene, &ready(), t0 + Duration::from_millis(300), &mut NoopSink);
        assert!(signal_frames(&canvas).is_empty(), "Static signal steps aside within the first second");
    }
}
