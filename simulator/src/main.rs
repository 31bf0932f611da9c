//! Headless simulator for the HUD overlay.
//!
//! Drives [`HudEngine`] at the configured UI frequency with synthetic
//! telemetry: a cruise cycle with a stop, a lead that closes in and backs
//! off, a speed-limit change that waits for confirmation, and a scripted lane
//! change with a blind-spot warning. Frames are drawn into an off-screen
//! `SimulatorDisplay` on simulated time, so the run is as fast as the
//! renderer.
//!
//! # Usage
//!
//! ```text
//! hud-sim [SECONDS]
//! ```
//!
//! Runs for `SECONDS` of simulated time (default 60). Log output follows
//! `RUST_LOG` (default `hud_overlay=info,hud_sim=info`).

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

use std::{
    env,
    time::{Duration, Instant},
};

use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use embedded_graphics_simulator::SimulatorDisplay;
use hud_overlay::{
    DisplayCanvas, HudEngine, HudSettings, SceneGeometry, SharedFrameSlot, TelemetrySnapshot,
    canvas::{PointF, SizeF},
    telemetry::{CarState, ControlsState, LeadData, LeadSet, Polygon, SpeedLimitState, Status},
    video::{Calibration, FrameInfo},
    widgets::turn_signals::SignalTheme,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SCREEN_WIDTH: u32 = 2160;
const SCREEN_HEIGHT: u32 = 1080;

/// Simulated run length when no argument is given.
const DEFAULT_RUN_SECS: f32 = 60.0;

/// Distance to the horizon in road units.
const HORIZON: f32 = 100.0;

/// Half the lane width in road units.
const HALF_LANE: f32 = 1.8;

/// Driver inputs at simulated time `t`.
#[derive(Clone, Copy, Debug, Default)]
struct DriverInputs {
    engaged: bool,
    left_blinker: bool,
    blindspot: bool,
    limit_confirmed: bool,
}

impl DriverInputs {
    /// Lane change left from 20 s to 26 s with a car alongside for the middle
    /// two seconds. Each new limit (every 20 s) is confirmed after 4 s.
    fn at(t: f32) -> Self {
        let lane_change = (20.0..26.0).contains(&(t % 60.0));
        Self {
            engaged: t % 60.0 < 50.0,
            left_blinker: lane_change,
            blindspot: lane_change && (22.0..24.0).contains(&(t % 60.0)),
            limit_confirmed: t < 20.0 || t % 20.0 >= 4.0,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hud_overlay=info,hud_sim=info")),
        )
        .init();

    let run_secs = match env::args().nth(1).map(|arg| arg.parse::<f32>()) {
        None => DEFAULT_RUN_SECS,
        Some(Ok(secs)) if secs > 0.0 => secs,
        Some(_) => {
            warn!("run length must be a positive number of seconds");
            return;
        }
    };

    let mut settings = HudSettings {
        lead_metrics: true,
        road_name_ui: true,
        show_conditional_status_bar: true,
        show_standstill_timer: true,
        speed_limit_controller: true,
        adjacent_path: true,
        blind_spot_path: true,
        ..HudSettings::default()
    };
    match SignalTheme::from_descriptor("traditional_100", 4, SizeF::new(360.0, 480.0), false, true) {
        Ok(theme) => settings.turn_signal_theme = Some(theme),
        Err(e) => warn!(error = %e, "turn signal theme rejected"),
    }
    let frame_time = Duration::from_secs_f32(1.0 / settings.ui_frequency);

    let size = Size::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    let mut engine = match HudEngine::new(settings, size) {
        Ok(engine) => engine,
        Err(e) => {
            warn!(error = %e, "cannot build overlay engine");
            return;
        }
    };
    let mut display: SimulatorDisplay<Rgb565> = SimulatorDisplay::new(size);

    let calibration = Calibration {
        zoom: 1.0,
        offset: PointF::new(SCREEN_WIDTH as f32 / 2.0, SCREEN_HEIGHT as f32 * 0.45),
    };
    let frames = SharedFrameSlot::new();

    let clock = Instant::now();
    let mut sim_time = Duration::ZERO;
    let mut frame_id = 0u64;
    let mut next_report = Duration::from_secs(5);
    let mut slowest_ms = 0.0f64;

    info!(width = SCREEN_WIDTH, height = SCREEN_HEIGHT, run_secs, "simulator started");

    while sim_time.as_secs_f32() < run_secs {
        let t = sim_time.as_secs_f32();

        // The decoder publishes a frame every tick except for a short dropout
        // every ten seconds.
        if t % 10.0 < 9.7 {
            frame_id += 1;
            frames.publish(FrameInfo { id: frame_id, calibration });
        } else {
            frames.clear();
        }

        let inputs = DriverInputs::at(t);
        let snapshot = synthetic_snapshot(t, inputs);
        let scene = synthetic_scene(t, &calibration);

        display.clear(Rgb565::BLACK).ok();
        let mut canvas = DisplayCanvas::new(&mut display);
        engine.render_frame(&mut canvas, &snapshot, &scene, &frames, clock + sim_time, &mut |ms: f64| {
            slowest_ms = slowest_ms.max(ms);
        });

        if sim_time >= next_report {
            let metrics = engine.metrics();
            info!(
                t,
                fps = engine.fps(),
                avg_ms = metrics.avg_ms(),
                max_us = metrics.max_us,
                skipped = metrics.skipped_frames,
                "render stats"
            );
            next_report += Duration::from_secs(5);
        }

        sim_time += frame_time;
    }

    let metrics = engine.metrics();
    info!(
        frames = metrics.total_frames,
        skipped = metrics.skipped_frames,
        avg_ms = metrics.avg_ms(),
        slowest_ms,
        wall_ms = clock.elapsed().as_millis() as u64,
        "simulation finished"
    );
}

// =============================================================================
// Synthetic Telemetry
// =============================================================================

fn synthetic_snapshot(t: f32, inputs: DriverInputs) -> TelemetrySnapshot {
    let DriverInputs { engaged, left_blinker, blindspot, limit_confirmed } = inputs;
    // 60 s drive cycle: cruise, slow down to a stop, sit, pull away.
    let phase = t % 60.0;
    let v_ego = match phase {
        p if p < 30.0 => 25.0 + 2.0 * (t * 0.3).sin(),
        p if p < 40.0 => 25.0 * (1.0 - (p - 30.0) / 10.0),
        p if p < 48.0 => 0.0,
        p => 25.0 * ((p - 48.0) / 12.0),
    };
    let standstill = v_ego < 0.1;

    // Alternates between 100 and 80 km/h; the previous one holds until confirmed.
    let (limit, previous) =
        if (t / 20.0) as u32 % 2 == 0 { (100.0 / 3.6, 80.0 / 3.6) } else { (80.0 / 3.6, 100.0 / 3.6) };
    let confirmed_limit = if limit_confirmed { limit } else { previous };

    let d_rel = 30.0 + 15.0 * (t * 0.2).sin();
    let lead = LeadData { status: true, d_rel, y_rel: 0.0, v_rel: 2.0 * (t * 0.2).cos(), v_lead: v_ego + 1.0 };
    let left = LeadData { status: true, d_rel: d_rel + 12.0, y_rel: 3.5, v_rel: 1.0, v_lead: v_ego + 2.0 };

    TelemetrySnapshot {
        controls_alive: true,
        engaged,
        status: if engaged { Status::Engaged } else { Status::Disengaged },
        longitudinal_control: true,
        radar_fresh: true,
        controls: ControlsState { v_cruise: 110.0, ..ControlsState::default() },
        car: CarState {
            v_ego,
            standstill,
            brake_lights: phase > 30.0 && phase < 48.0,
            left_blinker,
            left_blindspot: blindspot,
            ..CarState::default()
        },
        speed_limit: SpeedLimitState {
            limit: confirmed_limit,
            changed: !limit_confirmed,
            unconfirmed_limit: limit,
            ..SpeedLimitState::default()
        },
        leads: LeadSet { one: lead, left, ..LeadSet::default() },
        acceleration: 1.5 * (t * 0.5).sin(),
        conditional_status: if (t / 15.0) as u32 % 2 == 0 { 0 } else { 10 },
        road_name: Some("Harbor Road".into()),
        model_length: 80.0,
        started_frames: (t * 20.0) as u32,
        ..TelemetrySnapshot::default()
    }
}

/// Road-space point `x` metres to the side at `d` metres ahead, mapped
/// through a simple pinhole onto calibrated camera space.
fn road_point(x: f32, d: f32) -> PointF {
    let scale = 900.0 / (d + 5.0);
    PointF::new(x * scale, (HORIZON - d).max(0.0) / HORIZON * 10.0 + 600.0 * 5.0 / (d + 5.0))
}

/// Band between two lateral offsets, near edge first, as a closed polygon.
fn band(cal: &Calibration, left: f32, right: f32, curve: f32, far: f32) -> Polygon {
    const STEPS: usize = 16;
    let mut poly = Polygon::new();
    for i in 0..=STEPS {
        let d = far * i as f32 / STEPS as f32;
        poly.push(cal.project(road_point(right + curve * d * d, d))).ok();
    }
    for i in (0..=STEPS).rev() {
        let d = far * i as f32 / STEPS as f32;
        poly.push(cal.project(road_point(left + curve * d * d, d))).ok();
    }
    poly
}

fn synthetic_scene(t: f32, cal: &Calibration) -> SceneGeometry {
    let curve = 0.0004 * (t * 0.1).sin();
    let line = |x: f32| band(cal, x - 0.06, x + 0.06, curve, 60.0);

    let mut scene = SceneGeometry {
        lane_lines: [line(-3.0 * HALF_LANE), line(-HALF_LANE), line(HALF_LANE), line(3.0 * HALF_LANE)],
        lane_line_probs: [0.3, 0.9, 0.9, 0.3],
        road_edges: [line(-4.0 * HALF_LANE), line(4.0 * HALF_LANE)],
        road_edge_stds: [0.4, 0.4],
        track: band(cal, -0.9, 0.9, curve, 50.0),
        track_edge: band(cal, -1.0, 1.0, curve, 50.0),
        lane_width_left: 2.0 * HALF_LANE,
        lane_width_right: 2.0 * HALF_LANE,
        world_objects_visible: true,
        ..SceneGeometry::default()
    };
    scene.track_adjacent[4] = band(cal, -3.0 * HALF_LANE, -HALF_LANE, curve, 50.0);
    scene.track_adjacent[5] = band(cal, HALF_LANE, 3.0 * HALF_LANE, curve, 50.0);
    for i in 0..17 {
        scene.track_accel.push(0.5 * ((t + i as f32) * 0.4).sin()).ok();
    }

    let d_rel = 30.0 + 15.0 * (t * 0.2).sin();
    scene.lead_vertices[0] = cal.project(road_point(curve * d_rel * d_rel, d_rel));
    scene.lead_vertices[2] = cal.project(road_point(-2.0 * HALF_LANE, d_rel + 12.0));
    scene
}
