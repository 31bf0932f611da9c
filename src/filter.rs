//! First-order smoothing used by the frame-rate readout and the driver
//! monitor fade.

/// First-order low-pass filter with time constant `rc` sampled every `dt`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FirstOrderFilter {
    x: f32,
    k: f32,
}

impl FirstOrderFilter {
    pub fn new(initial: f32, rc: f32, dt: f32) -> Self {
        Self { x: initial, k: dt / (rc + dt) }
    }

    /// Feed one sample and return the filtered value.
    pub fn update(&mut self, sample: f32) -> f32 {
        self.x = (1.0 - self.k).mul_add(self.x, self.k * sample);
        self.x
    }

    #[inline]
    pub const fn value(&self) -> f32 {
        self.x
    }
}

/// One tick of the driver-monitor fade: towards 0 while active, towards 1
/// while inactive, moving `rate / 2` per tick.
#[inline]
pub fn dm_fade_step(fade: f32, active: bool, rate: f32) -> f32 {
    let active = if active { 1.0 } else { 0.0 };
    rate.mul_add(0.5 - active, fade).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_converges_to_input() {
        let mut f = FirstOrderFilter::new(20.0, 3.0, 1.0 / 20.0);
        for _ in 0..2000 {
            f.update(10.0);
        }
        assert!((f.value() - 10.0).abs() < 0.01, "Filter should settle at the input, got {}", f.value());
    }

    #[test]
    fn test_filter_single_step_is_small() {
        let mut f = FirstOrderFilter::new(20.0, 3.0, 1.0 / 20.0);
        let out = f.update(0.0);
        assert!(out > 19.0, "One dropped frame must not crash the fps readout, got {out}");
    }

    #[test]
    fn test_dm_fade_active_goes_to_zero() {
        let mut fade = 1.0;
        for _ in 0..20 {
            fade = dm_fade_step(fade, true, 0.2);
        }
        assert_eq!(fade, 0.0, "Active monitoring fades the overlay fully in");
    }

    #[test]
    fn test_dm_fade_steps_by_tenth() {
        let fade = dm_fade_step(0.5, false, 0.2);
        assert!((fade - 0.6).abs() < 1e-6);
        let fade = dm_fade_step(0.5, true, 0.2);
        assert!((fade - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_dm_fade_clamped() {
        assert_eq!(dm_fade_step(1.0, false, 0.2), 1.0);
        assert_eq!(dm_fade_step(0.0, true, 0.2), 0.0);
    }
}
