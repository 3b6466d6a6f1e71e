use glam::DVec2;
use std::time::{Duration, Instant};

use crate::map::projection::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Allowed scale range, relative to the base projection
pub const SCALE_EXTENT: (f64, f64) = (1.0, 8.0);
/// Zoom-in button factor
pub const ZOOM_IN_FACTOR: f64 = 1.3;
/// Zoom-out button factor
pub const ZOOM_OUT_FACTOR: f64 = 0.7;
/// One wheel notch
pub const WHEEL_FACTOR: f64 = 1.2;
/// Button zoom animation length
pub const ZOOM_DURATION: Duration = Duration::from_millis(250);
/// Reset animation length
pub const RESET_DURATION: Duration = Duration::from_millis(750);

/// Pan/zoom affine applied to the projected map: `p * k + (x, y)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn translation(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn apply(&self, p: DVec2) -> DVec2 {
        p * self.k + self.translation()
    }

    pub fn invert(&self, p: DVec2) -> DVec2 {
        (p - self.translation()) / self.k
    }

    /// Rescale to `k` (clamped) keeping the map point under `anchor` fixed
    pub fn scaled_at(&self, k: f64, anchor: DVec2) -> Self {
        let k = k.clamp(SCALE_EXTENT.0, SCALE_EXTENT.1);
        let fixed = self.invert(anchor);
        let t = anchor - fixed * k;
        Self { x: t.x, y: t.y, k }
    }

    pub fn translated(&self, delta: DVec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            k: self.k,
        }
    }

    fn lerp(&self, to: &Self, t: f64) -> Self {
        Self {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
            k: self.k + (to.k - self.k) * t,
        }
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Animated move between two transforms
#[derive(Clone, Copy, Debug)]
struct Transition {
    from: ViewTransform,
    to: ViewTransform,
    start: Instant,
    duration: Duration,
}

impl Transition {
    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    fn at(&self, now: Instant) -> ViewTransform {
        let t = self.progress(now);
        if t >= 1.0 {
            self.to
        } else {
            self.from.lerp(&self.to, ease_cubic_in_out(t))
        }
    }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Single owner of the view transform. Buttons, wheel and drag all go
/// through here.
#[derive(Clone, Debug, Default)]
pub struct Zoom {
    transform: ViewTransform,
    transition: Option<Transition>,
}

impl Zoom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current (possibly mid-animation) transform
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Where the running animation ends, or the current transform
    pub fn target(&self) -> ViewTransform {
        self.transition.map_or(self.transform, |t| t.to)
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Advance the animation. Returns true while still running.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(transition) = self.transition else {
            return false;
        };
        self.transform = transition.at(now);
        if transition.progress(now) >= 1.0 {
            self.transition = None;
        }
        self.transition.is_some()
    }

    /// Animated zoom about the canvas center. Steps compose on the pending
    /// target so repeated presses accumulate.
    pub fn scale_by(&mut self, factor: f64, now: Instant) {
        let center = DVec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0);
        let base = self.target();
        let to = base.scaled_at(base.k * factor, center);
        self.animate(to, ZOOM_DURATION, now);
    }

    pub fn zoom_in(&mut self, now: Instant) {
        self.scale_by(ZOOM_IN_FACTOR, now);
    }

    pub fn zoom_out(&mut self, now: Instant) {
        self.scale_by(ZOOM_OUT_FACTOR, now);
    }

    /// Animate back to identity
    pub fn reset(&mut self, now: Instant) {
        self.animate(ViewTransform::IDENTITY, RESET_DURATION, now);
    }

    /// Immediate zoom about a canvas point (wheel gesture)
    pub fn zoom_at(&mut self, factor: f64, anchor: DVec2) {
        self.transition = None;
        self.transform = self.transform.scaled_at(self.transform.k * factor, anchor);
    }

    /// Immediate pan by a canvas-unit delta (drag gesture)
    pub fn pan_by(&mut self, delta: DVec2) {
        self.transition = None;
        self.transform = self.transform.translated(delta);
    }

    fn animate(&mut self, to: ViewTransform, duration: Duration, now: Instant) {
        self.transition = Some(Transition {
            from: self.transform,
            to,
            start: now,
            duration,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(zoom: &mut Zoom, now: Instant) {
        zoom.tick(now + RESET_DURATION);
        assert!(!zoom.is_animating());
    }

    #[test]
    fn test_zoom_in_then_inverse() {
        let now = Instant::now();
        let mut zoom = Zoom::new();
        zoom.zoom_in(now);
        settle(&mut zoom, now);
        assert!((zoom.transform().k - 1.3).abs() < 1e-12);

        zoom.scale_by(1.0 / ZOOM_IN_FACTOR, now);
        settle(&mut zoom, now);
        let t = zoom.transform();
        assert!((t.k - 1.0).abs() < 1e-12);
        assert!(t.x.abs() < 1e-9 && t.y.abs() < 1e-9);
    }

    #[test]
    fn test_scale_always_clamped() {
        let now = Instant::now();
        let mut zoom = Zoom::new();
        for _ in 0..50 {
            zoom.zoom_in(now);
            assert!(zoom.target().k <= SCALE_EXTENT.1);
        }
        settle(&mut zoom, now);
        assert_eq!(zoom.transform().k, 8.0);

        for _ in 0..50 {
            zoom.zoom_out(now);
            zoom.zoom_at(0.5, DVec2::new(10.0, 10.0));
            assert!(zoom.transform().k >= SCALE_EXTENT.0);
        }
        settle(&mut zoom, now);
        assert_eq!(zoom.transform().k, 1.0);
    }

    #[test]
    fn test_reset_returns_identity() {
        let now = Instant::now();
        let mut zoom = Zoom::new();
        zoom.zoom_at(3.0, DVec2::new(200.0, 100.0));
        zoom.pan_by(DVec2::new(-45.0, 80.0));
        zoom.reset(now);
        assert!(zoom.is_animating());

        // Halfway it's somewhere in between
        zoom.tick(now + RESET_DURATION / 2);
        assert!(zoom.transform().k > 1.0 && zoom.transform().k < 3.0);

        zoom.tick(now + RESET_DURATION);
        assert_eq!(zoom.transform(), ViewTransform::IDENTITY);
        assert!(!zoom.is_animating());
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut zoom = Zoom::new();
        let anchor = DVec2::new(300.0, 200.0);
        let under = zoom.transform().invert(anchor);
        zoom.zoom_at(2.0, anchor);
        let moved = zoom.transform().apply(under);
        assert!((moved - anchor).length() < 1e-9);
    }

    #[test]
    fn test_gesture_interrupts_animation() {
        let now = Instant::now();
        let mut zoom = Zoom::new();
        zoom.zoom_in(now);
        zoom.tick(now + ZOOM_DURATION / 2);
        let mid = zoom.transform();

        zoom.pan_by(DVec2::new(5.0, 0.0));
        assert!(!zoom.is_animating());
        assert_eq!(zoom.transform().k, mid.k);
        assert_eq!(zoom.transform().x, mid.x + 5.0);
    }

    #[test]
    fn test_buttons_and_drag_share_transform() {
        let now = Instant::now();
        let mut zoom = Zoom::new();
        zoom.pan_by(DVec2::new(100.0, 0.0));
        zoom.zoom_in(now);
        settle(&mut zoom, now);
        // Button zoom starts from the panned transform
        let center = DVec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0);
        let expected = ViewTransform {
            x: 100.0,
            y: 0.0,
            k: 1.0,
        }
        .scaled_at(1.3, center);
        assert!((zoom.transform().x - expected.x).abs() < 1e-9);
        assert!((zoom.transform().y - expected.y).abs() < 1e-9);
    }
}
