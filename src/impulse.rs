//! Pointer input to impulses.

use cgmath::{vec2, vec3, Vector2, Vector3};
use rand::Rng;
use std::vec::Drain;

/// Drag velocity per pixel of pointer movement.
pub const DRAG_VELOCITY_SCALE: f64 = 5.0;
/// Click velocity components are uniform in `[-CLICK_VELOCITY / 2, CLICK_VELOCITY / 2)`.
pub const CLICK_VELOCITY: f64 = 2000.0;

/// A one-frame Gaussian injection into velocity and dye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impulse {
    /// Center in `[0, 1]^2`, origin bottom-left.
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub color: Vector3<f64>,
    pub radius: f64,
}

/// Queues impulses until the next frame consumes them.
#[derive(Debug, Clone)]
pub struct ImpulseSource {
    pending: Vec<Impulse>,
    surface: (u32, u32),
}

impl ImpulseSource {
    pub fn new(surface: (u32, u32)) -> Self {
        Self {
            pending: Vec::new(),
            surface,
        }
    }

    pub fn set_surface(&mut self, surface: (u32, u32)) {
        self.surface = surface;
    }

    /// Pixel coordinates to `[0, 1]^2` with y pointing up.
    pub fn normalize(&self, x: f64, y: f64) -> Vector2<f64> {
        let w = self.surface.0.max(1) as f64;
        let h = self.surface.1.max(1) as f64;
        vec2(x / w, 1.0 - y / h)
    }

    /// Queues a white drag impulse following the pointer movement.
    pub fn pointer_move(&mut self, x: f64, y: f64, dx: f64, dy: f64, radius: f64) {
        let position = self.normalize(x, y);
        self.push(Impulse {
            position,
            velocity: vec2(dx * DRAG_VELOCITY_SCALE, -dy * DRAG_VELOCITY_SCALE),
            color: vec3(1.0, 1.0, 1.0),
            radius,
        });
    }

    /// Queues an impulse with random velocity and color.
    pub fn pointer_click<R: Rng>(&mut self, x: f64, y: f64, radius: f64, rng: &mut R) {
        let position = self.normalize(x, y);
        let velocity = vec2(
            (rng.gen::<f64>() - 0.5) * CLICK_VELOCITY,
            (rng.gen::<f64>() - 0.5) * CLICK_VELOCITY,
        );
        let color = vec3(rng.gen(), rng.gen(), rng.gen());
        self.push(Impulse {
            position,
            velocity,
            color,
            radius,
        });
    }

    pub fn push(&mut self, impulse: Impulse) {
        self.pending.push(impulse);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Takes every queued impulse in arrival order.
    pub fn drain(&mut self) -> Drain<'_, Impulse> {
        self.pending.drain(..)
    }
}
