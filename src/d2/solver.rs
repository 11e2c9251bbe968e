use super::field::{FieldStore, Filter, Format, Quantity};
use super::pressure::{divergence, jacobi, subtract_gradient};
use super::{neighbor, pass, sample, texel_size, texel_uv, Texel};
use crate::config::{Config, MIN_SPLAT_RADIUS};
use crate::impulse::Impulse;
use cgmath::{vec2, InnerSpace, Vector2};
use log::trace;
use ndarray::Array2;

/// Fixed simulation timestep in seconds.
pub const DT: f64 = 0.016;

const VORTICITY_EPSILON: f64 = 1e-4;

/// Scalar curl of `uv`.
pub fn curl(uv: &Array2<Vector2<f64>>, out: &mut Array2<f64>, format: Format) {
    assert_eq!(uv.dim(), out.dim());

    pass(out, format, |ij| {
        let l = neighbor(uv, ij, -1, 0).y;
        let r = neighbor(uv, ij, 1, 0).y;
        let b = neighbor(uv, ij, 0, -1).x;
        let t = neighbor(uv, ij, 0, 1).x;

        (r - l) - (t - b)
    });
}

/// Adds the vorticity confinement force scaled by `strength` to `uv`.
pub fn vorticity(
    uv: &Array2<Vector2<f64>>,
    curl: &Array2<f64>,
    strength: f64,
    dt: f64,
    out: &mut Array2<Vector2<f64>>,
    format: Format,
) {
    assert_eq!(uv.dim(), curl.dim());
    assert_eq!(uv.dim(), out.dim());

    pass(out, format, |ij| {
        let l = neighbor(curl, ij, -1, 0);
        let r = neighbor(curl, ij, 1, 0);
        let b = neighbor(curl, ij, 0, -1);
        let t = neighbor(curl, ij, 0, 1);
        let c = curl[[ij.0, ij.1]];

        let mut force = 0.5 * vec2(t.abs() - b.abs(), r.abs() - l.abs());
        force /= force.magnitude() + VORTICITY_EPSILON;
        force *= strength * c;
        force.y = -force.y;

        uv[[ij.0, ij.1]] + force * dt
    });
}

/// Semi-Lagrangian transport of `q` along `uv`, decayed by `dissipation`.
///
/// `q` may have a different resolution than `uv`; the backtrace is measured in
/// velocity texels.
pub fn advect<T: Texel>(
    uv: &Array2<Vector2<f64>>,
    q: &Array2<T>,
    dt: f64,
    dissipation: f64,
    filter: Filter,
    out: &mut Array2<T>,
    format: Format,
) {
    assert_eq!(q.dim(), out.dim());

    let texel = texel_size(uv.dim());
    let decay = 1.0 + dissipation * dt;
    let dim = q.dim();

    pass(out, format, |ij| {
        let pos = texel_uv(ij, dim);
        let vel = sample(uv, pos, filter);
        let coord = pos - dt * vec2(vel.x * texel.x, vel.y * texel.y);

        sample(q, coord, filter) * (1.0 / decay)
    });
}

/// Adds a Gaussian blob of `delta` centered at `point` to `q`.
///
/// `aspect` is the display width over height; it stretches the horizontal
/// offset so the blob stays round on screen. Radii below
/// [`MIN_SPLAT_RADIUS`] are raised to it.
pub fn splat<T: Texel>(
    q: &Array2<T>,
    point: Vector2<f64>,
    delta: T,
    radius: f64,
    aspect: f64,
    out: &mut Array2<T>,
    format: Format,
) {
    assert_eq!(q.dim(), out.dim());

    let dim = q.dim();
    let radius = radius.max(MIN_SPLAT_RADIUS);

    pass(out, format, |ij| {
        let mut p = texel_uv(ij, dim) - point;
        p.x *= aspect;

        q[[ij.0, ij.1]] + delta * (-p.dot(p) / radius).exp()
    });
}

/// Advances a [`FieldStore`] by fixed timesteps.
#[derive(Debug, Clone, Copy)]
pub struct Solver {
    pub dt: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self { dt: DT }
    }
}

impl Solver {
    /// Injects one impulse into velocity and then into dye.
    pub fn apply_impulse(&self, fields: &mut FieldStore, impulse: &Impulse, aspect: f64) {
        let format = fields.format();

        let (read, write) = fields.velocity.read_write();
        splat(
            read,
            impulse.position,
            impulse.velocity,
            impulse.radius,
            aspect,
            write,
            format,
        );
        fields.swap(Quantity::Velocity);

        let (read, write) = fields.density.read_write();
        splat(
            read,
            impulse.position,
            impulse.color,
            impulse.radius,
            aspect,
            write,
            format,
        );
        fields.swap(Quantity::Density);
    }

    /// Runs the stage sequence once.
    pub fn step(&self, fields: &mut FieldStore, config: &Config) {
        let format = fields.format();
        let filter = fields.filter();
        let dt = self.dt;

        curl(fields.velocity.read(), &mut fields.curl, format);

        let (read, write) = fields.velocity.read_write();
        vorticity(read, &fields.curl, config.curl, dt, write, format);
        fields.swap(Quantity::Velocity);

        divergence(fields.velocity.read(), &mut fields.divergence, format);

        // Last frame's pressure seeds the solve.
        let (read, write) = fields.pressure.read_write();
        write.assign(read);
        fields.swap(Quantity::Pressure);

        for _ in 0..config.pressure_iterations {
            let (read, write) = fields.pressure.read_write();
            jacobi(read, &fields.divergence, write, format);
            fields.swap(Quantity::Pressure);
        }

        let (read, write) = fields.velocity.read_write();
        subtract_gradient(fields.pressure.read(), read, write, format);
        fields.swap(Quantity::Velocity);

        let (read, write) = fields.velocity.read_write();
        advect(
            read,
            read,
            dt,
            config.velocity_dissipation,
            filter,
            write,
            format,
        );
        fields.swap(Quantity::Velocity);

        let (read, write) = fields.density.read_write();
        advect(
            fields.velocity.read(),
            read,
            dt,
            config.density_dissipation,
            filter,
            write,
            format,
        );
        fields.swap(Quantity::Density);

        trace!("stepped {:?} grids", fields.dim());
    }
}
