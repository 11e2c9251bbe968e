use cgmath::{vec2, Vector2, Vector3, Zero};
use ndarray::{Array2, Zip};
use std::ops::{Add, Mul, Sub};

pub mod field;
pub mod pressure;
pub mod solver;

pub use field::{Capabilities, DoubleField, FieldStore, Filter, Format, Quantity};
pub use solver::{Solver, DT};

/// A value stored in one grid cell.
pub trait Texel:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self> + Send + Sync
{
    fn zero() -> Self;

    /// Applies `f` to every channel.
    fn map_channels<F: Fn(f64) -> f64>(self, f: F) -> Self;
}

impl Texel for f64 {
    fn zero() -> Self {
        0.0
    }

    fn map_channels<F: Fn(f64) -> f64>(self, f: F) -> Self {
        f(self)
    }
}

impl Texel for Vector2<f64> {
    fn zero() -> Self {
        Zero::zero()
    }

    fn map_channels<F: Fn(f64) -> f64>(self, f: F) -> Self {
        self.map(f)
    }
}

impl Texel for Vector3<f64> {
    fn zero() -> Self {
        Zero::zero()
    }

    fn map_channels<F: Fn(f64) -> f64>(self, f: F) -> Self {
        self.map(f)
    }
}

/// Normalized coordinate of the center of cell `(i, j)`.
pub fn texel_uv((i, j): (usize, usize), (w, h): (usize, usize)) -> Vector2<f64> {
    vec2((i as f64 + 0.5) / w as f64, (j as f64 + 0.5) / h as f64)
}

/// Size of one cell in normalized coordinates.
pub fn texel_size((w, h): (usize, usize)) -> Vector2<f64> {
    vec2(1.0 / w as f64, 1.0 / h as f64)
}

/// Cell `(i + di, j + dj)`, clamped to the nearest edge cell.
pub fn neighbor<T: Copy>(q: &Array2<T>, (i, j): (usize, usize), di: isize, dj: isize) -> T {
    let (w, h) = q.dim();
    let x = (i as isize + di).max(0).min(w as isize - 1) as usize;
    let y = (j as isize + dj).max(0).min(h as isize - 1) as usize;
    q[[x, y]]
}

fn interpolate_linear<T: Texel>(q: &Array2<T>, ij: Vector2<f64>) -> T {
    let (w, h) = q.dim();

    assert!(w >= 1);
    assert!(h >= 1);

    let x = ij.x.max(0.0).min((w - 1) as f64);
    let y = ij.y.max(0.0).min((h - 1) as f64);

    let i0 = x as usize;
    let i1 = (i0 + 1).min(w - 1);

    let j0 = y as usize;
    let j1 = (j0 + 1).min(h - 1);

    let s1 = x - i0 as f64;
    let s0 = 1.0 - s1;

    let t1 = y - j0 as f64;
    let t0 = 1.0 - t1;

    (q[[i0, j0]] * t0 + q[[i0, j1]] * t1) * s0 + (q[[i1, j0]] * t0 + q[[i1, j1]] * t1) * s1
}

fn interpolate_nearest<T: Texel>(q: &Array2<T>, ij: Vector2<f64>) -> T {
    let (w, h) = q.dim();

    assert!(w >= 1);
    assert!(h >= 1);

    let x = (ij.x + 0.5).floor().max(0.0).min((w - 1) as f64);
    let y = (ij.y + 0.5).floor().max(0.0).min((h - 1) as f64);

    q[[x as usize, y as usize]]
}

/// Runs one data-parallel pass: every cell of `out` becomes `f(cell)`,
/// converted to `format`.
pub fn pass<T, F>(out: &mut Array2<T>, format: Format, f: F)
where
    T: Texel,
    F: Fn((usize, usize)) -> T + Sync + Send,
{
    Zip::indexed(out).par_for_each(|ij, e| *e = format.store(f(ij)));
}

/// Samples `q` at normalized coordinate `uv` with clamp-to-edge addressing.
pub fn sample<T: Texel>(q: &Array2<T>, uv: Vector2<f64>, filter: Filter) -> T {
    let (w, h) = q.dim();
    let ij = vec2(uv.x * w as f64 - 0.5, uv.y * h as f64 - 0.5);

    match filter {
        Filter::Linear => interpolate_linear(q, ij),
        Filter::Nearest => interpolate_nearest(q, ij),
    }
}
