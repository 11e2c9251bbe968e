//! Double-buffered grids and the resolution policy.

use super::Texel;
use cgmath::{Vector2, Vector3};
use log::{debug, warn};
use ndarray::{Array, Array2};

/// Backing numeric format of every grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wide floating point per channel.
    Float,
    /// 8-bit unsigned normalized: channels clamp to `[0, 1]` in 1/255 steps.
    Byte,
}

impl Format {
    /// Converts a freshly computed value into what this format can hold.
    pub fn store<T: Texel>(self, v: T) -> T {
        match self {
            Format::Float => v,
            Format::Byte => v.map_channels(|c| (c.max(0.0).min(1.0) * 255.0).round() / 255.0),
        }
    }
}

/// How velocity and dye are sampled between texel centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Linear,
    Nearest,
}

/// What the execution environment can back the grids with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub float_targets: bool,
    pub float_linear_filtering: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            float_targets: true,
            float_linear_filtering: true,
        }
    }
}

impl Capabilities {
    fn format(&self) -> Format {
        if self.float_targets {
            Format::Float
        } else {
            warn!("float render targets not supported, falling back to 8-bit");
            Format::Byte
        }
    }

    fn filter(&self) -> Filter {
        if self.float_linear_filtering {
            Filter::Linear
        } else {
            warn!("linear filtering of float grids not supported, sampling nearest");
            Filter::Nearest
        }
    }
}

/// Grid resolution for a display surface of `surface` pixels.
///
/// The shorter grid side is `round(base)` and the longer one
/// `round(base * aspect)`, oriented like the surface. Zero sizes are
/// clamped to one.
pub fn resolution(base: u32, (sw, sh): (u32, u32)) -> (usize, usize) {
    if base == 0 || sw == 0 || sh == 0 {
        warn!(
            "invalid resolution (base {}, surface {}x{}), clamping to 1",
            base, sw, sh
        );
    }

    let base = base.max(1) as f64;
    let (sw, sh) = (sw.max(1), sh.max(1));

    let mut aspect = sw as f64 / sh as f64;
    if aspect < 1.0 {
        aspect = 1.0 / aspect;
    }

    let min = (base.round() as usize).max(1);
    let max = ((base * aspect).round() as usize).max(1);

    if sw > sh {
        (max, min)
    } else {
        (min, max)
    }
}

/// A read/write pair of same-shaped grids.
#[derive(Debug, Clone)]
pub struct DoubleField<T> {
    read: Array2<T>,
    write: Array2<T>,
}

impl<T: Texel> DoubleField<T> {
    pub fn zeros(dim: (usize, usize)) -> Self {
        Self {
            read: Array::from_elem(dim, T::zero()),
            write: Array::from_elem(dim, T::zero()),
        }
    }
}

impl<T> DoubleField<T> {
    pub fn read(&self) -> &Array2<T> {
        &self.read
    }

    pub fn write_mut(&mut self) -> &mut Array2<T> {
        &mut self.write
    }

    /// The current grid for reading and the target for this pass.
    pub fn read_write(&mut self) -> (&Array2<T>, &mut Array2<T>) {
        (&self.read, &mut self.write)
    }

    /// Exchanges read and write roles. No cell is touched.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.read, &mut self.write);
    }

    pub fn dim(&self) -> (usize, usize) {
        self.read.dim()
    }
}

/// Quantities owned by a [`FieldStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Velocity,
    Density,
    Pressure,
    Divergence,
    Curl,
}

/// Owns every simulation grid at one resolution.
#[derive(Debug, Clone)]
pub struct FieldStore {
    pub(crate) velocity: DoubleField<Vector2<f64>>,
    pub(crate) density: DoubleField<Vector3<f64>>,
    pub(crate) pressure: DoubleField<f64>,
    pub(crate) divergence: Array2<f64>,
    pub(crate) curl: Array2<f64>,
    format: Format,
    filter: Filter,
}

impl FieldStore {
    /// Allocates zeroed grids of `dim` cells, picking the widest format the
    /// environment supports.
    pub fn new(dim: (usize, usize), caps: Capabilities) -> Self {
        let dim = (dim.0.max(1), dim.1.max(1));
        let format = caps.format();
        let filter = caps.filter();

        debug!(
            "allocating {}x{} grids ({:?}, {:?} filtering)",
            dim.0, dim.1, format, filter
        );

        Self {
            velocity: DoubleField::zeros(dim),
            density: DoubleField::zeros(dim),
            pressure: DoubleField::zeros(dim),
            divergence: Array::zeros(dim),
            curl: Array::zeros(dim),
            format,
            filter,
        }
    }

    /// Recreates every grid at `dim`, discarding all field contents.
    pub fn allocate(&mut self, dim: (usize, usize)) {
        let dim = (dim.0.max(1), dim.1.max(1));

        debug!("reallocating grids at {}x{}", dim.0, dim.1);

        self.velocity = DoubleField::zeros(dim);
        self.density = DoubleField::zeros(dim);
        self.pressure = DoubleField::zeros(dim);
        self.divergence = Array::zeros(dim);
        self.curl = Array::zeros(dim);
    }

    pub fn dim(&self) -> (usize, usize) {
        self.velocity.dim()
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn velocity(&self) -> &Array2<Vector2<f64>> {
        self.velocity.read()
    }

    pub fn velocity_mut(&mut self) -> &mut Array2<Vector2<f64>> {
        self.velocity.write_mut()
    }

    pub fn density(&self) -> &Array2<Vector3<f64>> {
        self.density.read()
    }

    pub fn density_mut(&mut self) -> &mut Array2<Vector3<f64>> {
        self.density.write_mut()
    }

    pub fn pressure(&self) -> &Array2<f64> {
        self.pressure.read()
    }

    pub fn divergence(&self) -> &Array2<f64> {
        &self.divergence
    }

    pub fn curl(&self) -> &Array2<f64> {
        &self.curl
    }

    /// Promotes the write target of `quantity` to its current grid.
    ///
    /// Divergence and curl are single-buffered and simply overwritten, so
    /// swapping them does nothing.
    pub fn swap(&mut self, quantity: Quantity) {
        match quantity {
            Quantity::Velocity => self.velocity.swap(),
            Quantity::Density => self.density.swap(),
            Quantity::Pressure => self.pressure.swap(),
            Quantity::Divergence | Quantity::Curl => {}
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use cgmath::vec2;

    #[test]
    fn test_resolution_landscape() {
        assert_eq!(resolution(128, (1920, 1080)), (228, 128));
        assert_eq!(resolution(512, (800, 400)), (1024, 512));
    }

    #[test]
    fn test_resolution_portrait() {
        assert_eq!(resolution(128, (1080, 1920)), (128, 228));
        assert_eq!(resolution(100, (300, 450)), (100, 150));
    }

    #[test]
    fn test_resolution_square() {
        assert_eq!(resolution(64, (500, 500)), (64, 64));
    }

    #[test]
    fn test_resolution_invariant() {
        for &base in &[1u32, 7, 64, 255, 512] {
            for &(sw, sh) in &[(640u32, 480u32), (480, 640), (1000, 333), (17, 1200)] {
                let (w, h) = resolution(base, (sw, sh));
                let aspect = sw.max(sh) as f64 / sw.min(sh) as f64;

                assert_eq!(w.min(h), base as usize);
                assert_eq!(w.max(h), (base as f64 * aspect).round() as usize);
                if w != h {
                    assert_eq!(w > h, sw > sh);
                }
            }
        }
    }

    #[test]
    fn test_resolution_clamps_invalid() {
        assert_eq!(resolution(0, (640, 640)), (1, 1));
        assert_eq!(resolution(16, (0, 0)), (16, 16));
        assert_eq!(resolution(0, (0, 10)), (1, 10));
    }

    #[test]
    fn test_swap_twice_restores() {
        let mut f = DoubleField::<f64>::zeros((2, 2));
        f.write_mut()[[0, 0]] = 1.0;
        f.swap();
        assert_abs_diff_eq!(f.read()[[0, 0]], 1.0);

        f.swap();
        assert_abs_diff_eq!(f.read()[[0, 0]], 0.0);
        assert_abs_diff_eq!(f.write_mut()[[0, 0]], 1.0);
    }

    #[test]
    fn test_store_swap_scratch_is_noop() {
        let mut store = FieldStore::new((3, 2), Capabilities::default());
        store.curl[[1, 1]] = 2.0;
        store.swap(Quantity::Curl);
        store.swap(Quantity::Divergence);
        assert_abs_diff_eq!(store.curl()[[1, 1]], 2.0);
    }

    #[test]
    fn test_allocate_zeroes_everything() {
        let mut store = FieldStore::new((4, 4), Capabilities::default());
        store.velocity_mut()[[1, 1]] = vec2(1.0, 2.0);
        store.swap(Quantity::Velocity);

        store.allocate((6, 3));
        assert_eq!(store.dim(), (6, 3));
        assert_eq!(store.pressure().dim(), (6, 3));
        assert!(store.velocity().iter().all(|v| v.x == 0.0 && v.y == 0.0));
    }

    #[test]
    fn test_format_fallback() {
        let caps = Capabilities {
            float_targets: false,
            float_linear_filtering: false,
        };
        let store = FieldStore::new((2, 2), caps);
        assert_eq!(store.format(), Format::Byte);
        assert_eq!(store.filter(), Filter::Nearest);
    }

    #[test]
    fn test_byte_format_quantizes_and_clamps() {
        assert_abs_diff_eq!(Format::Byte.store(-0.5), 0.0);
        assert_abs_diff_eq!(Format::Byte.store(3.0), 1.0);
        assert_abs_diff_eq!(Format::Byte.store(0.5), 128.0 / 255.0);
        assert_abs_diff_eq!(Format::Float.store(-0.5), -0.5);

        let v = Format::Byte.store(vec2(0.2, -1.0));
        assert_abs_diff_eq!(v.x, 51.0 / 255.0);
        assert_abs_diff_eq!(v.y, 0.0);
    }
}
