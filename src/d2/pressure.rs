//! Pressure projection: divergence, Jacobi relaxation and gradient subtraction.

use super::{neighbor, pass, Format};
use cgmath::{vec2, Vector2};
use ndarray::Array2;

/// Central-difference divergence of `uv`.
///
/// A neighbor outside the grid reflects the center cell: its component along
/// that axis is replaced by the negated center component, so no flow crosses
/// the walls.
pub fn divergence(uv: &Array2<Vector2<f64>>, out: &mut Array2<f64>, format: Format) {
    assert_eq!(uv.dim(), out.dim());

    let (w, h) = uv.dim();

    pass(out, format, |(i, j)| {
        let c = uv[[i, j]];

        let l = if i == 0 { -c.x } else { uv[[i - 1, j]].x };
        let r = if i + 1 == w { -c.x } else { uv[[i + 1, j]].x };
        let b = if j == 0 { -c.y } else { uv[[i, j - 1]].y };
        let t = if j + 1 == h { -c.y } else { uv[[i, j + 1]].y };

        0.5 * ((r - l) + (t - b))
    });
}

/// One Jacobi sweep of the pressure Poisson equation.
pub fn jacobi(p: &Array2<f64>, div: &Array2<f64>, out: &mut Array2<f64>, format: Format) {
    assert_eq!(p.dim(), div.dim());
    assert_eq!(p.dim(), out.dim());

    pass(out, format, |ij| {
        let l = neighbor(p, ij, -1, 0);
        let r = neighbor(p, ij, 1, 0);
        let b = neighbor(p, ij, 0, -1);
        let t = neighbor(p, ij, 0, 1);

        (l + r + b + t - div[[ij.0, ij.1]]) * 0.25
    });
}

/// Subtracts the pressure gradient from `uv`.
pub fn subtract_gradient(
    p: &Array2<f64>,
    uv: &Array2<Vector2<f64>>,
    out: &mut Array2<Vector2<f64>>,
    format: Format,
) {
    assert_eq!(p.dim(), uv.dim());
    assert_eq!(uv.dim(), out.dim());

    pass(out, format, |ij| {
        let l = neighbor(p, ij, -1, 0);
        let r = neighbor(p, ij, 1, 0);
        let b = neighbor(p, ij, 0, -1);
        let t = neighbor(p, ij, 0, 1);

        uv[[ij.0, ij.1]] - vec2(r - l, t - b)
    });
}
