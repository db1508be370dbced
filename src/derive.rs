//! Construction of the derivative control tables a surface needs, from
//! the primary control grid and knot vectors alone.
//!
//! The partial derivative of a B-spline surface is itself a B-spline of
//! one lower order in the differentiated direction, whose control points
//! are scaled first differences of the original net and whose knot vector
//! drops one knot from each end. Applying that reduction once per
//! direction, and once more for the second-order quantities, produces the
//! five derivative grids that [`crate::SplineSurface`] blends. The
//! smoothing fit that produces the primary grid in the first place is out
//! of scope here; any fitted `(knots_x, knots_y, ctrl)` triple works.

use num_traits::Float;

use crate::surface::{basis_count, SplineSurface, SurfaceAxis, SurfaceGrids, ORDER};

/// Owned control tables for one surface: the primary grid plus the five
/// derivative grids and their reduced knot vectors.
///
/// Build with [`SurfaceTables::from_control_grid`], then borrow an
/// evaluator with [`SurfaceTables::surface`].
pub struct SurfaceTables<T> {
    knots_x: Vec<T>,
    dknots_x: Vec<T>,
    d2knots_x: Vec<T>,
    knots_y: Vec<T>,
    dknots_y: Vec<T>,
    d2knots_y: Vec<T>,
    value: Vec<T>,
    ddx: Vec<T>,
    ddy: Vec<T>,
    d2dx2: Vec<T>,
    d2dy2: Vec<T>,
    d2dxdy: Vec<T>,
    x_shift: T,
    y_shift: T,
}

/// Differentiate a control net along the row (x) direction:
/// `out[k][j] = order * (ctrl[k+1][j] - ctrl[k][j]) / (U[k+order+1] - U[k+1])`,
/// one fewer row out than in.
fn deriv_rows<T: Float>(
    ctrl: &[T],
    rows: usize,
    cols: usize,
    knots: &[T],
    order: usize,
) -> Result<Vec<T>, &'static str> {
    let scale = T::from(order).ok_or("Unrepresentable number")?;
    let mut out = vec![T::zero(); (rows - 1) * cols];
    for k in 0..rows - 1 {
        let den = knots[k + order + 1] - knots[k + 1];
        let den_is_positive = den > T::zero();
        if !den_is_positive {
            return Err("Degenerate knot spacing");
        }
        for j in 0..cols {
            out[k * cols + j] = scale * (ctrl[(k + 1) * cols + j] - ctrl[k * cols + j]) / den;
        }
    }
    Ok(out)
}

/// Differentiate a control net along the column (y) direction, one fewer
/// column out than in.
fn deriv_cols<T: Float>(
    ctrl: &[T],
    rows: usize,
    cols: usize,
    knots: &[T],
    order: usize,
) -> Result<Vec<T>, &'static str> {
    let scale = T::from(order).ok_or("Unrepresentable number")?;
    let mut out = vec![T::zero(); rows * (cols - 1)];
    for k in 0..cols - 1 {
        let den = knots[k + order + 1] - knots[k + 1];
        let den_is_positive = den > T::zero();
        if !den_is_positive {
            return Err("Degenerate knot spacing");
        }
        for i in 0..rows {
            out[i * (cols - 1) + k] = scale * (ctrl[i * cols + k + 1] - ctrl[i * cols + k]) / den;
        }
    }
    Ok(out)
}

impl<T: Float> SurfaceTables<T> {
    /// Derive the full table set from the primary surface data.
    ///
    /// `ctrl` is row-major with one row per x-direction basis function:
    /// `(knots_x.len() - 4) x (knots_y.len() - 4)` entries. The shifts
    /// are the per-axis offsets subtracted from query coordinates before
    /// span lookup.
    ///
    /// # Errors
    /// * If a knot vector is non-monotonic or has fewer than 8 entries
    /// * If `ctrl` does not match the knot vectors' basis counts
    /// * If a derivative denominator spans zero knot width
    pub fn from_control_grid(
        knots_x: &[T],
        knots_y: &[T],
        ctrl: &[T],
        x_shift: T,
        y_shift: T,
    ) -> Result<Self, &'static str> {
        let mx = basis_count(knots_x, ORDER)?;
        let my = basis_count(knots_y, ORDER)?;
        if ctrl.len() != mx * my {
            return Err("Dimension mismatch");
        }

        // First-derivative tables reduce the order along one direction
        let ddx = deriv_rows(ctrl, mx, my, knots_x, ORDER)?;
        let ddy = deriv_cols(ctrl, mx, my, knots_y, ORDER)?;

        // Second-derivative tables reduce a second time. The mixed table
        // differentiates the x-table along y, where it is still order 3.
        let dknots_x = knots_x[1..knots_x.len() - 1].to_vec();
        let dknots_y = knots_y[1..knots_y.len() - 1].to_vec();
        let d2dx2 = deriv_rows(&ddx, mx - 1, my, &dknots_x, ORDER - 1)?;
        let d2dy2 = deriv_cols(&ddy, mx, my - 1, &dknots_y, ORDER - 1)?;
        let d2dxdy = deriv_cols(&ddx, mx - 1, my, knots_y, ORDER)?;

        let d2knots_x = knots_x[2..knots_x.len() - 2].to_vec();
        let d2knots_y = knots_y[2..knots_y.len() - 2].to_vec();

        Ok(Self {
            knots_x: knots_x.to_vec(),
            dknots_x,
            d2knots_x,
            knots_y: knots_y.to_vec(),
            dknots_y,
            d2knots_y,
            value: ctrl.to_vec(),
            ddx,
            ddy,
            d2dx2,
            d2dy2,
            d2dxdy,
            x_shift,
            y_shift,
        })
    }

    /// Borrow the tables as a validated evaluator.
    ///
    /// # Errors
    /// * Propagates [`SplineSurface::new`] validation, which cannot
    ///   normally fail for tables built by
    ///   [`SurfaceTables::from_control_grid`]
    pub fn surface(&self) -> Result<SplineSurface<'_, T>, &'static str> {
        SplineSurface::new(
            SurfaceAxis {
                knots: &self.knots_x,
                dknots: &self.dknots_x,
                d2knots: &self.d2knots_x,
                shift: self.x_shift,
            },
            SurfaceAxis {
                knots: &self.knots_y,
                dknots: &self.dknots_y,
                d2knots: &self.d2knots_y,
                shift: self.y_shift,
            },
            SurfaceGrids {
                value: &self.value,
                ddx: &self.ddx,
                ddy: &self.ddy,
                d2dx2: &self.d2dx2,
                d2dy2: &self.d2dy2,
                d2dxdy: &self.d2dxdy,
            },
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::*;
    use crate::utils::*;
    use ndarray::Array2;

    #[test]
    fn test_flat_surface() {
        let kx = clamped_knots(0.0_f64, 3.0, 3, 3);
        let ky = clamped_knots(0.0_f64, 5.0, 6, 3);
        let mx = kx.len() - 4;
        let my = ky.len() - 4;

        let ctrl = vec![7.5; mx * my];
        let tables = SurfaceTables::from_control_grid(&kx, &ky, &ctrl, 0.0, 0.0).unwrap();
        let surf = tables.surface().unwrap();

        // Observation points all over the interior
        let xv = linspace(0.01_f64, 2.99, 7);
        let yv = linspace(0.01_f64, 4.99, 7);
        let obs = meshgrid(Vec::from([&xv, &yv]));
        let xs: Vec<f64> = obs.iter().map(|p| p[0]).collect();
        let ys: Vec<f64> = obs.iter().map(|p| p[1]).collect();

        let out = surf.eval_alloc(&xs, &ys).unwrap();
        for i in 0..xs.len() {
            assert!((out[6 * i] - 7.5).abs() < 1e-12);
            (1..6).for_each(|k| assert!(out[6 * i + k].abs() < 1e-12));
        }
    }

    /// Control points at the Greville abscissae reproduce a linear
    /// function exactly, so the first partials are the ramp slopes and
    /// the curvatures vanish.
    #[test]
    fn test_bilinear_ramp() {
        let kx = clamped_knots(0.0_f64, 4.0, 4, 3);
        let ky = clamped_knots(0.0_f64, 3.0, 3, 3);
        let mx = kx.len() - 4;
        let my = ky.len() - 4;

        let gx: Vec<f64> = (0..mx)
            .map(|i| (kx[i + 1] + kx[i + 2] + kx[i + 3]) / 3.0)
            .collect();
        let gy: Vec<f64> = (0..my)
            .map(|j| (ky[j + 1] + ky[j + 2] + ky[j + 3]) / 3.0)
            .collect();

        let (a, b, c) = (0.75, -1.25, 2.0);
        let ctrl = Array2::from_shape_fn((mx, my), |(i, j)| a * gx[i] + b * gy[j] + c);

        let tables =
            SurfaceTables::from_control_grid(&kx, &ky, ctrl.as_slice().unwrap(), 0.0, 0.0)
                .unwrap();
        let surf = tables.surface().unwrap();

        for &x in linspace(0.05_f64, 3.95, 9).iter() {
            for &y in linspace(0.05_f64, 2.95, 9).iter() {
                let out = surf.curvature(x, y);
                assert!((out[0] - (a * x + b * y + c)).abs() < 1e-12);
                assert!((out[1] - a).abs() < 1e-12);
                assert!((out[2] - b).abs() < 1e-12);
                assert!(out[3].abs() < 1e-12);
                assert!(out[4].abs() < 1e-12);
                assert!(out[5].abs() < 1e-12);
            }
        }
    }

    /// Derived derivative tables agree with central finite differences of
    /// the lower-order surfaces on a random control net.
    #[test]
    fn test_derivatives_match_finite_differences() {
        let kx = clamped_knots(0.0_f64, 2.0, 5, 3);
        let ky = clamped_knots(0.0_f64, 2.0, 4, 3);
        let mx = kx.len() - 4;
        let my = ky.len() - 4;

        let mut rng = rng_fixed_seed();
        let ctrl = randn::<f64>(&mut rng, mx * my);

        let tables = SurfaceTables::from_control_grid(&kx, &ky, &ctrl, 0.0, 0.0).unwrap();
        let surf = tables.surface().unwrap();

        // Observation points kept clear of the knot lines so the
        // difference stencils never straddle a continuity drop
        let h = 1e-5;
        for &x in linspace(0.23_f64, 1.77, 8).iter() {
            for &y in linspace(0.23_f64, 1.77, 8).iter() {
                let out = surf.curvature(x, y);

                let fx = (surf.value(x + h, y) - surf.value(x - h, y)) / (2.0 * h);
                let fy = (surf.value(x, y + h) - surf.value(x, y - h)) / (2.0 * h);
                assert!((out[1] - fx).abs() < 1e-6);
                assert!((out[2] - fy).abs() < 1e-6);

                let fxx = (surf.gradient(x + h, y)[1] - surf.gradient(x - h, y)[1]) / (2.0 * h);
                let fyy = (surf.gradient(x, y + h)[2] - surf.gradient(x, y - h)[2]) / (2.0 * h);
                let fxy = (surf.gradient(x, y + h)[1] - surf.gradient(x, y - h)[1]) / (2.0 * h);
                assert!((out[3] - fxx).abs() < 1e-6);
                assert!((out[4] - fyy).abs() < 1e-6);
                assert!((out[5] - fxy).abs() < 1e-6);
            }
        }
    }

    /// Scaling the whole control grid scales all six outputs by the same
    /// constant.
    #[test]
    fn test_outputs_linear_in_control_grid() {
        let kx = clamped_knots(0.0_f64, 1.0, 4, 3);
        let ky = clamped_knots(0.0_f64, 1.0, 4, 3);
        let mx = kx.len() - 4;
        let my = ky.len() - 4;

        let mut rng = rng_fixed_seed();
        let ctrl = randn::<f64>(&mut rng, mx * my);
        let c = 2.5;
        let scaled: Vec<f64> = ctrl.iter().map(|v| c * v).collect();

        let tables = SurfaceTables::from_control_grid(&kx, &ky, &ctrl, 0.0, 0.0).unwrap();
        let tables_scaled = SurfaceTables::from_control_grid(&kx, &ky, &scaled, 0.0, 0.0).unwrap();
        let surf = tables.surface().unwrap();
        let surf_scaled = tables_scaled.surface().unwrap();

        for &x in linspace(0.1_f64, 0.9, 5).iter() {
            for &y in linspace(0.1_f64, 0.9, 5).iter() {
                let out = surf.curvature(x, y);
                let out_scaled = surf_scaled.curvature(x, y);
                for k in 0..6 {
                    let tol = 1e-10 * out[k].abs().max(1.0);
                    assert!((out_scaled[k] - c * out[k]).abs() < tol);
                }
            }
        }
    }

    /// Shifted tables evaluated at shifted coordinates match unshifted
    /// tables. Dyadic offsets and query points keep the subtraction
    /// exact.
    #[test]
    fn test_coordinate_shift() {
        let kx = clamped_knots(0.0_f64, 2.0, 3, 3);
        let ky = clamped_knots(0.0_f64, 2.0, 3, 3);
        let mx = kx.len() - 4;
        let my = ky.len() - 4;

        let mut rng = rng_fixed_seed();
        let ctrl = randn::<f64>(&mut rng, mx * my);

        let plain = SurfaceTables::from_control_grid(&kx, &ky, &ctrl, 0.0, 0.0).unwrap();
        let shifted = SurfaceTables::from_control_grid(&kx, &ky, &ctrl, 16.0, -2.5).unwrap();
        let surf = plain.surface().unwrap();
        let surf_shifted = shifted.surface().unwrap();

        for (x, y) in [(0.25, 0.5), (0.75, 1.25), (1.5, 0.125), (1.75, 1.75)] {
            let a = surf.curvature(x, y);
            let b = surf_shifted.curvature(x + 16.0, y - 2.5);
            (0..6).for_each(|k| assert!((a[k] - b[k]).abs() < 1e-13));
        }
    }

    #[test]
    fn test_rejects_bad_primary_data() {
        let kx = clamped_knots(0.0_f64, 1.0, 2, 3);
        let ky = clamped_knots(0.0_f64, 1.0, 2, 3);
        let mx = kx.len() - 4;
        let my = ky.len() - 4;
        let ctrl = vec![1.0; mx * my];

        // Wrong control grid size
        assert!(SurfaceTables::from_control_grid(&kx, &ky, &ctrl[..ctrl.len() - 1], 0.0, 0.0)
            .is_err());

        // Non-monotonic knots
        let mut bad = kx.clone();
        bad[4] = -1.0;
        assert!(SurfaceTables::from_control_grid(&bad, &ky, &ctrl, 0.0, 0.0).is_err());

        // A five-fold start knot leaves a zero-width derivative pivot
        let degenerate = [0.0_f64, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0];
        let m = degenerate.len() - 4;
        let ctrl2 = vec![1.0; m * my];
        assert!(SurfaceTables::from_control_grid(&degenerate, &ky, &ctrl2, 0.0, 0.0).is_err());
    }
}
