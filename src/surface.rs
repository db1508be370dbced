//! Bicubic B-spline surface evaluation from precomputed control tables.
//!
//! A [`SplineSurface`] bundles everything one surface needs: per-axis
//! knot vectors (the primary order-3 vector plus order-reduced vectors
//! backing the derivative bases), the six row-major control grids, and
//! the coordinate shifts applied before span lookup. The bundle is
//! validated once at construction and is immutable afterward, so any
//! number of surfaces can coexist and be evaluated concurrently; every
//! evaluation call is pure, allocation-free, and completes in a fixed
//! number of operations plus an O(log n) span search per knot vector.
//!
//! Evaluation comes in three escalating levels, each a strict superset of
//! the previous: [`SplineSurface::value`], [`SplineSurface::gradient`],
//! and [`SplineSurface::curvature`]. Spans and basis vectors computed at
//! a lower level are reused unmodified by the higher ones.

use num_traits::Float;

use crate::basis::{basis_funcs, find_span};
use crate::blend::blend;

/// Spline order of the primary surface on each axis. First- and
/// second-derivative quantities use bases of order `ORDER - 1` and
/// `ORDER - 2`.
pub(crate) const ORDER: usize = 3;

/// One parametric direction of a surface: the primary order-3 knot
/// vector, the order-reduced vectors backing the first- and
/// second-derivative bases, and the offset subtracted from query
/// coordinates before span lookup (control tables are defined over
/// non-negative local coordinates).
#[derive(Clone, Copy)]
pub struct SurfaceAxis<'a, T> {
    /// Primary knot vector, order 3
    pub knots: &'a [T],
    /// First-derivative knot vector, order 2
    pub dknots: &'a [T],
    /// Second-derivative knot vector, order 1
    pub d2knots: &'a [T],
    /// Offset subtracted from query coordinates on this axis
    pub shift: T,
}

/// The six row-major control grids of a surface, one per output quantity.
///
/// Each grid pairs with the knot vectors of matching order per axis:
/// `value` is order (3, 3), `ddx` (2, 3), `ddy` (3, 2), `d2dx2` (1, 3),
/// `d2dy2` (3, 1), and `d2dxdy` (2, 2). Rows run along x, columns along
/// y, so a grid's row stride is its y-direction basis count.
#[derive(Clone, Copy)]
pub struct SurfaceGrids<'a, T> {
    pub value: &'a [T],
    pub ddx: &'a [T],
    pub ddy: &'a [T],
    pub d2dx2: &'a [T],
    pub d2dy2: &'a [T],
    pub d2dxdy: &'a [T],
}

/// Check that a knot vector is usable at the given order, returning the
/// number of basis functions it supports.
pub(crate) fn basis_count<T: Float>(knots: &[T], order: usize) -> Result<usize, &'static str> {
    if knots.len() < 2 * (order + 1) {
        return Err("Knot vector too short");
    }
    if knots.windows(2).any(|w| w[1] < w[0]) {
        return Err("Knot vectors must be non-decreasing");
    }
    Ok(knots.len() - order - 1)
}

/// Span lookup restricted to spans with a full `(order + 1)`-wide control
/// window behind them. In-domain queries on a clamped knot vector land in
/// this range already; saturated out-of-domain queries evaluate the edge
/// window's polynomial extension instead of indexing past the grid.
#[inline]
fn window_span<T: Float>(t: T, knots: &[T], order: usize) -> usize {
    find_span(t, knots).clamp(order, knots.len() - order - 2)
}

impl<'a, T: Float> SurfaceAxis<'a, T> {
    /// Span and basis vector on the primary order-3 knot vector
    #[inline]
    fn primary(&self, t: T) -> (usize, [T; 4]) {
        let i = window_span(t, self.knots, ORDER);
        let mut b = [T::zero(); 4];
        basis_funcs(&mut b, t, ORDER, self.knots, i);
        (i, b)
    }

    /// Span and basis vector on the order-2 first-derivative vector
    #[inline]
    fn reduced(&self, t: T) -> (usize, [T; 3]) {
        let i = window_span(t, self.dknots, ORDER - 1);
        let mut b = [T::zero(); 3];
        basis_funcs(&mut b, t, ORDER - 1, self.dknots, i);
        (i, b)
    }

    /// Span and basis vector on the order-1 second-derivative vector
    #[inline]
    fn doubly_reduced(&self, t: T) -> (usize, [T; 2]) {
        let i = window_span(t, self.d2knots, ORDER - 2);
        let mut b = [T::zero(); 2];
        basis_funcs(&mut b, t, ORDER - 2, self.d2knots, i);
        (i, b)
    }
}

/// A validated bicubic B-spline surface over precomputed control tables.
///
/// Holds borrowed references to the knot vectors and grids; the data is
/// read-only for the lifetime of the surface and across all calls, so
/// evaluation is safe to issue from multiple threads with no
/// coordination.
pub struct SplineSurface<'a, T: Float> {
    x: SurfaceAxis<'a, T>,
    y: SurfaceAxis<'a, T>,
    grids: SurfaceGrids<'a, T>,

    /// Basis counts of the y-direction knot vectors, which are the row
    /// strides of the control grids
    ny: usize,
    dny: usize,
    d2ny: usize,
}

impl<'a, T: Float> SplineSurface<'a, T> {
    /// Build a surface from its knot vectors and control grids, validating
    /// the bundle once.
    ///
    /// # Errors
    /// * If any knot vector is non-monotonic or too short for its order
    /// * If any control grid's size does not match the basis counts of
    ///   its two knot vectors
    pub fn new(
        x: SurfaceAxis<'a, T>,
        y: SurfaceAxis<'a, T>,
        grids: SurfaceGrids<'a, T>,
    ) -> Result<Self, &'static str> {
        let nx = basis_count(x.knots, ORDER)?;
        let dnx = basis_count(x.dknots, ORDER - 1)?;
        let d2nx = basis_count(x.d2knots, ORDER - 2)?;
        let ny = basis_count(y.knots, ORDER)?;
        let dny = basis_count(y.dknots, ORDER - 1)?;
        let d2ny = basis_count(y.d2knots, ORDER - 2)?;

        // Each grid must exactly fill the tensor product of its two basis
        // sets so that every reachable control window stays in bounds
        let consistent = grids.value.len() == nx * ny
            && grids.ddx.len() == dnx * ny
            && grids.ddy.len() == nx * dny
            && grids.d2dx2.len() == d2nx * ny
            && grids.d2dy2.len() == nx * d2ny
            && grids.d2dxdy.len() == dnx * dny;
        if !consistent {
            return Err("Dimension mismatch");
        }

        Ok(Self {
            x,
            y,
            grids,
            ny,
            dny,
            d2ny,
        })
    }

    /// Surface value at `(x, y)`.
    #[inline]
    pub fn value(&self, x: T, y: T) -> T {
        let (ix, bx) = self.x.primary(x - self.x.shift);
        let (iy, by) = self.y.primary(y - self.y.shift);
        blend(&bx, &by, ix, iy, self.grids.value, self.ny)
    }

    /// Surface value and first partials at `(x, y)`, ordered
    /// `[value, d/dx, d/dy]`.
    #[inline]
    pub fn gradient(&self, x: T, y: T) -> [T; 3] {
        let x = x - self.x.shift;
        let y = y - self.y.shift;

        let (ix, bx) = self.x.primary(x);
        let (iy, by) = self.y.primary(y);
        let (ixd, bxd) = self.x.reduced(x);
        let (iyd, byd) = self.y.reduced(y);

        [
            blend(&bx, &by, ix, iy, self.grids.value, self.ny),
            blend(&bxd, &by, ixd, iy, self.grids.ddx, self.ny),
            blend(&bx, &byd, ix, iyd, self.grids.ddy, self.dny),
        ]
    }

    /// Surface value with first and second partials at `(x, y)`, ordered
    /// `[value, d/dx, d/dy, d2/dx2, d2/dy2, d2/dxdy]`.
    ///
    /// The order-3 and order-2 spans and bases are each computed once and
    /// shared between the value, first-derivative, and mixed-curvature
    /// blends.
    #[inline]
    pub fn curvature(&self, x: T, y: T) -> [T; 6] {
        let x = x - self.x.shift;
        let y = y - self.y.shift;

        let (ix, bx) = self.x.primary(x);
        let (iy, by) = self.y.primary(y);
        let (ixd, bxd) = self.x.reduced(x);
        let (iyd, byd) = self.y.reduced(y);
        let (ixdd, bxdd) = self.x.doubly_reduced(x);
        let (iydd, bydd) = self.y.doubly_reduced(y);

        [
            blend(&bx, &by, ix, iy, self.grids.value, self.ny),
            blend(&bxd, &by, ixd, iy, self.grids.ddx, self.ny),
            blend(&bx, &byd, ix, iyd, self.grids.ddy, self.dny),
            blend(&bxdd, &by, ixdd, iy, self.grids.d2dx2, self.ny),
            blend(&bx, &bydd, ix, iydd, self.grids.d2dy2, self.d2ny),
            blend(&bxd, &byd, ixd, iyd, self.grids.d2dxdy, self.dny),
        ]
    }

    /// Evaluate value and all derivatives on a contiguous list of
    /// observation points, writing 6 outputs per point.
    ///
    /// # Errors
    /// * If `x` and `y` lengths differ, or `out` is not 6 entries per
    ///   observation point
    pub fn eval(&self, x: &[T], y: &[T], out: &mut [T]) -> Result<(), &'static str> {
        if x.len() != y.len() || out.len() != 6 * x.len() {
            return Err("Dimension mismatch");
        }
        for i in 0..x.len() {
            out[6 * i..6 * i + 6].copy_from_slice(&self.curvature(x[i], y[i]));
        }
        Ok(())
    }

    /// Evaluate on a list of observation points, allocating for the
    /// output for convenience.
    ///
    /// # Errors
    /// * If `x` and `y` lengths differ
    #[cfg(feature = "std")]
    pub fn eval_alloc(&self, x: &[T], y: &[T]) -> Result<Vec<T>, &'static str> {
        let mut out = vec![T::zero(); 6 * x.len()];
        self.eval(x, y, &mut out)?;
        Ok(out)
    }
}

impl SplineSurface<'_, f32> {
    /// Host-boundary form of [`SplineSurface::curvature`]: double
    /// precision at the call boundary, single precision arithmetic
    /// inside.
    #[inline]
    pub fn curvature_f64(&self, x: f64, y: f64) -> [f64; 6] {
        self.curvature(x as f32, y as f32).map(f64::from)
    }
}
