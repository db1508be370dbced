//! Tensor-product blending: contraction of two one-dimensional basis
//! vectors against a local window of a row-major control grid.

use num_traits::Float;

/// Contract `x_basis` and `y_basis` against the control window anchored at
/// `(ix, iy)` and extending backward, producing the blended scalar
///
/// ```text
/// S = sum over k1, k2 of
///         ctrl[(ix - k1) * stride + iy - k2] * x_basis[k1] * y_basis[k2]
/// ```
///
/// `stride` is the row stride of `ctrl`. Callers guarantee
/// `ix >= x_basis.len() - 1` and `iy >= y_basis.len() - 1` so the window
/// does not extend past the start of the grid; [`crate::surface`] does so
/// through construction-time validation and span clamping.
///
/// The basis lengths in use are at most 4, and are known at each call
/// site, so the compiler flattens the loop pair per shape; there is no
/// need for hand-specialized fixed-shape variants.
#[inline]
pub fn blend<T: Float>(
    x_basis: &[T],
    y_basis: &[T],
    ix: usize,
    iy: usize,
    ctrl: &[T],
    stride: usize,
) -> T {
    let mut acc = T::zero();
    for k1 in 0..x_basis.len() {
        let xb = x_basis[k1];
        let row = (ix - k1) * stride;
        for k2 in 0..y_basis.len() {
            acc = acc + ctrl[row + iy - k2] * xb * y_basis[k2];
        }
    }
    acc
}
