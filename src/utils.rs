//! Convenience methods for constructing grids and knot vectors in a way
//! that echoes, but does not exactly match, methods common in scripting
//! languages.
use itertools::Itertools;
use num_traits::Float;

/// Generates evenly spaced values from start to stop,
/// including the endpoint.
pub fn linspace<T>(start: T, stop: T, n: usize) -> Vec<T>
where
    T: Float,
{
    let dx: T = (stop - start) / T::from(n - 1).unwrap();
    (0..n).map(|i| start + T::from(i).unwrap() * dx).collect()
}

/// Generates a meshgrid in C ordering (x0, y0, z0, x0, y0, z1, ..., x0, yn, zn)
pub fn meshgrid<T>(x: Vec<&Vec<T>>) -> Vec<Vec<T>>
where
    T: Float,
{
    x.into_iter()
        .multi_cartesian_product()
        .map(|xx| xx.iter().map(|y| **y).collect())
        .collect()
}

/// Generates an open (clamped) knot vector over `[start, stop]` with
/// `nseg` spans: `order + 1` repeated knots at each end around an evenly
/// spaced interior. Supports `nseg + order` basis functions.
pub fn clamped_knots<T>(start: T, stop: T, nseg: usize, order: usize) -> Vec<T>
where
    T: Float,
{
    let breaks = linspace(start, stop, nseg + 1);
    let mut knots = Vec::with_capacity(nseg + 2 * order + 1);
    knots.extend(std::iter::repeat(start).take(order));
    knots.extend_from_slice(&breaks);
    knots.extend(std::iter::repeat(stop).take(order));
    knots
}
