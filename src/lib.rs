//! Bicubic tensor-product B-spline surface evaluation from precomputed
//! control tables, with first- and second-order partial derivatives.
//!
//! A surface is a bundle of knot vectors and row-major control grids, one
//! grid per output quantity. Evaluation locates the knot span containing
//! the query point on each axis (bisection), builds the non-zero basis
//! function values there (the triangular Cox-de Boor recurrence), and
//! contracts the two basis vectors against a small control window. Each
//! call touches at most a 4x4 window of each grid, allocates nothing, and
//! runs in bounded time, so tables fitted offline (e.g. to a cost or
//! value function of two state variables) can be queried in an inner loop
//! in place of a full re-solve.
//!
//! Evaluation comes in three escalating levels: [`SplineSurface::value`],
//! [`SplineSurface::gradient`] (value plus first partials), and
//! [`SplineSurface::curvature`] (all six outputs, ordered
//! `[value, d/dx, d/dy, d2/dx2, d2/dy2, d2/dxdy]`). With the `std`
//! feature, [`SurfaceTables::from_control_grid`] derives the five
//! derivative tables a surface needs from the primary control grid alone.
//!
//! # Example
//! ```rust
//! use bispline::utils::clamped_knots;
//! use bispline::SurfaceTables;
//!
//! // Cubic clamped knot vectors over [0, 2] x [0, 3]
//! let kx = clamped_knots(0.0_f64, 2.0, 2, 3);
//! let ky = clamped_knots(0.0_f64, 3.0, 3, 3);
//!
//! // A flat control net: the surface holds this value everywhere inside
//! let ctrl = vec![0.5; (kx.len() - 4) * (ky.len() - 4)];
//!
//! let tables = SurfaceTables::from_control_grid(&kx, &ky, &ctrl, 0.0, 0.0).unwrap();
//! let surf = tables.surface().unwrap();
//!
//! let out = surf.curvature(1.2, 2.4);
//! assert!((out[0] - 0.5).abs() < 1e-12);
//! (1..6).for_each(|k| assert!(out[k].abs() < 1e-12));
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
// These "needless" range loops are a significant speedup
#![allow(clippy::needless_range_loop)]

pub mod basis;
pub mod blend;

pub mod surface;
pub use surface::{SplineSurface, SurfaceAxis, SurfaceGrids};

#[cfg(feature = "std")]
pub mod derive;
#[cfg(feature = "std")]
pub use derive::SurfaceTables;

#[cfg(feature = "std")]
pub mod utils;

#[cfg(all(test, feature = "std"))]
pub(crate) mod testing;
