//! Generic field-of-view computation.
//!
//! The algorithm is symmetric shadowcasting on a square grid: if cell B is
//! visible from cell A, A is visible from B. The caller describes the world
//! through the [`Vision`] trait in origin-relative offsets, so the crate
//! knows nothing about maps, tiles or coordinate types.

mod fov;
pub use crate::fov::{Fov, Vision};

mod square;
