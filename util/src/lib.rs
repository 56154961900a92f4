//! Unopinionated standalone utilities.

mod ascii_map;
pub use ascii_map::AsciiMap;

mod geom;
pub use geom::{Rect, VecExt, DIR_4, DIR_8};

mod path;
pub use path::{astar_path, dijkstra_map, flood_fill_4, within_range};

mod rng;
pub use rng::{srng, Logos, RngExt};

pub type FastHasher = rustc_hash::FxHasher;

/// Map with an efficient hash function.
pub use rustc_hash::FxHashMap as HashMap;

/// Set with an efficient hash function.
pub use rustc_hash::FxHashSet as HashSet;

/// Good default concrete rng.
///
/// Xorshift output is fixed by the seed across platforms, which keeps
/// seeded world generation reproducible.
pub type GameRng = rand_xorshift::XorShiftRng;
