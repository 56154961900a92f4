use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};

/// 8 directions, clock face order.
pub const DIR_8: [IVec2; 8] = [
    IVec2::from_array([0, -1]),
    IVec2::from_array([1, -1]),
    IVec2::from_array([1, 0]),
    IVec2::from_array([1, 1]),
    IVec2::from_array([0, 1]),
    IVec2::from_array([-1, 1]),
    IVec2::from_array([-1, 0]),
    IVec2::from_array([-1, -1]),
];

/// 4 directions, clock face order.
pub const DIR_4: [IVec2; 4] = [
    IVec2::from_array([0, -1]),
    IVec2::from_array([1, 0]),
    IVec2::from_array([0, 1]),
    IVec2::from_array([-1, 0]),
];

pub trait VecExt: Sized + Default {
    /// Absolute size of vector in taxicab metric.
    fn taxi_len(&self) -> i32;

    /// Absolute size of vector in chessboard metric.
    fn king_len(&self) -> i32;

    /// Vec points to an adjacent cell, left, right, up or down.
    fn is_adjacent(&self) -> bool {
        self.taxi_len() == 1
    }

    /// Vec points to one of the eight cells surrounding the origin.
    fn is_touching(&self) -> bool {
        self.king_len() == 1
    }

    /// Tiebreaker method: Whether this position prefers horizontal 4-dirs.
    fn prefer_horizontals_here(&self) -> bool;

    /// Preferred cardinal direction vector pointing towards the other point.
    fn dir4_towards(&self, other: &Self) -> Self;

    fn to_dir4(&self) -> Self {
        Self::default().dir4_towards(self)
    }
}

impl VecExt for IVec2 {
    fn taxi_len(&self) -> i32 {
        self[0].abs() + self[1].abs()
    }

    fn king_len(&self) -> i32 {
        self[0].abs().max(self[1].abs())
    }

    fn prefer_horizontals_here(&self) -> bool {
        // Alternate the tiebreak by chessboard square color so that repeated
        // single steps towards a diagonal target produce a diagonal path.
        (self[0] + self[1]).rem_euclid(2) == 0
    }

    fn dir4_towards(&self, other: &Self) -> Self {
        let (dx, dy) = (other[0] - self[0], other[1] - self[1]);
        let (adx, ady) = (dx.abs(), dy.abs());

        #[allow(clippy::if_same_then_else)]
        if ady > adx {
            ivec2(0, dy.signum())
        } else if adx > ady {
            ivec2(dx.signum(), 0)
        } else if self.prefer_horizontals_here() {
            ivec2(dx.signum(), 0)
        } else {
            ivec2(0, dy.signum())
        }
    }
}

/// Axis-aligned integer rectangle, `min` inclusive, `min + dim` exclusive.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Hash,
    Debug,
    Serialize,
    Deserialize,
)]
pub struct Rect {
    pub min: IVec2,
    pub dim: IVec2,
}

impl Rect {
    pub fn new(min: impl Into<IVec2>, dim: impl Into<IVec2>) -> Self {
        let (min, dim) = (min.into(), dim.into());
        Rect {
            min,
            dim: dim.max(IVec2::ZERO),
        }
    }

    /// Rectangle at origin with the given size.
    pub fn sized(dim: impl Into<IVec2>) -> Self {
        Rect::new(IVec2::ZERO, dim)
    }

    pub fn max(&self) -> IVec2 {
        self.min + self.dim
    }

    pub fn width(&self) -> i32 {
        self.dim.x
    }

    pub fn height(&self) -> i32 {
        self.dim.y
    }

    pub fn area(&self) -> i32 {
        self.dim.x * self.dim.y
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    pub fn center(&self) -> IVec2 {
        self.min + self.dim / 2
    }

    pub fn contains(&self, p: impl Into<IVec2>) -> bool {
        let p = p.into();
        p.cmpge(self.min).all() && p.cmplt(self.max()).all()
    }

    pub fn contains_other(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.min.cmpge(self.min).all()
                && other.max().cmple(self.max()).all())
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.cmplt(other.max()).all()
            && other.min.cmplt(self.max()).all()
    }

    /// Grow the rectangle by `amount` cells on every side. Negative amounts
    /// shrink it, never past zero size.
    pub fn grow(&self, amount: i32) -> Self {
        Rect::new(
            self.min - IVec2::splat(amount),
            self.dim + IVec2::splat(2 * amount),
        )
    }

    /// Whether the point lies on the outermost ring of cells of the
    /// rectangle.
    pub fn is_edge(&self, p: impl Into<IVec2>) -> bool {
        let p = p.into();
        self.contains(p) && !self.grow(-1).contains(p)
    }

    /// Iterate all points in the rectangle in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = IVec2> {
        let Rect { min, dim } = *self;
        (0..dim.y).flat_map(move |y| (0..dim.x).map(move |x| min + ivec2(x, y)))
    }
}

impl IntoIterator for Rect {
    type Item = IVec2;
    type IntoIter = Box<dyn Iterator<Item = IVec2>>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl std::ops::Add<IVec2> for Rect {
    type Output = Rect;

    fn add(self, rhs: IVec2) -> Self::Output {
        Rect {
            min: self.min + rhs,
            dim: self.dim,
        }
    }
}
