//! Square grid geometry for shadowcasting.

/// Rational slope `num / den` of a line from the origin, `den` is always
/// positive.
///
/// Kept as an exact fraction so that tie cases at cell corners resolve the
/// same way on every platform.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct Slope {
    num: i32,
    den: i32,
}

impl Slope {
    pub const fn new(num: i32, den: i32) -> Self {
        debug_assert!(den > 0);
        Slope { num, den }
    }

    /// Slope through the near corner of the cell at `col` on a row at
    /// `depth`.
    pub const fn corner(depth: i32, col: i32) -> Self {
        Slope::new(2 * col - 1, 2 * depth)
    }
}

/// One of the four 90 degree cones around the origin, each centered on a
/// cardinal axis.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Quadrant {
    North,
    East,
    South,
    West,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] =
        [Quadrant::North, Quadrant::East, Quadrant::South, Quadrant::West];

    /// Convert quadrant-local (depth, col) into an origin-relative offset.
    pub fn transform(self, depth: i32, col: i32) -> [i32; 2] {
        match self {
            Quadrant::North => [col, -depth],
            Quadrant::South => [col, depth],
            Quadrant::East => [depth, col],
            Quadrant::West => [-depth, col],
        }
    }
}

/// Span of cells at a fixed depth inside a quadrant, bounded by two slopes.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct Row {
    pub depth: i32,
    pub start: Slope,
    pub end: Slope,
}

impl Row {
    /// The full-width first row of a quadrant.
    pub const fn first() -> Self {
        Row {
            depth: 1,
            start: Slope::new(-1, 1),
            end: Slope::new(1, 1),
        }
    }

    pub fn min_col(&self) -> i32 {
        // round_ties_up(depth * start)
        let Slope { num, den } = self.start;
        (2 * self.depth * num + den).div_euclid(2 * den)
    }

    pub fn max_col(&self) -> i32 {
        // round_ties_down(depth * end)
        let Slope { num, den } = self.end;
        -(-(2 * self.depth * num - den)).div_euclid(2 * den)
    }

    /// Whether the center of the cell lies inside the row's slope bounds.
    /// Floor cells are only revealed when this holds.
    pub fn is_symmetric(&self, col: i32) -> bool {
        col * self.start.den >= self.depth * self.start.num
            && col * self.end.den <= self.depth * self.end.num
    }

    pub fn next(&self) -> Row {
        Row {
            depth: self.depth + 1,
            ..*self
        }
    }
}
