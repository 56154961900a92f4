use std::collections::{HashSet, VecDeque};

use crate::square::{Quadrant, Row, Slope};

/// World view needed by the field of view algorithm.
///
/// All positions are offsets from the viewing origin.
pub trait Vision {
    type Vector: From<[i32; 2]>;

    /// Whether sight stops at the cell. The cell itself can still be seen.
    fn blocks_sight(&self, offset: [i32; 2]) -> bool;

    /// Whether the cell is close enough to the origin to be seen at all.
    fn in_range(&self, offset: [i32; 2]) -> bool;

    /// Greatest distance along either axis that can be in range.
    fn max_depth(&self) -> i32;
}

/// Iterator over the cells visible from the origin of a [`Vision`].
///
/// The origin cell comes first, every other visible cell is yielded
/// exactly once. Output order is fixed for a given vision.
pub struct Fov<'a, V> {
    vision: &'a V,
    rows: Vec<(Quadrant, Row)>,
    pending: VecDeque<[i32; 2]>,
    seen: HashSet<[i32; 2]>,
}

impl<'a, V: Vision> Fov<'a, V> {
    pub fn new(vision: &'a V) -> Self {
        let mut rows: Vec<_> =
            Quadrant::ALL.iter().map(|&q| (q, Row::first())).collect();
        // Stack pops from the end, keep the quadrant order stable.
        rows.reverse();

        Fov {
            vision,
            rows,
            pending: VecDeque::from([[0, 0]]),
            seen: HashSet::new(),
        }
    }

    fn reveal(&mut self, offset: [i32; 2]) {
        if self.vision.in_range(offset) {
            self.pending.push_back(offset);
        }
    }

    fn scan(&mut self, quadrant: Quadrant, mut row: Row) {
        if row.depth > self.vision.max_depth() {
            return;
        }

        let mut prev_blocks = None;
        for col in row.min_col()..=row.max_col() {
            let offset = quadrant.transform(row.depth, col);
            let blocks = self.vision.blocks_sight(offset);

            if blocks || row.is_symmetric(col) {
                self.reveal(offset);
            }

            match (prev_blocks, blocks) {
                (Some(true), false) => {
                    row.start = Slope::corner(row.depth, col);
                }
                (Some(false), true) => {
                    let mut next = row.next();
                    next.end = Slope::corner(row.depth, col);
                    self.rows.push((quadrant, next));
                }
                _ => {}
            }
            prev_blocks = Some(blocks);
        }

        if prev_blocks == Some(false) {
            self.rows.push((quadrant, row.next()));
        }
    }
}

impl<V: Vision> Iterator for Fov<'_, V> {
    type Item = V::Vector;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while let Some(offset) = self.pending.pop_front() {
                // Quadrant edges overlap along the diagonals.
                if self.seen.insert(offset) {
                    return Some(offset.into());
                }
            }

            let (quadrant, row) = self.rows.pop()?;
            self.scan(quadrant, row);
        }
    }
}
