use glam::{ivec2, IVec2};

/// Rectangular character map parsed from a multi-line string.
///
/// Leading blank lines and the common indentation of the text are stripped
/// so maps can be written inline in indented source code. Short lines are
/// padded with spaces up to the width of the longest line.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct AsciiMap {
    rows: Vec<Vec<char>>,
    width: i32,
}

impl AsciiMap {
    pub fn new(text: &str) -> Self {
        let lines: Vec<&str> = text
            .trim_end()
            .lines()
            .skip_while(|line| line.trim().is_empty())
            .map(str::trim_end)
            .collect();

        let x_skip = lines
            .iter()
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
            .min()
            .unwrap_or(0);

        let rows: Vec<Vec<char>> = lines
            .iter()
            .map(|line| line.chars().skip(x_skip).collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as i32;

        AsciiMap { rows, width }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.rows.len() as i32
    }

    /// Character at position, space for padding or out of bounds positions.
    pub fn get(&self, p: impl Into<IVec2>) -> char {
        let p = p.into();
        if p.x < 0 || p.y < 0 {
            return ' ';
        }
        self.rows
            .get(p.y as usize)
            .and_then(|row| row.get(p.x as usize))
            .copied()
            .unwrap_or(' ')
    }

    /// Iterate every cell of the map in row-major order, padding included.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, char)> + '_ {
        (0..self.height()).flat_map(move |y| {
            (0..self.width).map(move |x| (ivec2(x, y), self.get([x, y])))
        })
    }

    /// Positions of every occurrence of a character.
    pub fn find(&self, c: char) -> impl Iterator<Item = IVec2> + '_ {
        self.iter().filter(move |&(_, a)| a == c).map(|(p, _)| p)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn indented_map() {
        let map = AsciiMap::new(
            "
            #####
            #.@.#
            #..
            #####",
        );

        assert_eq!(map.width(), 5);
        assert_eq!(map.height(), 4);
        assert_eq!(map.get([2, 1]), '@');
        assert_eq!(map.get([4, 2]), ' ');
        assert_eq!(map.get([-1, 0]), ' ');
        assert_eq!(map.find('@').collect::<Vec<_>>(), vec![ivec2(2, 1)]);
        assert_eq!(map.iter().count(), 20);
    }

    #[test]
    fn empty_map() {
        let map = AsciiMap::new("\n   \n");
        assert_eq!(map.width(), 0);
        assert_eq!(map.height(), 0);
        assert_eq!(map.iter().count(), 0);
    }
}
