use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use anyhow::bail;
use derive_more::Deref;
use rand::prelude::*;
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Construct a random number generator seeded by a hashable value.
///
/// The same seed value always produces the same generator, so anything
/// generated from it can be reproduced later from the seed alone.
pub fn srng(seed: &(impl Hash + ?Sized)) -> crate::GameRng {
    let mut h = crate::FastHasher::default();
    seed.hash(&mut h);
    crate::GameRng::seed_from_u64(h.finish())
}

/// Strings that are normalized to be case, whitespace and punctuation
/// insensitive. Use as RNG seeds so that trivial transcription errors like an
/// added space can't mess up the seed.
///
/// ```
/// # use util::{Logos, srng};
/// use rand::prelude::*;
///
/// assert_eq!(
///   srng(&Logos::new("Derelict 7")).gen_range(0..1000),
///   srng(&Logos::new("derelict7")).gen_range(0..1000));
/// ```
#[derive(
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    SerializeDisplay,
    DeserializeFromStr,
    Deref,
)]
pub struct Logos(String);

impl fmt::Display for Logos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromIterator<char> for Logos {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        const MAX_LEN: usize = 64;

        Logos(
            iter.into_iter()
                .map(|c| c.to_ascii_uppercase())
                .filter(char::is_ascii_alphanumeric)
                .take(MAX_LEN)
                .collect(),
        )
    }
}

impl Logos {
    /// Construct a new logos, stripping out punctuation, whitespace,
    /// character case and non-ASCII characters from the input.
    pub fn new(s: impl AsRef<str>) -> Self {
        s.as_ref().chars().collect()
    }

    /// Generate a random logos of `len` characters.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Logos {
        const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

impl FromStr for Logos {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            bail!("not a valid logos")
        } else {
            Ok(Logos(s.into()))
        }
    }
}

pub trait RngExt {
    fn one_chance_in(&mut self, n: usize) -> bool;
}

impl<T: Rng + ?Sized> RngExt for T {
    fn one_chance_in(&mut self, n: usize) -> bool {
        if n == 0 {
            return false;
        }
        self.gen_range(0..n) == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn normalization() {
        assert_eq!(&*Logos::new("pAss Word"), "PASSWORD");
        assert_eq!(&*Logos::new("!@#'"), "");
        assert!("abc".parse::<Logos>().is_err());
        assert_eq!("ABC9".parse::<Logos>().unwrap(), Logos::new("abc 9"));
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = srng(&Logos::new("station"));
        let mut b = srng(&Logos::new("S T A T I O N"));
        for _ in 0..16 {
            assert_eq!(a.gen_range(0..1000), b.gen_range(0..1000));
        }
    }

    #[quickcheck]
    fn sampled_logos_parses(seed: u64, len: u8) -> bool {
        let mut rng = crate::GameRng::seed_from_u64(seed);
        let logos = Logos::sample(&mut rng, len as usize % 65);
        logos.parse::<Logos>().ok() == Some(logos.clone())
    }
}
