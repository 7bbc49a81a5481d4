use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::parse_util;

/// Rules of Conway's Game of Life.
pub const B3S23: RuleSet = RuleSet::new(0b1000, 0b1100);

/// One bit for each neighbor count from 0 to 8.
const NEIGHBOR_COUNTS: u16 = 0x1FF;

/// Bit offset of the birth mask.
const BIRTHS_AT: u32 = 16;

/// A birth/survival rule for two-state cells counting their 8 Moore neighbors, such as `B3/S23`.
///
/// [`RuleSet::next_state`] decides a cell's fate from its neighbor count. Both sets are 9-bit masks
/// packed in one word, births from bit 16 and survivals from bit 0, where bit `n` admits a count of
/// `n`:
///
/// ```notrust
/// B3/S23:  births 0_0000_1000  survivals 0_0000_1100
/// B36/S23: births 0_0100_1000  survivals 0_0000_1100
/// ```
///
/// See: https://conwaylife.com/wiki/Rulestring
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleSet {
    rule: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        B3S23
    }
}

impl RuleSet {
    /// Rule from a birth mask and a survival mask, where bit `n` admits a neighbor count of `n`.
    /// Bits for counts above 8 are dropped.
    pub const fn new(births: u16, survivals: u16) -> Self {
        let births = (births & NEIGHBOR_COUNTS) as u32;
        let survivals = (survivals & NEIGHBOR_COUNTS) as u32;

        Self {
            rule: births << BIRTHS_AT | survivals,
        }
    }

    pub fn births(&self) -> u16 {
        (self.rule >> BIRTHS_AT) as u16 & NEIGHBOR_COUNTS
    }

    pub fn survivals(&self) -> u16 {
        self.rule as u16 & NEIGHBOR_COUNTS
    }

    /// Whether a dead cell with `neighbors` live neighbors comes to life.
    pub fn is_birth(&self, neighbors: u8) -> bool {
        neighbors <= 8 && self.births() & (1 << neighbors) != 0
    }

    /// Whether a live cell with `neighbors` live neighbors stays alive.
    pub fn is_survival(&self, neighbors: u8) -> bool {
        neighbors <= 8 && self.survivals() & (1 << neighbors) != 0
    }

    /// State of a cell in the next generation.
    pub fn next_state(&self, alive: bool, neighbors: u8) -> bool {
        if alive {
            self.is_survival(neighbors)
        } else {
            self.is_birth(neighbors)
        }
    }
}

/// Formats as `B3/S23`.
impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn digits(f: &mut fmt::Formatter<'_>, set: u16) -> fmt::Result {
            for n in 0..=8 {
                if set & (1 << n) != 0 {
                    write!(f, "{n}")?;
                }
            }

            Ok(())
        }

        f.write_str("B")?;
        digits(f, self.births())?;
        f.write_str("/S")?;
        digits(f, self.survivals())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("Expected '{exp}' in rule")]
    Expected { exp: char },

    #[error("Invalid neighbor count '{got}', expected a digit from 0 to 8")]
    InvalidCount { got: char },

    #[error("Unexpected input after rule: \"{rest}\"")]
    Trailing { rest: String },
}

/// Parses `B3/S23`, `b3s23` and friends. The slash is optional.
impl FromStr for RuleSet {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (set, rest) = parse_rule(s.trim().as_bytes())?;

        if !rest.is_empty() {
            return Err(RuleError::Trailing {
                rest: String::from_utf8_lossy(rest).to_string(),
            });
        }

        Ok(set)
    }
}

// Parse rules that look like b3/s23
pub(crate) fn parse_rule(bytes: &[u8]) -> Result<(RuleSet, &[u8]), RuleError> {
    let (Some(b'b' | b'B'), bytes) = parse_util::take_1(bytes) else {
        return Err(RuleError::Expected { exp: 'B' });
    };

    let (b, bytes) = parse_util::take_digits(bytes);
    let bytes = parse_util::expect(b'/', bytes).unwrap_or(bytes);

    let (Some(b's' | b'S'), bytes) = parse_util::take_1(bytes) else {
        return Err(RuleError::Expected { exp: 'S' });
    };

    let (s, bytes) = parse_util::take_digits(bytes);

    Ok((RuleSet::new(bytes_to_num(b)?, bytes_to_num(s)?), bytes))
}

// Parse rules that look like 23/3. Survivals come first in this notation, which is what RLE #r
// comment lines use.
pub(crate) fn parse_nameless_rule(bytes: &[u8]) -> Result<(RuleSet, &[u8]), RuleError> {
    let (s, bytes) = parse_util::take_digits(bytes);

    let bytes =
        parse_util::expect(b'/', bytes).map_err(|_| RuleError::Expected { exp: '/' })?;

    let (b, bytes) = parse_util::take_digits(bytes);

    Ok((RuleSet::new(bytes_to_num(b)?, bytes_to_num(s)?), bytes))
}

/// Convert the human readable birth/survival number to a packed bit representation
fn bytes_to_num(bytes: &[u8]) -> Result<u16, RuleError> {
    let mut n = 0;

    for &b in bytes {
        if !(b'0'..=b'8').contains(&b) {
            return Err(RuleError::InvalidCount { got: b as char });
        }

        n |= 1 << (b - b'0');
    }

    Ok(n)
}
