//! Climbing grade parsing and ranking.
//!
//! Two grade families are recognized:
//!
//! | Family  | Examples                                   |
//! |---------|--------------------------------------------|
//! | Route   | `5.9`, `5.10a`, `5.10a/b`, `5.11+`, `5.8-` |
//! | Boulder | `V-easy`, `V0`, `V3+`, `V4-5`              |
//!
//! Grades of one family form a total order. Grades of different families
//! are not comparable: [`Grade`] only implements `PartialOrd`, and
//! [`Grade::try_cmp`] reports a [`GradeError::FamilyMismatch`].
//!
//! Within a route grade, the sub-grade ladder is
//! `a < a/b = "-" < b < b/c = plain < c < c/d = "+" < d`, so
//! `5.10a < 5.10b < 5.10+ < 5.11a` and `5.10- < 5.10 < 5.10+`.
//!
//! # Example
//!
//! ```rust
//! use sent::parse_grade;
//!
//! let easy = parse_grade("5.10a").unwrap();
//! let hard = parse_grade("5.10+").unwrap();
//! assert!(easy < hard);
//!
//! let boulder = parse_grade("V3").unwrap();
//! assert!(easy.partial_cmp(&boulder).is_none());
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{GradeError, GradeResult};

static ROUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^5\.(\d{1,2})(?:([a-dA-D])(?:/([a-dA-D]))?)?([+-])?$")
        .expect("valid route regex")
});

static BOULDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[vV](?:-([eE][aA][sS][yY])|(\d{1,2})(?:-(\d{1,2})|([+-]))?)$")
        .expect("valid boulder regex")
});

/// Protection and aid ratings that may trail a grade (`5.10a PG13`, `5.9 C1`).
static QUALIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:G|PG|PG-?13|R|X|[AC][0-5]\+?)$").expect("valid qualifier regex")
});

// =============================================================================
// Shared pieces
// =============================================================================

/// Grade family, used to bucket comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeFamily {
    Route,
    Boulder,
}

/// Trailing `+` / `-` on a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Minus,
    Plus,
}

impl Modifier {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "-" => Some(Self::Minus),
            "+" => Some(Self::Plus),
            _ => None,
        }
    }

    fn symbol(self) -> char {
        match self {
            Self::Minus => '-',
            Self::Plus => '+',
        }
    }
}

/// Letter suffix of a YDS grade from 5.10 up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Letter {
    A,
    B,
    C,
    D,
}

impl Letter {
    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'a' => Some(Self::A),
            'b' => Some(Self::B),
            'c' => Some(Self::C),
            'd' => Some(Self::D),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Self::A => 'a',
            Self::B => 'b',
            Self::C => 'c',
            Self::D => 'd',
        }
    }

    /// Position on the a..d ladder, with room for slash grades in between.
    fn position(self) -> u8 {
        match self {
            Self::A => 2,
            Self::B => 4,
            Self::C => 6,
            Self::D => 8,
        }
    }
}

// =============================================================================
// Route grades
// =============================================================================

/// A Yosemite Decimal System grade such as `5.10a/b` or `5.9+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteGrade {
    number: u8,
    letter: Option<Letter>,
    slash: Option<Letter>,
    modifier: Option<Modifier>,
}

impl RouteGrade {
    /// `(number, ladder position, modifier rank, form)`.
    ///
    /// Injective over valid grades, so ordering by it agrees with `Eq`.
    fn sort_key(&self) -> (u8, u8, u8, u8) {
        match self.letter {
            None => {
                let position = match self.modifier {
                    Some(Modifier::Minus) => 3,
                    None => 5,
                    Some(Modifier::Plus) => 7,
                };
                (self.number, position, 1, 0)
            }
            Some(letter) => {
                // Slash letters are always adjacent, so this lands on the odd rung.
                let position = match self.slash {
                    Some(upper) => (letter.position() + upper.position()) / 2,
                    None => letter.position(),
                };
                let rank = match self.modifier {
                    Some(Modifier::Minus) => 0,
                    None => 1,
                    Some(Modifier::Plus) => 2,
                };
                (self.number, position, rank, 1)
            }
        }
    }
}

impl Ord for RouteGrade {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for RouteGrade {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RouteGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "5.{}", self.number)?;
        if let Some(letter) = self.letter {
            write!(f, "{}", letter.as_char())?;
        }
        if let Some(slash) = self.slash {
            write!(f, "/{}", slash.as_char())?;
        }
        if let Some(modifier) = self.modifier {
            write!(f, "{}", modifier.symbol())?;
        }
        Ok(())
    }
}

// =============================================================================
// Boulder grades
// =============================================================================

/// What follows the number of a V grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum BoulderStep {
    Minus,
    Plain,
    Plus,
    /// `V3-4`: upper end of a split grade.
    Range(u8),
}

/// A Hueco V-scale grade such as `V5`, `V3+`, `V4-5` or `V-easy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoulderGrade {
    /// `None` for `V-easy`, which ranks below `V0`.
    level: Option<u8>,
    step: BoulderStep,
}

impl fmt::Display for BoulderGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(level) = self.level else {
            return f.write_str("V-easy");
        };
        match self.step {
            BoulderStep::Minus => write!(f, "V{}-", level),
            BoulderStep::Plain => write!(f, "V{}", level),
            BoulderStep::Plus => write!(f, "V{}+", level),
            BoulderStep::Range(upper) => write!(f, "V{}-{}", level, upper),
        }
    }
}

// =============================================================================
// Grade
// =============================================================================

/// A parsed grade from either family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    Route(RouteGrade),
    Boulder(BoulderGrade),
}

impl Grade {
    pub fn family(&self) -> GradeFamily {
        match self {
            Grade::Route(_) => GradeFamily::Route,
            Grade::Boulder(_) => GradeFamily::Boulder,
        }
    }

    /// Compare two grades, failing when they belong to different families.
    pub fn try_cmp(&self, other: &Grade) -> GradeResult<Ordering> {
        self.partial_cmp(other)
            .ok_or_else(|| GradeError::FamilyMismatch {
                left: self.to_string(),
                right: other.to_string(),
            })
    }
}

impl PartialOrd for Grade {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Grade::Route(a), Grade::Route(b)) => Some(a.cmp(b)),
            (Grade::Boulder(a), Grade::Boulder(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Route(g) => g.fmt(f),
            Grade::Boulder(g) => g.fmt(f),
        }
    }
}

impl FromStr for Grade {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_grade(s)
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_grade(&text).map_err(serde::de::Error::custom)
    }
}

/// Parse a grade string into a comparable [`Grade`].
///
/// Surrounding whitespace and trailing protection/aid ratings
/// (`PG13`, `R`, `X`, `C1`, ...) are ignored. Anything outside the
/// vocabulary fails with [`GradeError::Malformed`].
pub fn parse_grade(text: &str) -> GradeResult<Grade> {
    let malformed = || GradeError::Malformed(text.to_string());

    let mut tokens = text.split_whitespace();
    let head = tokens.next().ok_or_else(malformed)?;
    if !tokens.all(|t| QUALIFIER_RE.is_match(t)) {
        return Err(malformed());
    }

    if let Some(caps) = ROUTE_RE.captures(head) {
        let number = caps[1].parse::<u8>().map_err(|_| malformed())?;
        let letter_at = |i: usize| {
            caps.get(i)
                .and_then(|m| m.as_str().chars().next())
                .and_then(Letter::from_char)
        };
        let letter = letter_at(2);
        let slash = letter_at(3);
        let modifier = caps.get(4).and_then(|m| Modifier::from_symbol(m.as_str()));

        // Only adjacent letters make a slash grade.
        if let (Some(lower), Some(upper)) = (letter, slash) {
            if upper.position() != lower.position() + 2 {
                return Err(malformed());
            }
        }

        return Ok(Grade::Route(RouteGrade {
            number,
            letter,
            slash,
            modifier,
        }));
    }

    if let Some(caps) = BOULDER_RE.captures(head) {
        if caps.get(1).is_some() {
            return Ok(Grade::Boulder(BoulderGrade {
                level: None,
                step: BoulderStep::Plain,
            }));
        }

        let level = caps[2].parse::<u8>().map_err(|_| malformed())?;
        let step = if let Some(upper) = caps.get(3) {
            let upper = upper.as_str().parse::<u8>().map_err(|_| malformed())?;
            if upper <= level {
                return Err(malformed());
            }
            BoulderStep::Range(upper)
        } else {
            match caps.get(4).and_then(|m| Modifier::from_symbol(m.as_str())) {
                Some(Modifier::Minus) => BoulderStep::Minus,
                Some(Modifier::Plus) => BoulderStep::Plus,
                None => BoulderStep::Plain,
            }
        };

        return Ok(Grade::Boulder(BoulderGrade {
            level: Some(level),
            step,
        }));
    }

    Err(malformed())
}

/// Sort grades easiest first.
///
/// All grades must share a family; a mix fails with
/// [`GradeError::FamilyMismatch`] naming the first pair that disagrees.
pub fn sort_grades(mut grades: Vec<Grade>) -> GradeResult<Vec<Grade>> {
    if let Some(first) = grades.first() {
        if let Some(odd) = grades.iter().find(|g| g.family() != first.family()) {
            return Err(GradeError::FamilyMismatch {
                left: first.to_string(),
                right: odd.to_string(),
            });
        }
    }
    grades.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Ok(grades)
}
