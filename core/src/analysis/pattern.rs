use alloc::string::{String, ToString};
use core::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Symbolic state of one neighbor inside a [`Pattern`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Token {
    /// Revealed mine, only seen after a loss.
    Mine,
    /// Revealed safe cell with its adjacent-mine count.
    Count(u8),
    Flag,
    Unknown,
}

impl Token {
    pub const fn of(cell: Cell) -> Self {
        if cell.is_revealed {
            if cell.is_mine {
                Self::Mine
            } else {
                Self::Count(cell.adjacent_mines)
            }
        } else if cell.is_flagged {
            Self::Flag
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mine => f.write_str("M"),
            Self::Count(count) => write!(f, "{count}"),
            Self::Flag => f.write_str("F"),
            Self::Unknown => f.write_str("U"),
        }
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.to_string()
    }
}

impl TryFrom<&str> for Token {
    type Error = GameError;

    fn try_from(symbol: &str) -> Result<Self> {
        let mut chars = symbol.chars();
        let (Some(first), None) = (chars.next(), chars.next()) else {
            return Err(GameError::TokenLength(symbol.chars().count()));
        };
        match first {
            'M' => Ok(Self::Mine),
            'F' => Ok(Self::Flag),
            'U' => Ok(Self::Unknown),
            '0'..='8' => Ok(Self::Count(first as u8 - b'0')),
            other => Err(GameError::UnknownSymbol(other)),
        }
    }
}

impl TryFrom<String> for Token {
    type Error = GameError;

    fn try_from(symbol: String) -> Result<Self> {
        Self::try_from(symbol.as_str())
    }
}

/// Canonical encoding of a cell's neighborhood, one token per in-bounds
/// neighbor in row-major order. Corner cells give 3 tokens, edges 5, interior 8.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern(SmallVec<[Token; 8]>);

impl Pattern {
    pub const MAX_LEN: usize = 8;

    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Token> for Pattern {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        f.write_str("]")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NeighborEntry {
    pub coords: Coord2,
    pub offset: Offset,
}

/// Neighbor table produced alongside a [`Pattern`], parallel to its tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Neighborhood {
    pub center: Coord2,
    pub entries: SmallVec<[NeighborEntry; 8]>,
}

impl Neighborhood {
    /// Offset of `target` relative to the center; `(0, 0)` for the center
    /// itself or for cells outside the neighborhood.
    pub fn offset_of(&self, target: Coord2) -> Offset {
        self.entries
            .iter()
            .find(|entry| entry.coords == target)
            .map_or((0, 0), |entry| entry.offset)
    }
}

/// Encodes the neighborhood of `coords`. The cell itself need not be revealed.
pub fn extract(board: &BoardSnapshot, coords: Coord2) -> (Pattern, Neighborhood) {
    let entries: SmallVec<[NeighborEntry; 8]> = board
        .iter_neighbors(coords)
        .with_offsets()
        .map(|(coords, offset)| NeighborEntry { coords, offset })
        .collect();
    let pattern = entries
        .iter()
        .map(|entry| Token::of(board.cell(entry.coords)))
        .collect();

    (
        pattern,
        Neighborhood {
            center: coords,
            entries,
        },
    )
}
