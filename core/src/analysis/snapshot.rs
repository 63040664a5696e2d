use core::fmt;
use core::str::FromStr;

use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Read-only view of the board the advisor reasons about.
///
/// Supplied fresh by the host before every query; nothing in here is kept in
/// sync with the live game. Deserialized snapshots are validated like ones
/// built with [`BoardSnapshot::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshot")]
pub struct BoardSnapshot {
    size: Coord2,
    cells: Array2<Cell>,
}

#[derive(Deserialize)]
struct RawSnapshot {
    size: Coord2,
    cells: Array2<Cell>,
}

impl TryFrom<RawSnapshot> for BoardSnapshot {
    type Error = GameError;

    fn try_from(raw: RawSnapshot) -> Result<Self> {
        Self::new(raw.size, raw.cells)
    }
}

/// Neighborhood arithmetic around one revealed number.
#[derive(Clone, Debug, PartialEq)]
pub struct ClueState {
    pub coords: Coord2,
    pub adjacent_mines: u8,
    pub flagged: u8,
    pub open: SmallVec<[Coord2; 8]>,
}

impl ClueState {
    /// Mines still unaccounted for by flags. Negative when over-flagged.
    pub fn remaining_mines(&self) -> i16 {
        i16::from(self.adjacent_mines) - i16::from(self.flagged)
    }
}

impl BoardSnapshot {
    pub fn new(size: Coord2, cells: Array2<Cell>) -> Result<Self> {
        let snapshot = Self { size, cells };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Builds a snapshot from cells listed row by row.
    pub fn from_cells(size: Coord2, cells: Vec<Cell>) -> Result<Self> {
        let cells = Array2::from_shape_vec(size.to_nd_index(), cells)
            .map_err(|_| GameError::InvalidBoardShape)?;
        Self::new(size, cells)
    }

    /// A board where nothing has been revealed or flagged yet.
    pub fn hidden(size: Coord2) -> Self {
        Self {
            size,
            cells: Array2::from_elem(size.to_nd_index(), Cell::HIDDEN),
        }
    }

    pub fn from_engine(engine: &PlayEngine) -> Self {
        let mut snapshot = Self::hidden(engine.size());

        for coords in iter_coords(snapshot.size) {
            snapshot.cells[coords.to_nd_index()] = engine.cell_at(coords).into();
        }
        if let Some(coords) = engine.triggered_mine() {
            snapshot.cells[coords.to_nd_index()] = Cell::MINE;
        }

        snapshot
    }

    pub fn validate(&self) -> Result<()> {
        let expected = (self.size.0 as usize, self.size.1 as usize);
        if self.cells.dim() != expected {
            return Err(GameError::InvalidBoardShape);
        }

        match self.iter_cells().find(|(_, cell)| cell.is_revealed && cell.is_flagged) {
            Some((coords, _)) => Err(GameError::RevealedAndFlagged(coords)),
            None => Ok(()),
        }
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        coords.0 < self.size.0 && coords.1 < self.size.1
    }

    pub fn cell(&self, coords: Coord2) -> Cell {
        self.cells[coords.to_nd_index()]
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size)
    }

    /// All cells in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        iter_coords(self.size).map(|coords| (coords, self.cell(coords)))
    }

    /// Cells that are neither revealed nor flagged, in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.iter_cells()
            .filter(|(_, cell)| cell.is_open())
            .map(|(coords, _)| coords)
    }

    /// Flag and open-neighbor tallies for a revealed number, `None` for any other cell.
    pub fn clue_at(&self, coords: Coord2) -> Option<ClueState> {
        let cell = self.cell(coords);
        if !cell.is_clue() {
            return None;
        }

        let mut flagged = 0;
        let mut open = SmallVec::new();
        for pos in self.iter_neighbors(coords) {
            let neighbor = self.cell(pos);
            if neighbor.is_flagged {
                flagged += 1;
            } else if !neighbor.is_revealed {
                open.push(pos);
            }
        }

        Some(ClueState {
            coords,
            adjacent_mines: cell.adjacent_mines,
            flagged,
            open,
        })
    }

    /// Every revealed number in row-major order.
    pub fn clues(&self) -> impl Iterator<Item = ClueState> + '_ {
        iter_coords(self.size).filter_map(|coords| self.clue_at(coords))
    }
}

fn iter_coords((rows, cols): Coord2) -> impl Iterator<Item = Coord2> {
    (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
}

/// Text form, one line per row: `.` hidden, `F` flag, `*` revealed mine,
/// `0`-`8` revealed number. Blank lines and surrounding whitespace are ignored.
impl FromStr for BoardSnapshot {
    type Err = GameError;

    fn from_str(text: &str) -> Result<Self> {
        let mut cells = Vec::new();
        let mut rows: usize = 0;
        let mut cols = None;

        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let before = cells.len();
            for symbol in line.chars() {
                cells.push(match symbol {
                    '.' => Cell::HIDDEN,
                    'F' | 'f' => Cell::FLAGGED,
                    '*' => Cell::MINE,
                    '0'..='8' => Cell::revealed(symbol as u8 - b'0'),
                    other => return Err(GameError::UnknownSymbol(other)),
                });
            }

            let width = cells.len() - before;
            if *cols.get_or_insert(width) != width {
                return Err(GameError::InvalidBoardShape);
            }
            rows += 1;
        }

        let rows = Coord::try_from(rows).map_err(|_| GameError::InvalidBoardShape)?;
        let cols = Coord::try_from(cols.unwrap_or(0)).map_err(|_| GameError::InvalidBoardShape)?;
        Self::from_cells((rows, cols), cells)
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            for cell in row {
                let symbol = match cell {
                    cell if cell.is_flagged => 'F',
                    cell if !cell.is_revealed => '.',
                    cell if cell.is_mine => '*',
                    cell => char::from(b'0' + cell.adjacent_mines.min(8)),
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn from_engine_maps_revealed_and_flagged_cells() {
        let layout = MineLayout::from_mine_coords((2, 2), &[(0, 0)]).unwrap();
        let mut engine = PlayEngine::new(layout);

        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 0)).unwrap();

        let board = BoardSnapshot::from_engine(&engine);

        assert_eq!(board.cell((1, 1)), Cell::revealed(1));
        assert!(board.cell((0, 0)).is_flagged);
        assert!(board.cell((0, 1)).is_open());
    }

    #[test]
    fn from_engine_shows_triggered_mine_after_loss() {
        let layout = MineLayout::from_mine_coords((2, 2), &[(0, 0)]).unwrap();
        let mut engine = PlayEngine::new(layout);
        engine.reveal((0, 0)).unwrap();

        let board = BoardSnapshot::from_engine(&engine);

        assert_eq!(board.cell((0, 0)), Cell::MINE);
    }

    #[test]
    fn validate_rejects_shape_mismatch() {
        let cells = Array2::from_elem([1, 2], Cell::HIDDEN);
        assert_eq!(
            BoardSnapshot::new((2, 2), cells),
            Err(GameError::InvalidBoardShape)
        );
    }

    #[test]
    fn validate_rejects_revealed_flag() {
        let broken = Cell {
            is_flagged: true,
            ..Cell::revealed(1)
        };
        let cells = Array2::from_elem([1, 1], broken);
        assert_eq!(
            BoardSnapshot::new((1, 1), cells),
            Err(GameError::RevealedAndFlagged((0, 0)))
        );
    }

    #[test]
    fn deserialize_validates_shape() {
        let board: BoardSnapshot = "1.\n.F".parse().unwrap();
        let mut value = serde_json::to_value(&board).unwrap();
        assert_eq!(serde_json::from_value::<BoardSnapshot>(value.clone()).unwrap(), board);

        value["size"] = serde_json::Value::from([3u8, 3u8].as_slice());
        assert!(serde_json::from_value::<BoardSnapshot>(value).is_err());
    }

    #[test]
    fn parses_and_prints_text_boards() {
        let text = "01.\n1F.\n..*\n";
        let board: BoardSnapshot = text.parse().unwrap();

        assert_eq!(board.size(), (3, 3));
        assert_eq!(board.cell((0, 1)), Cell::revealed(1));
        assert!(board.cell((1, 1)).is_flagged);
        assert_eq!(board.cell((2, 2)), Cell::MINE);
        assert_eq!(board.to_string(), text);
    }

    #[test]
    fn parse_rejects_ragged_rows_and_unknown_symbols() {
        assert_eq!(
            "..\n...".parse::<BoardSnapshot>(),
            Err(GameError::InvalidBoardShape)
        );
        assert_eq!(
            ".?".parse::<BoardSnapshot>(),
            Err(GameError::UnknownSymbol('?'))
        );
    }

    #[test]
    fn clue_state_counts_flags_and_open_neighbors() {
        let board: BoardSnapshot = "F..\n.2.\n111".parse().unwrap();
        let clue = board.clue_at((1, 1)).unwrap();

        assert_eq!(clue.flagged, 1);
        assert_eq!(clue.open.as_slice(), &[(0, 1), (0, 2), (1, 0), (1, 2)]);
        assert_eq!(clue.remaining_mines(), 1);
        assert!(board.clue_at((0, 1)).is_none());
    }
}
