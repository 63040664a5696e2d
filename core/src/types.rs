use ndarray::Array2;

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

/// Relative position `(d_row, d_col)` of a neighbor, each component in `-1..=1`.
pub type Offset = (i8, i8);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter {
        NeighborIter::new(index, dim_to_size(self.dim()))
    }
}

/// Converts an `ndarray` shape into board size, saturating at [`Coord::MAX`].
pub(crate) fn dim_to_size((rows, cols): (usize, usize)) -> Coord2 {
    (
        rows.try_into().unwrap_or(Coord::MAX),
        cols.try_into().unwrap_or(Coord::MAX),
    )
}

/// Neighbor offsets sorted by row then column, which is also the order the
/// neighbors' absolute coordinates sort in.
pub const NEIGHBOR_OFFSETS: [Offset; 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `offset` to `coords`, returning a value only when it remains in bounds.
pub fn apply_offset(coords: Coord2, offset: Offset, bounds: Coord2) -> Option<Coord2> {
    let (row, col) = coords;
    let (d_row, d_col) = offset;
    let (rows, cols) = bounds;

    let next_row = row.checked_add_signed(d_row)?;
    if next_row >= rows {
        return None;
    }

    let next_col = col.checked_add_signed(d_col)?;
    if next_col >= cols {
        return None;
    }

    Some((next_row, next_col))
}

/// Iterates the in-bounds neighbors of a cell in row-major order.
#[derive(Debug, Clone)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    index: u8,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }

    /// Same neighbors, paired with the offset that leads to each one.
    pub fn with_offsets(self) -> NeighborOffsetIter {
        NeighborOffsetIter(self)
    }

    fn next_with_offset(&mut self) -> Option<(Coord2, Offset)> {
        while let Some(&offset) = NEIGHBOR_OFFSETS.get(usize::from(self.index)) {
            self.index += 1;
            if let Some(coords) = apply_offset(self.center, offset, self.bounds) {
                return Some((coords, offset));
            }
        }
        None
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_with_offset().map(|(coords, _)| coords)
    }
}

#[derive(Debug, Clone)]
pub struct NeighborOffsetIter(NeighborIter);

impl Iterator for NeighborOffsetIter {
    type Item = (Coord2, Offset);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next_with_offset()
    }
}
