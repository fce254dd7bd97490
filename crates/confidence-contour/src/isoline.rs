//! Isoline tracing over a density grid.
//!
//! Crossings are stored in a dense arena with two regions: vertical crossings
//! between bins `(r, c)` and `(r + 1, c)`, and horizontal crossings between
//! bins `(r, c)` and `(r, c + 1)`. Each crossing carries the direction a walker
//! travels when the bins at or above the level are kept on its right, so every
//! isoline winds around its high-density region the same way.
//!
//! Tracing first follows every crossing that enters the grid from a boundary
//! (open isolines), then starts a closed isoline from each crossing still
//! unclaimed. A crossing is claimed by exactly one isoline.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ContourError, Result};
use crate::grid::{DensityGrid, GridPoint, GridShape};

/// Travel direction of a crossing, in north-up grid terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

/// Which pair of adjacent bins a crossing lies between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Between `(row, col)` and `(row + 1, col)`.
    Vertical,
    /// Between `(row, col)` and `(row, col + 1)`.
    Horizontal,
}

/// Arena slot of a crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrossingId {
    pub axis: Axis,
    pub row: usize,
    pub col: usize,
}

impl CrossingId {
    pub fn vertical(row: usize, col: usize) -> Self {
        Self {
            axis: Axis::Vertical,
            row,
            col,
        }
    }

    pub fn horizontal(row: usize, col: usize) -> Self {
        Self {
            axis: Axis::Horizontal,
            row,
            col,
        }
    }

    /// Whether both bins of this pair lie inside a grid of `shape`.
    pub fn in_bounds(&self, shape: GridShape) -> bool {
        match self.axis {
            Axis::Vertical => self.row + 1 < shape.rows && self.col < shape.cols,
            Axis::Horizontal => self.row < shape.rows && self.col + 1 < shape.cols,
        }
    }
}

/// A level crossing between two adjacent bin centres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crossing {
    pub id: CrossingId,
    pub direction: Direction,
    /// Interpolated position in fractional grid coordinates.
    pub position: GridPoint,
    pub level: f64,
}

/// A slot a walker may step to next, and the direction it must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub id: CrossingId,
    pub direction: Direction,
}

impl Candidate {
    fn new(id: CrossingId, direction: Direction) -> Self {
        Self { id, direction }
    }
}

/// Slots reachable from a crossing travelling in `direction`.
///
/// The walker enters the dual cell ahead of it and may leave through any of
/// the other three sides; the straight-ahead side is listed first. Returns an
/// empty list when the walker is about to leave the grid.
pub fn neighbors(direction: Direction, id: CrossingId, shape: GridShape) -> Vec<Candidate> {
    use Direction::*;

    let CrossingId { row, col, .. } = id;
    let candidates = match direction {
        East if col + 1 < shape.cols => vec![
            Candidate::new(CrossingId::vertical(row, col + 1), East),
            Candidate::new(CrossingId::horizontal(row + 1, col), South),
            Candidate::new(CrossingId::horizontal(row, col), North),
        ],
        West if col > 0 => vec![
            Candidate::new(CrossingId::vertical(row, col - 1), West),
            Candidate::new(CrossingId::horizontal(row + 1, col - 1), South),
            Candidate::new(CrossingId::horizontal(row, col - 1), North),
        ],
        North if row > 0 => vec![
            Candidate::new(CrossingId::horizontal(row - 1, col), North),
            Candidate::new(CrossingId::vertical(row - 1, col), West),
            Candidate::new(CrossingId::vertical(row - 1, col + 1), East),
        ],
        South if row + 1 < shape.rows => vec![
            Candidate::new(CrossingId::horizontal(row + 1, col), South),
            Candidate::new(CrossingId::vertical(row, col + 1), East),
            Candidate::new(CrossingId::vertical(row, col), West),
        ],
        _ => Vec::new(),
    };

    candidates
        .into_iter()
        .filter(|candidate| candidate.id.in_bounds(shape))
        .collect()
}

/// Dense arena of all crossings of one level over one grid.
#[derive(Debug, Clone)]
pub struct CrossingGrid {
    shape: GridShape,
    level: f64,
    vertical: Vec<Option<Crossing>>,
    horizontal: Vec<Option<Crossing>>,
}

impl CrossingGrid {
    /// Compute the crossings of `level` over a density grid.
    pub fn build(grid: &DensityGrid, level: f64) -> Self {
        let values: Vec<f64> = grid.counts().iter().map(|&count| count as f64).collect();
        Self::from_validated(grid.shape(), &values, level)
    }

    /// Compute crossings over arbitrary row-major values (row 0 north).
    ///
    /// Pairs involving a NaN value produce no crossing.
    pub fn from_values(shape: GridShape, values: &[f64], level: f64) -> Result<Self> {
        if values.len() != shape.cells() {
            return Err(ContourError::invalid_argument(
                "values",
                format!(
                    "expected {} values for a {}x{} grid, got {}",
                    shape.cells(),
                    shape.rows,
                    shape.cols,
                    values.len()
                ),
            ));
        }
        if !level.is_finite() {
            return Err(ContourError::invalid_argument(
                "level",
                format!("level must be finite, got {level}"),
            ));
        }
        Ok(Self::from_validated(shape, values, level))
    }

    fn from_validated(shape: GridShape, values: &[f64], level: f64) -> Self {
        let GridShape { rows, cols } = shape;
        let above = |v: f64| v >= level;
        let value = |row: usize, col: usize| values[row * cols + col];

        let mut vertical = Vec::with_capacity(rows.saturating_sub(1) * cols);
        for row in 0..rows.saturating_sub(1) {
            for col in 0..cols {
                let north = value(row, col);
                let south = value(row + 1, col);
                let crossing = if north.is_nan() || south.is_nan() || above(north) == above(south) {
                    None
                } else {
                    let ratio = (level - south) / (north - south);
                    Some(Crossing {
                        id: CrossingId::vertical(row, col),
                        direction: if above(south) { Direction::East } else { Direction::West },
                        position: GridPoint::new((row + 1) as f64 - ratio, col as f64),
                        level,
                    })
                };
                vertical.push(crossing);
            }
        }

        let mut horizontal = Vec::with_capacity(rows * cols.saturating_sub(1));
        for row in 0..rows {
            for col in 0..cols.saturating_sub(1) {
                let west = value(row, col);
                let east = value(row, col + 1);
                let crossing = if west.is_nan() || east.is_nan() || above(west) == above(east) {
                    None
                } else {
                    let ratio = (level - west) / (east - west);
                    Some(Crossing {
                        id: CrossingId::horizontal(row, col),
                        direction: if above(west) { Direction::South } else { Direction::North },
                        position: GridPoint::new(row as f64, col as f64 + ratio),
                        level,
                    })
                };
                horizontal.push(crossing);
            }
        }

        Self {
            shape,
            level,
            vertical,
            horizontal,
        }
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Flat index shared by both regions, used for the claimed bitmap.
    fn slot(&self, id: CrossingId) -> Option<usize> {
        if !id.in_bounds(self.shape) {
            return None;
        }
        let slot = match id.axis {
            Axis::Vertical => id.row * self.shape.cols + id.col,
            Axis::Horizontal => self.vertical.len() + id.row * (self.shape.cols - 1) + id.col,
        };
        Some(slot)
    }

    fn slots(&self) -> usize {
        self.vertical.len() + self.horizontal.len()
    }

    pub fn get(&self, id: CrossingId) -> Option<&Crossing> {
        let slot = self.slot(id)?;
        match id.axis {
            Axis::Vertical => self.vertical[slot].as_ref(),
            Axis::Horizontal => self.horizontal[slot - self.vertical.len()].as_ref(),
        }
    }

    /// All crossings, vertical region first, each row-major.
    pub fn crossings(&self) -> impl Iterator<Item = &Crossing> + '_ {
        self.vertical.iter().chain(&self.horizontal).flatten()
    }

    /// Number of crossings present.
    pub fn len(&self) -> usize {
        self.crossings().count()
    }

    pub fn is_empty(&self) -> bool {
        self.crossings().next().is_none()
    }

    /// Boundary crossings that point into the grid.
    fn entry_points(&self) -> Vec<CrossingId> {
        let GridShape { rows, cols } = self.shape;
        let mut entries = Vec::new();
        let mut push_if = |id: CrossingId, direction: Direction| {
            if self.get(id).map(|c| c.direction) == Some(direction) {
                entries.push(id);
            }
        };

        if cols > 0 {
            for row in 0..rows.saturating_sub(1) {
                push_if(CrossingId::vertical(row, 0), Direction::East);
                push_if(CrossingId::vertical(row, cols - 1), Direction::West);
            }
        }
        if rows > 0 {
            for col in 0..cols.saturating_sub(1) {
                push_if(CrossingId::horizontal(0, col), Direction::South);
            }
            for col in 0..cols.saturating_sub(1) {
                push_if(CrossingId::horizontal(rows - 1, col), Direction::North);
            }
        }
        entries
    }

    /// Trace every crossing into open and closed isolines.
    pub fn trace(&self) -> Vec<Isoline> {
        Tracer::new(self).run()
    }
}

/// One connected piece of a level set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isoline {
    pub level: f64,
    /// Crossings in walk order. A closed isoline does not repeat its start.
    pub crossings: Vec<Crossing>,
    /// True when the walk returned to its start; false when it left the grid.
    pub closed: bool,
}

impl Isoline {
    /// Grid positions in walk order.
    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        self.crossings.iter().map(|c| c.position)
    }

    pub fn len(&self) -> usize {
        self.crossings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crossings.is_empty()
    }
}

struct Tracer<'a> {
    grid: &'a CrossingGrid,
    claimed: Vec<bool>,
}

impl<'a> Tracer<'a> {
    fn new(grid: &'a CrossingGrid) -> Self {
        Self {
            grid,
            claimed: vec![false; grid.slots()],
        }
    }

    fn run(mut self) -> Vec<Isoline> {
        let grid = self.grid;
        let mut isolines = Vec::new();

        for id in grid.entry_points() {
            if !self.is_claimed(id) {
                isolines.extend(self.follow(id));
            }
        }

        for crossing in grid.crossings() {
            if !self.is_claimed(crossing.id) {
                isolines.extend(self.follow(crossing.id));
            }
        }

        isolines
    }

    fn is_claimed(&self, id: CrossingId) -> bool {
        self.grid
            .slot(id)
            .map(|slot| self.claimed[slot])
            .unwrap_or(true)
    }

    fn claim(&mut self, id: CrossingId) {
        if let Some(slot) = self.grid.slot(id) {
            self.claimed[slot] = true;
        }
    }

    fn follow(&mut self, start: CrossingId) -> Option<Isoline> {
        let first = *self.grid.get(start)?;
        self.claim(start);

        let mut crossings = vec![first];
        let mut current = first;
        let closed = loop {
            match self.find_next(&current, start) {
                None => break false,
                Some(next) if next.id == start => break true,
                Some(next) => {
                    self.claim(next.id);
                    crossings.push(next);
                    current = next;
                }
            }
        };

        Some(Isoline {
            level: first.level,
            crossings,
            closed,
        })
    }

    /// First neighbour that exists with the expected direction and level and
    /// is either unclaimed or the start of the current walk.
    fn find_next(&self, current: &Crossing, start: CrossingId) -> Option<Crossing> {
        neighbors(current.direction, current.id, self.grid.shape)
            .into_iter()
            .find_map(|candidate| {
                let next = self.grid.get(candidate.id)?;
                let available = candidate.id == start || !self.is_claimed(candidate.id);
                (next.direction == candidate.direction && next.level == current.level && available)
                    .then_some(*next)
            })
    }
}

/// Trace the isolines of `level` over a density grid.
pub fn trace_isolines(grid: &DensityGrid, level: f64) -> Vec<Isoline> {
    let crossings = CrossingGrid::build(grid, level);
    let isolines = crossings.trace();

    debug!(
        level,
        crossings = crossings.len(),
        isolines = isolines.len(),
        closed = isolines.iter().filter(|i| i.closed).count(),
        "Traced isolines"
    );

    isolines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_stop_at_boundary() {
        let shape = GridShape::new(3, 3);
        assert!(neighbors(Direction::West, CrossingId::vertical(0, 0), shape).is_empty());
        assert!(neighbors(Direction::East, CrossingId::vertical(1, 2), shape).is_empty());
        assert!(neighbors(Direction::North, CrossingId::horizontal(0, 1), shape).is_empty());
        assert!(neighbors(Direction::South, CrossingId::horizontal(2, 0), shape).is_empty());
    }

    #[test]
    fn test_crossing_positions_interpolate() {
        #[rustfmt::skip]
        let values = [
            0.0, 0.0, 0.0,
            0.0, 10.0, 0.0,
            0.0, 0.0, 0.0,
        ];
        let grid = CrossingGrid::from_values(GridShape::new(3, 3), &values, 5.0).unwrap();
        assert_eq!(grid.len(), 4);

        let top = grid.get(CrossingId::vertical(0, 1)).unwrap();
        assert_eq!(top.direction, Direction::East);
        assert_eq!(top.position, GridPoint::new(0.5, 1.0));

        let right = grid.get(CrossingId::horizontal(1, 1)).unwrap();
        assert_eq!(right.direction, Direction::South);
        assert_eq!(right.position, GridPoint::new(1.0, 1.5));
    }

    #[test]
    fn test_nan_pairs_have_no_crossing() {
        let values = [f64::NAN, 10.0, 0.0, 0.0];
        let grid = CrossingGrid::from_values(GridShape::new(2, 2), &values, 5.0).unwrap();
        assert!(grid.get(CrossingId::horizontal(0, 0)).is_none());
        assert!(grid.get(CrossingId::vertical(0, 0)).is_none());
        assert!(grid.get(CrossingId::vertical(0, 1)).is_some());
    }

    #[test]
    fn test_from_values_rejects_wrong_length() {
        let err = CrossingGrid::from_values(GridShape::new(2, 2), &[1.0, 2.0], 1.0).unwrap_err();
        assert_eq!(err.param(), "values");
    }
}
