//! Bit-packed wall and pellet grids.
//!
//! Each maze row is stored as a `u32` whose low [`MAZE_COLS`] bits mark the
//! cells of that row, column zero in the least significant bit. Walls never
//! change after the layout is parsed and are read without locking. Pellets
//! live behind their own lock together with the running pellet count so the
//! two can never disagree.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use maze_chase_core::{MAZE_COLS, MAZE_ROWS};
use thiserror::Error;

const ROWS: usize = MAZE_ROWS as usize;
const COLS: usize = MAZE_COLS as usize;

/// Cell a spawning ghost may pass through even though it is walled off.
pub(crate) const GHOST_HOUSE_EXIT: (i8, i8) = (12, 13);

const GHOST_HOUSE_ROWS: (i8, i8) = (13, 14);
const GHOST_HOUSE_COLS: (i8, i8) = (11, 15);

const SUPER_PELLET_CELLS: [(i8, i8); 4] = [(3, 1), (3, 26), (23, 1), (23, 26)];

/// Classic arcade layout: `#` wall, `.` pellet, `o` super pellet, space open floor.
pub const CLASSIC_LAYOUT: [&str; ROWS] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "     #.##### ## #####.#     ",
    "     #.##          ##.#     ",
    "     #.## ######## ##.#     ",
    "######.## #     ## ##.######",
    "      .   #     ##   .      ",
    "######.## ######## ##.######",
    "     #.## ######## ##.#     ",
    "     #.##          ##.#     ",
    "     #.## ######## ##.#     ",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......  .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

/// Reasons a maze layout may be rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The layout does not contain exactly [`MAZE_ROWS`] rows.
    #[error("layout has {actual} rows; expected {expected}")]
    RowCount {
        /// Number of rows found.
        actual: usize,
        /// Number of rows required.
        expected: usize,
    },
    /// A row is wider than [`MAZE_COLS`] cells.
    #[error("row {row} is {actual} cells wide; at most {expected} allowed")]
    RowWidth {
        /// Offending row.
        row: usize,
        /// Width found.
        actual: usize,
        /// Maximum width.
        expected: usize,
    },
    /// A cell uses a glyph outside the layout alphabet.
    #[error("unknown glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph {
        /// Glyph found.
        glyph: char,
        /// Row of the glyph.
        row: usize,
        /// Column of the glyph.
        col: usize,
    },
    /// A super pellet glyph sits outside the four power corners.
    #[error("super pellet at row {row}, column {col} is not on a power corner")]
    MisplacedSuperPellet {
        /// Row of the glyph.
        row: usize,
        /// Column of the glyph.
        col: usize,
    },
}

#[derive(Clone, Copy, Debug)]
struct PelletGrid {
    bits: [u32; ROWS],
    count: u16,
}

/// Result of a pellet collection attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PelletTake {
    /// No pellet was present; nothing changed.
    Missing { remaining: u16 },
    /// The pellet was removed.
    Taken { super_pellet: bool, remaining: u16 },
}

impl PelletTake {
    pub(crate) const fn remaining(self) -> u16 {
        match self {
            Self::Missing { remaining } | Self::Taken { remaining, .. } => remaining,
        }
    }
}

/// Fixed-size maze geometry: walls, pellets and the ghost house.
#[derive(Debug)]
pub struct Maze {
    walls: [u32; ROWS],
    pellets: RwLock<PelletGrid>,
    initial_pellets: u16,
}

impl Maze {
    /// Builds the bundled classic maze.
    #[must_use]
    pub fn classic() -> Self {
        Self::from_rows(&CLASSIC_LAYOUT).expect("bundled classic layout is well formed")
    }

    /// Parses a newline-separated layout.
    ///
    /// Trailing blank lines are ignored and short rows are padded with open
    /// floor, so editors that strip trailing whitespace do not break layouts.
    pub fn from_layout(text: &str) -> Result<Self, LayoutError> {
        let mut rows: Vec<&str> = text
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        while rows.last().is_some_and(|row| row.trim().is_empty()) && rows.len() > ROWS {
            let _ = rows.pop();
        }
        Self::from_rows(&rows)
    }

    /// Builds a maze from exactly [`MAZE_ROWS`] layout rows.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LayoutError> {
        if rows.len() != ROWS {
            return Err(LayoutError::RowCount {
                actual: rows.len(),
                expected: ROWS,
            });
        }

        let mut walls = [0_u32; ROWS];
        let mut pellets = [0_u32; ROWS];
        let mut count: u16 = 0;
        for (row, text) in rows.iter().enumerate() {
            let text = text.as_ref();
            let width = text.chars().count();
            if width > COLS {
                return Err(LayoutError::RowWidth {
                    row,
                    actual: width,
                    expected: COLS,
                });
            }
            for (col, glyph) in text.chars().enumerate() {
                match glyph {
                    '#' => walls[row] |= 1_u32 << col,
                    '.' => {
                        pellets[row] |= 1_u32 << col;
                        count += 1;
                    }
                    'o' => {
                        if !SUPER_PELLET_CELLS.contains(&(row as i8, col as i8)) {
                            return Err(LayoutError::MisplacedSuperPellet { row, col });
                        }
                        pellets[row] |= 1_u32 << col;
                        count += 1;
                    }
                    ' ' => {}
                    glyph => return Err(LayoutError::UnknownGlyph { glyph, row, col }),
                }
            }
        }

        Ok(Self {
            walls,
            pellets: RwLock::new(PelletGrid {
                bits: pellets,
                count,
            }),
            initial_pellets: count,
        })
    }

    /// Reports whether the cell lies inside the maze.
    #[must_use]
    pub const fn in_bounds(row: i8, col: i8) -> bool {
        row >= 0 && row < MAZE_ROWS && col >= 0 && col < MAZE_COLS
    }

    /// Reports whether the cell is a wall. Cells outside the maze count as walls.
    #[must_use]
    pub fn wall_at(&self, row: i8, col: i8) -> bool {
        if !Self::in_bounds(row, col) {
            return true;
        }
        bit(self.walls[row as usize], col)
    }

    /// Reports whether the cell belongs to the ghost-house spawning region.
    #[must_use]
    pub const fn ghost_house_at(row: i8, col: i8) -> bool {
        Self::in_bounds(row, col)
            && row >= GHOST_HOUSE_ROWS.0
            && row <= GHOST_HOUSE_ROWS.1
            && col >= GHOST_HOUSE_COLS.0
            && col <= GHOST_HOUSE_COLS.1
    }

    /// Reports whether the cell is one of the four power corners.
    #[must_use]
    pub fn is_super_pellet_cell(row: i8, col: i8) -> bool {
        SUPER_PELLET_CELLS.contains(&(row, col))
    }

    /// Reports whether a pellet remains on the cell. Cells outside the maze never hold one.
    #[must_use]
    pub fn pellet_at(&self, row: i8, col: i8) -> bool {
        if !Self::in_bounds(row, col) {
            return false;
        }
        bit(self.read_pellets().bits[row as usize], col)
    }

    /// Number of pellets left on the board.
    #[must_use]
    pub fn pellet_count(&self) -> u16 {
        self.read_pellets().count
    }

    /// Number of pellets the layout started with.
    #[must_use]
    pub const fn initial_pellet_count(&self) -> u16 {
        self.initial_pellets
    }

    /// Squared Euclidean distance between two cells, for relative comparison only.
    #[must_use]
    pub const fn dist_sq(row1: i32, col1: i32, row2: i32, col2: i32) -> i32 {
        let d_row = row2 - row1;
        let d_col = col2 - col1;
        d_row * d_row + d_col * d_col
    }

    /// Removes the pellet on the cell, if any, under the pellet lock.
    ///
    /// At most one call observes [`PelletTake::Taken`] for a given cell.
    pub(crate) fn take_pellet(&self, row: i8, col: i8) -> PelletTake {
        let mut grid = self.write_pellets();
        if !Self::in_bounds(row, col) || !bit(grid.bits[row as usize], col) {
            return PelletTake::Missing {
                remaining: grid.count,
            };
        }

        assert!(grid.count > 0, "pellet bit set while pellet count is zero");
        grid.bits[row as usize] &= !(1_u32 << col);
        grid.count -= 1;
        debug_assert_eq!(
            u32::from(grid.count),
            grid.bits.iter().map(|bits| bits.count_ones()).sum::<u32>(),
            "pellet count drifted from the pellet grid"
        );

        PelletTake::Taken {
            super_pellet: Self::is_super_pellet_cell(row, col),
            remaining: grid.count,
        }
    }

    fn read_pellets(&self) -> RwLockReadGuard<'_, PelletGrid> {
        self.pellets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_pellets(&self) -> RwLockWriteGuard<'_, PelletGrid> {
        self.pellets.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn bit(bits: u32, col: i8) -> bool {
    (bits >> col) & 1 == 1
}
