use glam::Vec3;
use labyrinth_common::{CellCoord, MazeConfig};

/// Errors from building a maze grid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("maze grid has no cells")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("cell ({col}, {row}) has value {value}, expected 0 or 1")]
    InvalidCellValue { row: usize, col: usize, value: u8 },
    #[error("cell_size must be positive, got {0}")]
    NonPositiveCellSize(f32),
}

/// Classification of a world position against the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Open,
    Wall,
    /// Outside the grid. Treated as a wall by [`Maze::is_wall`].
    OutOfBounds,
}

impl Occupancy {
    pub fn is_blocked(self) -> bool {
        !matches!(self, Occupancy::Open)
    }
}

/// Immutable rows x cols table of wall cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeGrid {
    rows: usize,
    cols: usize,
    walls: Vec<bool>,
}

impl MazeGrid {
    /// Build a grid from rows of `0` (open) / `1` (wall).
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, GridError> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        if cols == 0 {
            return Err(GridError::Empty);
        }

        let mut walls = Vec::with_capacity(rows.len() * cols);
        for (row, cells) in rows.iter().enumerate() {
            let cells = cells.as_ref();
            if cells.len() != cols {
                return Err(GridError::RaggedRow {
                    row,
                    expected: cols,
                    found: cells.len(),
                });
            }
            for (col, &value) in cells.iter().enumerate() {
                match value {
                    0 => walls.push(false),
                    1 => walls.push(true),
                    _ => return Err(GridError::InvalidCellValue { row, col, value }),
                }
            }
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            walls,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.row >= 0
            && cell.col >= 0
            && (cell.row as usize) < self.rows
            && (cell.col as usize) < self.cols
    }

    /// Occupancy of a cell by index.
    pub fn occupancy(&self, cell: CellCoord) -> Occupancy {
        if !self.contains(cell) {
            return Occupancy::OutOfBounds;
        }
        if self.walls[cell.row as usize * self.cols + cell.col as usize] {
            Occupancy::Wall
        } else {
            Occupancy::Open
        }
    }

    /// All wall cells in row-major order.
    pub fn wall_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.walls
            .iter()
            .enumerate()
            .filter(|(_, wall)| **wall)
            .map(|(i, _)| CellCoord::new((i % self.cols) as i32, (i / self.cols) as i32))
    }

    pub fn wall_count(&self) -> usize {
        self.walls.iter().filter(|w| **w).count()
    }
}

/// World-to-cell mapping: `cell = floor((coord - offset) / cell_size)` on X and Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapping {
    offset_x: f32,
    offset_z: f32,
    cell_size: f32,
}

impl GridMapping {
    pub fn new(offset_x: f32, offset_z: f32, cell_size: f32) -> Result<Self, GridError> {
        if !(cell_size > 0.0) {
            return Err(GridError::NonPositiveCellSize(cell_size));
        }
        Ok(Self {
            offset_x,
            offset_z,
            cell_size,
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn offset_x(&self) -> f32 {
        self.offset_x
    }

    pub fn offset_z(&self) -> f32 {
        self.offset_z
    }

    /// Cell containing a world position. A position on a boundary belongs to
    /// the higher-index cell.
    pub fn cell_of(&self, pos: Vec3) -> CellCoord {
        CellCoord {
            col: ((pos.x - self.offset_x) / self.cell_size).floor() as i32,
            row: ((pos.z - self.offset_z) / self.cell_size).floor() as i32,
        }
    }

    /// World-space center of a cell at height `y`.
    pub fn cell_center(&self, cell: CellCoord, y: f32) -> Vec3 {
        Vec3::new(
            self.offset_x + (cell.col as f32 + 0.5) * self.cell_size,
            y,
            self.offset_z + (cell.row as f32 + 0.5) * self.cell_size,
        )
    }

    /// Cell index relative to a grid of `rows x cols` centered on the world
    /// origin, truncating toward zero. Only used for the extent-centered win check.
    pub fn extent_centered_cell(&self, pos: Vec3, rows: usize, cols: usize) -> CellCoord {
        let half_w = cols as f32 * self.cell_size / 2.0;
        let half_d = rows as f32 * self.cell_size / 2.0;
        CellCoord {
            col: ((pos.x + half_w) / self.cell_size) as i32,
            row: ((pos.z + half_d) / self.cell_size) as i32,
        }
    }
}

/// A grid placed in world space. Answers occupancy queries for positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Maze {
    grid: MazeGrid,
    mapping: GridMapping,
}

impl Maze {
    pub fn new(grid: MazeGrid, mapping: GridMapping) -> Self {
        Self { grid, mapping }
    }

    pub fn from_config(config: &MazeConfig) -> Result<Self, GridError> {
        let grid = MazeGrid::from_rows(&config.rows)?;
        let mapping = GridMapping::new(config.offset_x, config.offset_z, config.cell_size)?;
        Ok(Self::new(grid, mapping))
    }

    pub fn grid(&self) -> &MazeGrid {
        &self.grid
    }

    pub fn mapping(&self) -> &GridMapping {
        &self.mapping
    }

    pub fn cell_of(&self, pos: Vec3) -> CellCoord {
        self.mapping.cell_of(pos)
    }

    /// Classify a world position. Only X and Z are considered.
    pub fn occupancy_at(&self, pos: Vec3) -> Occupancy {
        let cell = self.mapping.cell_of(pos);
        let occupancy = self.grid.occupancy(cell);
        tracing::trace!(
            col = cell.col,
            row = cell.row,
            wall = occupancy.is_blocked(),
            ?occupancy,
            "occupancy query"
        );
        occupancy
    }

    /// True for wall cells and for anything outside the grid.
    pub fn is_wall(&self, pos: Vec3) -> bool {
        self.occupancy_at(pos).is_blocked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_maze() -> Maze {
        Maze::from_config(&MazeConfig::default()).unwrap()
    }

    fn unit_maze(rows: &[&[u8]]) -> Maze {
        Maze::new(
            MazeGrid::from_rows(rows).unwrap(),
            GridMapping::new(0.0, 0.0, 1.0).unwrap(),
        )
    }

    #[test]
    fn from_rows_rejects_ragged() {
        let err = MazeGrid::from_rows(&[vec![0u8, 1], vec![0]]).unwrap_err();
        assert_eq!(
            err,
            GridError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn from_rows_rejects_bad_values_and_empty() {
        assert_eq!(
            MazeGrid::from_rows(&[[0u8, 2]]).unwrap_err(),
            GridError::InvalidCellValue {
                row: 0,
                col: 1,
                value: 2
            }
        );
        let empty: [Vec<u8>; 0] = [];
        assert_eq!(MazeGrid::from_rows(&empty).unwrap_err(), GridError::Empty);
    }

    #[test]
    fn mapping_rejects_non_positive_cell_size() {
        assert!(GridMapping::new(0.0, 0.0, 0.0).is_err());
        assert!(GridMapping::new(0.0, 0.0, -1.0).is_err());
        assert!(GridMapping::new(0.0, 0.0, f32::NAN).is_err());
    }

    #[test]
    fn boundary_belongs_to_higher_cell() {
        let mapping = GridMapping::new(0.0, 0.0, 1.0).unwrap();
        assert_eq!(mapping.cell_of(Vec3::new(1.0, 0.0, 2.0)), CellCoord::new(1, 2));
        assert_eq!(
            mapping.cell_of(Vec3::new(0.999, 0.0, 1.999)),
            CellCoord::new(0, 1)
        );
        assert_eq!(
            mapping.cell_of(Vec3::new(-0.001, 0.0, 0.0)),
            CellCoord::new(-1, 0)
        );
    }

    #[test]
    fn out_of_bounds_is_wall() {
        let maze = unit_maze(&[&[0, 0], &[0, 0]]);
        for pos in [
            Vec3::new(-0.5, 0.0, 0.5),
            Vec3::new(2.0, 0.0, 0.5),
            Vec3::new(0.5, 0.0, -0.01),
            Vec3::new(0.5, 0.0, 2.5),
            Vec3::new(100.0, 5.0, -100.0),
        ] {
            assert_eq!(maze.occupancy_at(pos), Occupancy::OutOfBounds);
            assert!(maze.is_wall(pos), "{pos:?} should be blocked");
        }
    }

    #[test]
    fn occupancy_matches_cell_values() {
        let config = MazeConfig::default();
        let maze = Maze::from_config(&config).unwrap();
        for (r, row) in config.rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                let center = maze.mapping().cell_center(CellCoord::new(c as i32, r as i32), 1.5);
                assert_eq!(maze.is_wall(center), value == 1, "cell ({c}, {r})");
            }
        }
    }

    #[test]
    fn height_is_ignored() {
        let maze = unit_maze(&[&[0, 1]]);
        assert!(!maze.is_wall(Vec3::new(0.5, -50.0, 0.5)));
        assert!(maze.is_wall(Vec3::new(1.5, 50.0, 0.5)));
    }

    #[test]
    fn sample_spawn_and_exit_are_open() {
        let maze = sample_maze();
        let spawn = Vec3::new(0.0, 1.5, 19.5);
        assert_eq!(maze.cell_of(spawn), CellCoord::new(8, 16));
        assert!(!maze.is_wall(spawn));
        assert_eq!(
            maze.grid().occupancy(CellCoord::new(8, 0)),
            Occupancy::Open
        );
    }

    #[test]
    fn extent_centered_differs_from_offset_mapping() {
        let maze = sample_maze();
        let (rows, cols) = (maze.grid().rows(), maze.grid().cols());
        // z = -17.0 lies in row 0 by occupancy mapping but row 1 when centered on the extent.
        let pos = Vec3::new(0.0, 1.5, -17.0);
        assert_eq!(maze.cell_of(pos), CellCoord::new(8, 0));
        assert_eq!(
            maze.mapping().extent_centered_cell(pos, rows, cols),
            CellCoord::new(8, 1)
        );
    }

    #[test]
    fn wall_cells_iterates_row_major() {
        let grid = MazeGrid::from_rows(&[[1u8, 0], [0, 1]]).unwrap();
        let walls: Vec<CellCoord> = grid.wall_cells().collect();
        assert_eq!(walls, vec![CellCoord::new(0, 0), CellCoord::new(1, 1)]);
        assert_eq!(grid.wall_count(), 2);
    }
}
