//! Grid dataset: cells keyed by (decade, longitude)
//!
//! Raw rows are validated for uniqueness, then normalized so the grid is
//! continuous across the antimeridian: a cell at -180° is mirrored to +180°
//! when the dataset has no +180° cell for that decade.

use super::error::{HeatmapError, Result};
use std::collections::{BTreeSet, HashMap};

/// Western seam longitude
pub const SEAM_WEST: i32 = -180;
/// Eastern seam longitude (same meridian as `SEAM_WEST`)
pub const SEAM_EAST: i32 = 180;

/// One grid value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub decade: i32,
    pub longitude: i32,
    /// Temperature anomaly in °C
    pub value: f64,
}

impl Cell {
    pub fn new(decade: i32, longitude: i32, value: f64) -> Self {
        Self {
            decade,
            longitude,
            value,
        }
    }
}

/// Two-level lookup: decade → longitude → value
#[derive(Debug, Clone, Default)]
pub struct CellIndex {
    by_decade: HashMap<i32, HashMap<i32, f64>>,
}

impl CellIndex {
    /// Insert a cell, returning false if the position was already taken
    fn insert(&mut self, cell: &Cell) -> bool {
        let row = self.by_decade.entry(cell.decade).or_default();
        if row.contains_key(&cell.longitude) {
            return false;
        }
        row.insert(cell.longitude, cell.value);
        true
    }

    pub fn get(&self, decade: i32, longitude: i32) -> Option<f64> {
        self.by_decade
            .get(&decade)
            .and_then(|row| row.get(&longitude))
            .copied()
    }

    pub fn contains(&self, decade: i32, longitude: i32) -> bool {
        self.get(decade, longitude).is_some()
    }
}

/// Normalized, validated heatmap data
#[derive(Debug, Clone)]
pub struct GridDataset {
    cells: Vec<Cell>,
    decades: Vec<i32>,
    longitudes: Vec<i32>,
    index: CellIndex,
    value_extent: (f64, f64),
}

impl GridDataset {
    /// Validate and normalize raw rows
    ///
    /// Fails with `EmptyResource` when there are no rows and with
    /// `DuplicateCell` when two rows share a (decade, longitude) position.
    pub fn from_cells(raw: Vec<Cell>) -> Result<Self> {
        if raw.is_empty() {
            return Err(HeatmapError::EmptyResource(
                "the resource yielded zero rows".to_string(),
            ));
        }

        let mut index = CellIndex::default();
        for cell in &raw {
            if !index.insert(cell) {
                return Err(HeatmapError::DuplicateCell {
                    decade: cell.decade,
                    longitude: cell.longitude,
                });
            }
        }

        let mut cells = raw;

        // Mirror the western seam where the eastern one is missing
        let mirrored: Vec<Cell> = cells
            .iter()
            .filter(|c| c.longitude == SEAM_WEST && !index.contains(c.decade, SEAM_EAST))
            .map(|c| Cell::new(c.decade, SEAM_EAST, c.value))
            .collect();
        if !mirrored.is_empty() {
            log::debug!(
                "GridDataset: mirrored {} cell(s) from {}° to {}°",
                mirrored.len(),
                SEAM_WEST,
                SEAM_EAST
            );
        }
        for cell in mirrored {
            index.insert(&cell);
            cells.push(cell);
        }

        let (decades, longitudes) = distinct_axes(&cells);
        let value_extent = cells
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
                (lo.min(c.value), hi.max(c.value))
            });

        Ok(Self {
            cells,
            decades,
            longitudes,
            index,
            value_extent,
        })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Sorted distinct decades of the full dataset
    pub fn decades(&self) -> &[i32] {
        &self.decades
    }

    /// Sorted distinct longitudes of the full dataset
    pub fn longitudes(&self) -> &[i32] {
        &self.longitudes
    }

    pub fn get(&self, decade: i32, longitude: i32) -> Option<f64> {
        self.index.get(decade, longitude)
    }

    /// (min, max) of all values
    pub fn value_extent(&self) -> (f64, f64) {
        self.value_extent
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Distinct sorted axes of the cells accepted by `keep`
    pub fn axes_where(&self, keep: impl Fn(&Cell) -> bool) -> (Vec<i32>, Vec<i32>) {
        let kept: Vec<Cell> = self.cells.iter().filter(|c| keep(c)).copied().collect();
        distinct_axes(&kept)
    }
}

fn distinct_axes(cells: &[Cell]) -> (Vec<i32>, Vec<i32>) {
    let decades: BTreeSet<i32> = cells.iter().map(|c| c.decade).collect();
    let longitudes: BTreeSet<i32> = cells.iter().map(|c| c.longitude).collect();
    (
        decades.into_iter().collect(),
        longitudes.into_iter().collect(),
    )
}
