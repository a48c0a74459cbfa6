//! Named zones and the per-axis registries that order them.
//!
//! Two registries exist: one whose zones differ only along the column axis
//! (the row values are placeholders spanning the full height) and one whose
//! zones differ only along the row axis.  The order inside a registry is the
//! cycling order: from the narrowest zone hugging one edge, through the
//! full-extent zone in the middle, to the narrowest zone hugging the
//! opposite edge.
//!
//! A registry may override its zone list for specific display resolutions
//! (e.g. quarter-width zones on a 5120×1440 ultrawide).

use crate::grid::{Axis, GridCell};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Physical pixel size of a display: logical size × backing scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayResolution {
    pub width_px: u32,
    pub height_px: u32,
}

impl DisplayResolution {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    /// Derive the physical resolution from a logical size and a backing
    /// scale factor, truncating like the display server does.
    pub fn from_logical(width: f64, height: f64, scale: f64) -> Self {
        Self::new((width * scale) as u32, (height * scale) as u32)
    }
}

impl fmt::Display for DisplayResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width_px, self.height_px)
    }
}

/// A named block of the grid.
///
/// Two zones are equal when their names are equal, even if a resolution
/// override gives them a different cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub cell: GridCell,
}

impl Zone {
    pub fn new(name: impl Into<String>, cell: GridCell) -> Self {
        Self {
            name: name.into(),
            cell,
        }
    }
}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Zone {}

/// Ordered zone list for one axis, with optional per-resolution overrides.
#[derive(Debug, Clone, Default)]
pub struct ZoneRegistry {
    default_zones: Vec<Zone>,
    overrides: HashMap<DisplayResolution, Vec<Zone>>,
}

impl ZoneRegistry {
    /// Create a registry with no resolution overrides.
    pub fn new(default_zones: Vec<Zone>) -> Self {
        Self {
            default_zones,
            overrides: HashMap::new(),
        }
    }

    /// Add (or replace) the zone list used on displays of `resolution`.
    pub fn with_override(mut self, resolution: DisplayResolution, zones: Vec<Zone>) -> Self {
        self.overrides.insert(resolution, zones);
        self
    }

    /// The zones that apply to a display of `resolution`.
    ///
    /// An override that is present but empty is treated as a configuration
    /// slip and falls back to the defaults.
    pub fn zones(&self, resolution: DisplayResolution) -> &[Zone] {
        match self.overrides.get(&resolution) {
            Some(zones) if !zones.is_empty() => zones,
            _ => &self.default_zones,
        }
    }

    /// The default zone list.
    pub fn default_zones(&self) -> &[Zone] {
        &self.default_zones
    }

    /// Index of the zone called `name` on a display of `resolution`.
    pub fn position_of(&self, resolution: DisplayResolution, name: &str) -> Option<usize> {
        self.zones(resolution).iter().position(|z| z.name == name)
    }

    /// Built-in column-axis zones: thirds, halves and two-thirds from each
    /// edge around a full-width midpoint, plus a quarter-based override for
    /// 5120×1440 displays.
    pub fn builtin_columns() -> Self {
        let col = |name: &str, col, span| Zone::new(name, GridCell::new(col, 0, span, 6));
        Self::new(vec![
            col("Left Third", 0, 4),
            col("Left Half", 0, 6),
            col("Left 2/3", 0, 8),
            col("Full Width", 0, 12),
            col("Right 2/3", 4, 8),
            col("Right Half", 6, 6),
            col("Right Third", 8, 4),
        ])
        .with_override(
            DisplayResolution::new(5120, 1440),
            vec![
                col("Left 1/4", 0, 3),
                col("Left 1/3", 0, 4),
                col("Left 1/2", 0, 6),
                col("Left 2/3", 0, 8),
                col("Full Width", 0, 12),
                col("Right 2/3", 4, 8),
                col("Right 1/2", 6, 6),
                col("Right 1/3", 8, 4),
                col("Right 1/4", 9, 3),
            ],
        )
    }

    /// Built-in row-axis zones, top edge to bottom edge.
    pub fn builtin_rows() -> Self {
        let row = |name: &str, row, span| Zone::new(name, GridCell::new(0, row, 12, span));
        Self::new(vec![
            row("Top 1/3", 0, 2),
            row("Top 1/2", 0, 3),
            row("Top 2/3", 0, 4),
            row("Full Height", 0, 6),
            row("Bottom 2/3", 2, 4),
            row("Bottom 1/2", 3, 3),
            row("Bottom 1/3", 4, 2),
        ])
    }
}

/// The pair of registries, one per axis.
#[derive(Debug, Clone)]
pub struct ZoneCatalog {
    pub columns: ZoneRegistry,
    pub rows: ZoneRegistry,
}

impl ZoneCatalog {
    pub fn new(columns: ZoneRegistry, rows: ZoneRegistry) -> Self {
        Self { columns, rows }
    }

    /// The registry that drives `axis`.
    pub fn registry(&self, axis: Axis) -> &ZoneRegistry {
        match axis {
            Axis::Column => &self.columns,
            Axis::Row => &self.rows,
        }
    }
}

impl Default for ZoneCatalog {
    fn default() -> Self {
        Self::new(ZoneRegistry::builtin_columns(), ZoneRegistry::builtin_rows())
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{COLS, ROWS};

    const LAPTOP: DisplayResolution = DisplayResolution {
        width_px: 2880,
        height_px: 1800,
    };
    const ULTRAWIDE: DisplayResolution = DisplayResolution {
        width_px: 5120,
        height_px: 1440,
    };

    #[test]
    fn default_columns_are_ordered_edge_to_edge() {
        let reg = ZoneRegistry::builtin_columns();
        let names: Vec<&str> = reg.zones(LAPTOP).iter().map(|z| z.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Left Third",
                "Left Half",
                "Left 2/3",
                "Full Width",
                "Right 2/3",
                "Right Half",
                "Right Third"
            ]
        );
    }

    #[test]
    fn override_selected_by_resolution() {
        let reg = ZoneRegistry::builtin_columns();
        let zones = reg.zones(ULTRAWIDE);
        assert_eq!(zones.len(), 9);
        assert_eq!(zones[0].name, "Left 1/4");
        assert_eq!(zones[8].cell, GridCell::new(9, 0, 3, 6));
    }

    #[test]
    fn miss_falls_back_to_defaults() {
        let reg = ZoneRegistry::builtin_columns();
        assert_eq!(reg.zones(DisplayResolution::new(1, 1)).len(), 7);
    }

    #[test]
    fn empty_override_falls_back_to_defaults() {
        let reg = ZoneRegistry::builtin_rows().with_override(LAPTOP, Vec::new());
        assert_eq!(reg.zones(LAPTOP), reg.default_zones());
    }

    #[test]
    fn zones_are_pure() {
        let reg = ZoneRegistry::builtin_columns();
        assert_eq!(reg.zones(ULTRAWIDE), reg.zones(ULTRAWIDE));
    }

    #[test]
    fn all_builtin_cells_are_valid_and_axis_isolated() {
        let cat = ZoneCatalog::default();
        for res in [LAPTOP, ULTRAWIDE] {
            for z in cat.columns.zones(res) {
                assert!(z.cell.is_valid(), "{} invalid", z.name);
                assert_eq!(z.cell.extent(Axis::Row), (0, ROWS));
            }
            for z in cat.rows.zones(res) {
                assert!(z.cell.is_valid(), "{} invalid", z.name);
                assert_eq!(z.cell.extent(Axis::Column), (0, COLS));
            }
        }
    }

    #[test]
    fn zone_equality_is_by_name() {
        let a = Zone::new("Left 2/3", GridCell::new(0, 0, 8, 6));
        let b = Zone::new("Left 2/3", GridCell::new(0, 0, 7, 6));
        let c = Zone::new("Right 2/3", GridCell::new(0, 0, 8, 6));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn position_of_finds_zone_by_name() {
        let reg = ZoneRegistry::builtin_columns();
        assert_eq!(reg.position_of(LAPTOP, "Full Width"), Some(3));
        assert_eq!(reg.position_of(ULTRAWIDE, "Full Width"), Some(4));
        assert_eq!(reg.position_of(LAPTOP, "Left 1/4"), None);
    }

    #[test]
    fn resolution_from_logical_size() {
        assert_eq!(DisplayResolution::from_logical(1440.0, 900.0, 2.0), LAPTOP);
        assert_eq!(ULTRAWIDE.to_string(), "5120x1440");
    }
}
