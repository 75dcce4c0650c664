//! # Channel Specification Store
//!
//! Capacity and edge-distance data for cast-in anchor channels, keyed by
//! `(channel type, slab thickness, bracket centres)`.
//!
//! ## Data Source
//!
//! The table is the CSV at `assets/channel_specs.csv`, embedded at compile time
//! and parsed once on first use. It is read-only for the life of the process
//! and shared by reference between all candidate evaluations.
//!
//! ## Fallback rules
//!
//! An exact key is tried first. Otherwise:
//! - slab thickness resolves to the smallest tabulated thickness **≥** the
//!   request, or the largest tabulated thickness if the request is above the table;
//! - bracket centres resolve the same way within the chosen slab row.
//!
//! An unknown channel family is reported as [`CalcError::MissingReferenceData`];
//! callers turn that into a failing check, never a crash.
//!
//! ## Example
//!
//! ```rust
//! use support_core::channels::ChannelStore;
//!
//! let store = ChannelStore::embedded().unwrap();
//! let hit = store.lookup("CPRO50", 180.0, 500.0).unwrap();
//! assert_eq!(hit.spec.slab_thickness, 200.0);
//! assert!(!hit.exact);
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Table name used in diagnostics
pub const CHANNEL_TABLE: &str = "channel_specs";

/// Tolerance when comparing tabulated millimetre keys
const KEY_TOLERANCE: f64 = 1e-9;

static EMBEDDED_CSV: &str = include_str!("../assets/channel_specs.csv");

static EMBEDDED: Lazy<CalcResult<ChannelStore>> =
    Lazy::new(|| ChannelStore::from_csv_str(EMBEDDED_CSV, "assets/channel_specs.csv"));

/// One row of the channel capacity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
    /// Channel family (e.g. "CPRO50")
    pub channel_type: String,

    /// Slab thickness the row was tested for (mm)
    pub slab_thickness: f64,

    /// Bracket centres the row was tested for (mm)
    pub bracket_centres: f64,

    /// Critical distance from channel to slab top edge (mm)
    pub top_critical_edge: f64,

    /// Critical distance from channel to slab bottom edge (mm)
    pub bottom_critical_edge: f64,

    /// Design tension capacity per bracket N_Rd (kN)
    pub tension_capacity: f64,

    /// Design shear capacity per bracket V_Rd (kN)
    pub shear_capacity: f64,
}

/// Result of a lookup: the resolved row and whether the key matched exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelMatch<'a> {
    pub spec: &'a ChannelSpec,
    pub exact: bool,
}

/// Channel capacity table.
#[derive(Debug, Clone, Default)]
pub struct ChannelStore {
    /// Rows per family, sorted by (slab thickness, bracket centres)
    families: BTreeMap<String, Vec<ChannelSpec>>,
}

impl ChannelStore {
    /// The table embedded in the crate, parsed on first use
    pub fn embedded() -> CalcResult<&'static ChannelStore> {
        EMBEDDED.as_ref().map_err(Clone::clone)
    }

    /// Build a store from rows (used by tests and adapters with their own data)
    pub fn from_rows(rows: impl IntoIterator<Item = ChannelSpec>) -> Self {
        let mut families: BTreeMap<String, Vec<ChannelSpec>> = BTreeMap::new();
        for row in rows {
            families.entry(row.channel_type.clone()).or_default().push(row);
        }
        for rows in families.values_mut() {
            rows.sort_by(|a, b| {
                a.slab_thickness
                    .total_cmp(&b.slab_thickness)
                    .then(a.bracket_centres.total_cmp(&b.bracket_centres))
            });
        }
        ChannelStore { families }
    }

    /// Parse the CSV capacity table.
    ///
    /// Columns are located by header name, so their order does not matter.
    pub fn from_csv_str(text: &str, source: &str) -> CalcResult<Self> {
        let mut lines = text.lines();

        let header_line = lines
            .next()
            .ok_or_else(|| CalcError::file_error("parse", source, "CSV is empty"))?;
        let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();
        let col_index = |name: &str| -> CalcResult<usize> {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    CalcError::file_error("parse", source, format!("Missing '{}' column", name))
                })
        };

        let type_idx = col_index("channel_type")?;
        let slab_idx = col_index("slab_thickness")?;
        let centres_idx = col_index("bracket_centres")?;
        let top_idx = col_index("top_edge_distance")?;
        let bottom_idx = col_index("bottom_edge_distance")?;
        let tension_idx = col_index("tension_capacity")?;
        let shear_idx = col_index("shear_capacity")?;

        let mut rows = Vec::new();
        for (offset, line) in lines.enumerate() {
            let line_num = offset + 2;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let number = |idx: usize, name: &str| -> CalcResult<f64> {
                fields
                    .get(idx)
                    .and_then(|s| s.parse::<f64>().ok())
                    .ok_or_else(|| {
                        CalcError::file_error(
                            "parse",
                            source,
                            format!("Line {}: invalid '{}'", line_num, name),
                        )
                    })
            };
            let channel_type = fields
                .get(type_idx)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    CalcError::file_error(
                        "parse",
                        source,
                        format!("Line {}: missing channel_type", line_num),
                    )
                })?
                .to_string();

            rows.push(ChannelSpec {
                channel_type,
                slab_thickness: number(slab_idx, "slab_thickness")?,
                bracket_centres: number(centres_idx, "bracket_centres")?,
                top_critical_edge: number(top_idx, "top_edge_distance")?,
                bottom_critical_edge: number(bottom_idx, "bottom_edge_distance")?,
                tension_capacity: number(tension_idx, "tension_capacity")?,
                shear_capacity: number(shear_idx, "shear_capacity")?,
            });
        }

        Ok(ChannelStore::from_rows(rows))
    }

    /// Resolve a channel row, falling back to the nearest tabulated key.
    pub fn lookup(
        &self,
        channel_type: &str,
        slab_thickness: f64,
        bracket_centres: f64,
    ) -> CalcResult<ChannelMatch<'_>> {
        let rows = self
            .families
            .get(channel_type)
            .filter(|rows| !rows.is_empty())
            .ok_or_else(|| {
                CalcError::missing_reference_data(
                    CHANNEL_TABLE,
                    format!(
                        "{} (slab {} mm, centres {} mm)",
                        channel_type, slab_thickness, bracket_centres
                    ),
                )
            })?;

        let slab = nearest_at_or_above(rows.iter().map(|r| r.slab_thickness), slab_thickness);
        let centres = nearest_at_or_above(
            rows.iter()
                .filter(|r| same_key(r.slab_thickness, slab))
                .map(|r| r.bracket_centres),
            bracket_centres,
        );

        let spec = rows
            .iter()
            .find(|r| same_key(r.slab_thickness, slab) && same_key(r.bracket_centres, centres))
            .ok_or_else(|| {
                CalcError::missing_reference_data(
                    CHANNEL_TABLE,
                    format!("{} (slab {} mm, centres {} mm)", channel_type, slab, centres),
                )
            })?;

        Ok(ChannelMatch {
            spec,
            exact: same_key(slab, slab_thickness) && same_key(centres, bracket_centres),
        })
    }

    /// Names of all channel families, sorted
    pub fn families(&self) -> Vec<&str> {
        self.families.keys().map(String::as_str).collect()
    }

    /// True if the family exists in the table
    pub fn contains(&self, channel_type: &str) -> bool {
        self.families.contains_key(channel_type)
    }

    /// All rows of one family, sorted by slab thickness then centres
    pub fn rows(&self, channel_type: &str) -> &[ChannelSpec] {
        self.families
            .get(channel_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of rows
    pub fn len(&self) -> usize {
        self.families.values().map(Vec::len).sum()
    }

    /// True if the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn same_key(a: f64, b: f64) -> bool {
    (a - b).abs() <= KEY_TOLERANCE
}

/// Smallest value ≥ `target`, or the largest value when every value is below it.
fn nearest_at_or_above(values: impl Iterator<Item = f64>, target: f64) -> f64 {
    let mut above: Option<f64> = None;
    let mut largest = f64::NEG_INFINITY;
    for v in values {
        largest = largest.max(v);
        if v + KEY_TOLERANCE >= target && above.map_or(true, |best| v < best) {
            above = Some(v);
        }
    }
    above.unwrap_or(largest)
}
