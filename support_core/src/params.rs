//! # Candidate Parameters
//!
//! [`GeneticParameters`] holds the free variables of one candidate design.
//! One value is produced per enumerated candidate and never mutated.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::materials::BoltSize;

/// Bracket orientation on the slab edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BracketType {
    /// Hangs down from the fixing (support below slab level)
    Standard,
    /// Stands up from the fixing (support at or above slab level)
    Inverted,
}

/// Angle orientation on the bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AngleOrientation {
    /// Vertical leg rises from the horizontal leg
    Standard,
    /// Vertical leg hangs below the horizontal leg
    Inverted,
}

impl std::fmt::Display for BracketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketType::Standard => write!(f, "Standard"),
            BracketType::Inverted => write!(f, "Inverted"),
        }
    }
}

impl std::fmt::Display for AngleOrientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AngleOrientation::Standard => write!(f, "Standard"),
            AngleOrientation::Inverted => write!(f, "Inverted"),
        }
    }
}

/// Free variables of one candidate.
///
/// Field order is also the tie-break order used when two candidates weigh the same.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticParameters {
    /// Bracket centres (mm)
    pub bracket_centres: f64,

    /// Bracket plate thickness (mm)
    pub bracket_thickness: f64,

    /// Angle thickness (mm)
    pub angle_thickness: f64,

    /// Angle-to-bracket bolt
    pub bolt_size: BoltSize,

    pub bracket_type: BracketType,

    pub angle_orientation: AngleOrientation,

    /// Fixing position below slab top (mm)
    pub fixing_position: f64,

    /// Bracket bottom to fixing (mm), inverted brackets only
    pub dim_d: Option<f64>,

    /// Channel family; `None` for steel fixing
    pub channel_type: Option<String>,
}

impl GeneticParameters {
    /// Deterministic total order over all fields, in declaration order.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.bracket_centres
            .total_cmp(&other.bracket_centres)
            .then(self.bracket_thickness.total_cmp(&other.bracket_thickness))
            .then(self.angle_thickness.total_cmp(&other.angle_thickness))
            .then(self.bolt_size.cmp(&other.bolt_size))
            .then(self.bracket_type.cmp(&other.bracket_type))
            .then(self.angle_orientation.cmp(&other.angle_orientation))
            .then(self.fixing_position.total_cmp(&other.fixing_position))
            .then(cmp_optional_f64(self.dim_d, other.dim_d))
            .then(self.channel_type.cmp(&other.channel_type))
    }

    /// Human-readable list of fields that differ from `reference`.
    ///
    /// Each entry reads `field: reference -> self`.
    pub fn differences_from(&self, reference: &Self) -> Vec<String> {
        let mut out = Vec::new();
        let mut number = |name: &str, a: f64, b: f64| {
            if a != b {
                out.push(format!("{}: {} -> {}", name, a, b));
            }
        };
        number("bracket_centres", reference.bracket_centres, self.bracket_centres);
        number("bracket_thickness", reference.bracket_thickness, self.bracket_thickness);
        number("angle_thickness", reference.angle_thickness, self.angle_thickness);

        if self.bolt_size != reference.bolt_size {
            out.push(format!("bolt_size: {} -> {}", reference.bolt_size, self.bolt_size));
        }
        if self.bracket_type != reference.bracket_type {
            out.push(format!(
                "bracket_type: {} -> {}",
                reference.bracket_type, self.bracket_type
            ));
        }
        if self.angle_orientation != reference.angle_orientation {
            out.push(format!(
                "angle_orientation: {} -> {}",
                reference.angle_orientation, self.angle_orientation
            ));
        }
        if self.fixing_position != reference.fixing_position {
            out.push(format!(
                "fixing_position: {} -> {}",
                reference.fixing_position, self.fixing_position
            ));
        }
        if self.dim_d != reference.dim_d {
            out.push(format!(
                "dim_d: {} -> {}",
                describe(reference.dim_d.map(|v| v.to_string())),
                describe(self.dim_d.map(|v| v.to_string()))
            ));
        }
        if self.channel_type != reference.channel_type {
            out.push(format!(
                "channel_type: {} -> {}",
                describe(reference.channel_type.clone()),
                describe(self.channel_type.clone())
            ));
        }
        out
    }
}

fn cmp_optional_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.total_cmp(&y),
    }
}

fn describe(value: Option<String>) -> String {
    value.unwrap_or_else(|| "none".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GeneticParameters {
        GeneticParameters {
            bracket_centres: 500.0,
            bracket_thickness: 4.0,
            angle_thickness: 6.0,
            bolt_size: BoltSize::M10,
            bracket_type: BracketType::Standard,
            angle_orientation: AngleOrientation::Standard,
            fixing_position: 75.0,
            dim_d: None,
            channel_type: Some("CPRO50".to_string()),
        }
    }

    #[test]
    fn test_canonical_order_follows_field_order() {
        let a = params();
        let mut b = params();
        b.fixing_position = 80.0;
        assert_eq!(a.canonical_cmp(&b), Ordering::Less);

        // Earlier field dominates later ones
        b.bracket_centres = 450.0;
        assert_eq!(a.canonical_cmp(&b), Ordering::Greater);
        assert_eq!(a.canonical_cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn test_differences() {
        let a = params();
        let mut b = params();
        b.angle_thickness = 8.0;
        b.channel_type = Some("CPRO38".to_string());
        let diffs = b.differences_from(&a);
        assert_eq!(
            diffs,
            vec![
                "angle_thickness: 6 -> 8".to_string(),
                "channel_type: CPRO50 -> CPRO38".to_string(),
            ]
        );
        assert!(a.differences_from(&a).is_empty());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&params()).unwrap();
        assert!(json.contains("\"bolt_size\":\"M10\""));
        let back: GeneticParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params());
    }
}
