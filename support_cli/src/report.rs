//! Plain-text reports for the terminal.

use std::fmt::Write;

use support_core::optimizer::{EvaluatedDesign, OptimizationResult};
use support_core::verification::RecordingTrace;
use support_core::ChannelStore;

fn design_lines(out: &mut String, design: &EvaluatedDesign) {
    let p = &design.parameters;
    let g = &design.geometry;
    let w = &design.weight;

    let _ = writeln!(
        out,
        "  Bracket: {} {} mm thick, {} mm high, {} mm projection @ {} mm centres",
        p.bracket_type, p.bracket_thickness, g.bracket_height, g.bracket_projection, p.bracket_centres
    );
    let _ = writeln!(
        out,
        "  Angle:   {} {} mm, legs {} x {} mm, {} bolt",
        p.angle_orientation,
        p.angle_thickness,
        g.angle_vertical_leg,
        g.angle_horizontal_leg,
        p.bolt_size
    );
    let channel = p.channel_type.as_deref().unwrap_or("steel fixing");
    let _ = writeln!(
        out,
        "  Fixing:  {} at {} mm, rise to bolts {} mm (worst case {} mm)",
        channel, p.fixing_position, g.rise_to_bolts_display, g.rise_to_bolts
    );
    if let Some(dim_d) = g.dim_d {
        let _ = writeln!(out, "  Dim D:   {} mm", dim_d);
    }
    if let Some(ext) = &g.angle_extension {
        let _ = writeln!(
            out,
            "  Angle extension: bracket capped {} -> {} mm, leg +{} mm",
            ext.original_bracket_height, ext.limited_bracket_height, ext.extension
        );
    }
    let _ = writeln!(
        out,
        "  Mass:    {:.3} kg/m (angle {:.3}, brackets {:.3})",
        w.total_mass_per_metre, w.angle_mass_per_metre, w.bracket_mass_per_metre
    );
}

fn check_lines(out: &mut String, design: &EvaluatedDesign) {
    for check in design.verification.summaries() {
        let status = if check.passes { "PASS" } else { "FAIL" };
        let _ = writeln!(out, "    {:<24} {:>8.1}%  {}", check.name, check.utilisation, status);
    }
}

/// Optimum, checks and alternatives
pub fn optimization(result: &OptimizationResult) -> String {
    let mut out = String::new();
    let stats = &result.statistics;

    let _ = writeln!(out, "Optimum design");
    let _ = writeln!(out, "==============");
    design_lines(&mut out, &result.best);
    let _ = writeln!(out, "  Checks:");
    check_lines(&mut out, &result.best);

    if !result.alternatives.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Alternatives");
        let _ = writeln!(out, "------------");
        for (i, alt) in result.alternatives.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:>2}. {:.3} kg/m (+{:.2}%)  {}",
                i + 1,
                alt.design.weight.total_mass_per_metre,
                alt.weight_delta_percent,
                alt.differences.join(", ")
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Searched {} candidates: {} pre-filtered, {} infeasible geometry, {} failed checks, {} passed",
        stats.enumerated,
        stats.prefiltered,
        stats.rejected_geometry,
        stats.failed_verification,
        stats.passing
    );
    out
}

/// Single-candidate verification, optionally with the audit trail
pub fn verification(design: &EvaluatedDesign, trace: Option<&RecordingTrace>) -> String {
    let mut out = String::new();
    let verdict = if design.verification.passes { "PASSES" } else { "FAILS" };
    let _ = writeln!(out, "Candidate {}", verdict);
    design_lines(&mut out, design);
    let _ = writeln!(out, "  Checks:");
    check_lines(&mut out, design);
    if let Some(governing) = design.verification.governing_check() {
        let _ = writeln!(
            out,
            "  Governing: {} at {:.1}%",
            governing.name, governing.utilisation
        );
    }

    if let Some(trace) = trace {
        let _ = writeln!(out);
        let _ = writeln!(out, "Trace");
        let _ = writeln!(out, "-----");
        for entry in &trace.entries {
            let _ = writeln!(out, "  {:<24} {:<26} {}", entry.stage, entry.name, entry.value);
        }
        for note in &trace.notes {
            let _ = writeln!(out, "  note [{}]: {}", note.stage, note.message);
        }
    }
    out
}

/// Channel catalogue, optionally one family only
pub fn channels(store: &ChannelStore, family: Option<&str>) -> String {
    let mut out = String::new();
    let families: Vec<&str> = match family {
        Some(f) => vec![f],
        None => store.families(),
    };
    for name in families {
        let rows = store.rows(name);
        let _ = writeln!(out, "{} ({} rows)", name, rows.len());
        if family.is_some() {
            let _ = writeln!(
                out,
                "  {:>6} {:>8} {:>6} {:>6} {:>9} {:>9}",
                "slab", "centres", "top", "bottom", "N_Rd kN", "V_Rd kN"
            );
            for row in rows {
                let _ = writeln!(
                    out,
                    "  {:>6} {:>8} {:>6} {:>6} {:>9.2} {:>9.2}",
                    row.slab_thickness,
                    row.bracket_centres,
                    row.top_critical_edge,
                    row.bottom_critical_edge,
                    row.tension_capacity,
                    row.shear_capacity
                );
            }
        }
    }
    out
}
