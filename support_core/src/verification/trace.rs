//! # Verification Trace
//!
//! Observers for the intermediate quantities of the verification pipeline.
//! A trace is passed explicitly into [`super::verify`]; stages report every
//! quantity they compute and any note explaining a failure.
//!
//! - [`NoTrace`] discards everything (used by the optimizer)
//! - [`RecordingTrace`] keeps an ordered audit trail
//! - [`LogTrace`] forwards entries as `tracing` events at TRACE level

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Receives intermediate quantities from verification stages.
pub trait VerificationTrace {
    /// A named quantity computed by `stage`
    fn record(&mut self, stage: &'static str, name: &'static str, value: f64);

    /// A free-text note from `stage` (fallbacks, degenerate cases)
    fn note(&mut self, stage: &'static str, message: &str) {
        let _ = (stage, message);
    }
}

/// Discards every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl VerificationTrace for NoTrace {
    fn record(&mut self, _stage: &'static str, _name: &'static str, _value: f64) {}
}

/// One recorded quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub stage: String,
    pub name: String,
    pub value: f64,
}

/// One recorded note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceNote {
    pub stage: String,
    pub message: String,
}

/// Ordered audit trail of everything the pipeline computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingTrace {
    pub entries: Vec<TraceEntry>,
    pub notes: Vec<TraceNote>,
}

impl RecordingTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries recorded by one stage, in order
    pub fn stage(&self, stage: &str) -> impl Iterator<Item = &TraceEntry> {
        let stage = stage.to_string();
        self.entries.iter().filter(move |e| e.stage == stage)
    }

    /// Last value recorded under `stage`/`name`
    pub fn value(&self, stage: &str, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.stage == stage && e.name == name)
            .map(|e| e.value)
    }
}

impl VerificationTrace for RecordingTrace {
    fn record(&mut self, stage: &'static str, name: &'static str, value: f64) {
        self.entries.push(TraceEntry {
            stage: stage.to_string(),
            name: name.to_string(),
            value,
        });
    }

    fn note(&mut self, stage: &'static str, message: &str) {
        self.notes.push(TraceNote {
            stage: stage.to_string(),
            message: message.to_string(),
        });
    }
}

/// Emits each entry as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTrace;

impl VerificationTrace for LogTrace {
    fn record(&mut self, stage: &'static str, name: &'static str, value: f64) {
        trace!(stage, name, value, "verification quantity");
    }

    fn note(&mut self, stage: &'static str, message: &str) {
        trace!(stage, note = message, "verification note");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_trace_keeps_order() {
        let mut trace = RecordingTrace::new();
        trace.record("moment", "applied_moment", 0.5);
        trace.record("shear", "shear_force", 9.45);
        trace.record("moment", "utilisation", 89.4);
        trace.note("fixing", "channel row fallback");

        let moment: Vec<&str> = trace.stage("moment").map(|e| e.name.as_str()).collect();
        assert_eq!(moment, vec!["applied_moment", "utilisation"]);
        assert_eq!(trace.value("shear", "shear_force"), Some(9.45));
        assert_eq!(trace.value("shear", "missing"), None);
        assert_eq!(trace.notes.len(), 1);
    }

    #[test]
    fn test_no_trace_accepts_notes() {
        let mut trace = NoTrace;
        trace.record("moment", "x", 1.0);
        trace.note("moment", "ignored");
    }
}
