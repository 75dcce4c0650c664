//! # File I/O
//!
//! Reading inputs and settings, and writing results with atomic semantics:
//! serialize, write to a `.tmp` sibling, fsync, then rename over the target so
//! an interrupted run never leaves a half-written file.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use support_core::{CalcError, CalcResult, DesignInputs, EngineSettings, GeneticParameters};

fn read_to_string(path: &Path) -> CalcResult<String> {
    fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path, contents: &str) -> CalcResult<T> {
    serde_json::from_str(contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Load design inputs from a JSON file.
pub fn load_inputs(path: &Path) -> CalcResult<DesignInputs> {
    let contents = read_to_string(path)?;
    parse_json(path, &contents)
}

/// Load candidate parameters from a JSON file.
pub fn load_parameters(path: &Path) -> CalcResult<GeneticParameters> {
    let contents = read_to_string(path)?;
    parse_json(path, &contents)
}

/// Load engine settings; `.json` files are parsed as JSON, anything else as TOML.
pub fn load_settings(path: &Path) -> CalcResult<EngineSettings> {
    let contents = read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        EngineSettings::from_json_str(&contents)
    } else {
        EngineSettings::from_toml_str(&contents)
    }
}

/// Write `value` as pretty JSON to `path` atomically.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = path.with_extension("json.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const FIXTURE: &str = r#"{
        "slab_thickness": 225.0,
        "cavity_width": 200.0,
        "support_level": -200.0,
        "characteristic_load": 14.0,
        "masonry_thickness": 102.5
    }"#;

    #[test]
    fn test_load_inputs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inputs.json");
        fs::write(&path, FIXTURE).unwrap();

        let inputs = load_inputs(&path).unwrap();
        assert_eq!(inputs.slab_thickness, 225.0);
        assert_eq!(inputs.angle_vertical_leg, 60.0);
    }

    #[test]
    fn test_load_inputs_reports_bad_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ \"slab_thickness\": ").unwrap();

        let err = load_inputs(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_inputs(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_settings_by_extension() {
        let dir = tempdir().unwrap();

        let toml_path = dir.path().join("engine.toml");
        fs::write(&toml_path, "[search]\nmax_alternatives = 3\n").unwrap();
        assert_eq!(load_settings(&toml_path).unwrap().search.max_alternatives, 3);

        let json_path = dir.path().join("engine.json");
        fs::write(&json_path, r#"{ "limits": { "system_deflection": 2.5 } }"#).unwrap();
        assert_eq!(load_settings(&json_path).unwrap().limits.system_deflection, 2.5);
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("result.json");

        save_json(&EngineSettings::default(), &path).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        let written = fs::read_to_string(&path).unwrap();
        let back = EngineSettings::from_json_str(&written).unwrap();
        assert_eq!(back, EngineSettings::default());
    }
}
