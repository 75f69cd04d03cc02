//! Engine options

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use takeoff_core::SumColumn;

use crate::error::{EngineError, Result};

/// Options for a pipeline run
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use takeoff::EngineOptions;
///
/// let options = EngineOptions::from_json_str(r#"{ "rounding_step_ft": 2.5 }"#).unwrap();
/// assert_eq!(options.rounding_step_ft, 2.5);
/// assert_eq!(options.calculation_sheet, "Calculations Sheet");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Name of the calculation worksheet (default: `Calculations Sheet`)
    pub calculation_sheet: String,
    /// Name of the proposal worksheet (default: `Proposal Sheet`)
    pub proposal_sheet: String,
    /// Step averaged lengths are rounded up to, in feet (default: 5)
    pub rounding_step_ft: f64,
    /// Reference code used when no raw record matches a family
    pub default_reference: String,
    /// Marker written in place of an unknown proposal token
    pub placeholder: String,
    /// First 1-based row of the proposal worksheet
    pub proposal_start_row: u32,
    /// Extra or replacement aggregation rules, keyed by subsection name
    pub extra_rules: BTreeMap<String, Vec<SumColumn>>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            calculation_sheet: "Calculations Sheet".to_string(),
            proposal_sheet: "Proposal Sheet".to_string(),
            rounding_step_ft: 5.0,
            default_reference: "SOE-100.00".to_string(),
            placeholder: "#".to_string(),
            proposal_start_row: 1,
            extra_rules: BTreeMap::new(),
        }
    }
}

impl EngineOptions {
    /// Parse options from JSON and validate them
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: EngineOptions = serde_json::from_str(json)
            .map_err(|e| EngineError::config(format!("cannot parse options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Read options from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| EngineError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Check values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.rounding_step_ft.is_finite() && self.rounding_step_ft > 0.0) {
            return Err(EngineError::config(format!(
                "rounding_step_ft must be positive, got {}",
                self.rounding_step_ft
            )));
        }
        if self.calculation_sheet.trim().is_empty() || self.proposal_sheet.trim().is_empty() {
            return Err(EngineError::config("sheet names cannot be empty"));
        }
        if self
            .calculation_sheet
            .eq_ignore_ascii_case(&self.proposal_sheet)
        {
            return Err(EngineError::config(format!(
                "calculation and proposal sheets share the name '{}'",
                self.calculation_sheet
            )));
        }
        if self.proposal_start_row == 0 {
            return Err(EngineError::config("proposal_start_row is 1-based"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let options = EngineOptions::default();
        assert_eq!(options.rounding_step_ft, 5.0);
        assert_eq!(options.placeholder, "#");
        assert_eq!(options.default_reference, "SOE-100.00");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let options = EngineOptions::from_json_str(
            r#"{ "default_reference": "SOE-200.00", "extra_rules": { "Custom ties": ["Ft", "Qty"] } }"#,
        )
        .unwrap();
        assert_eq!(options.default_reference, "SOE-200.00");
        assert_eq!(
            options.extra_rules.get("Custom ties"),
            Some(&vec![SumColumn::Ft, SumColumn::Qty])
        );
        assert_eq!(options.calculation_sheet, "Calculations Sheet");
    }

    #[test]
    fn test_invalid_options() {
        assert!(matches!(
            EngineOptions::from_json_str(r#"{ "rounding_step_ft": 0 }"#),
            Err(EngineError::Config(_))
        ));
        assert!(matches!(
            EngineOptions::from_json_str(r#"{ "proposal_sheet": "calculations sheet" }"#),
            Err(EngineError::Config(_))
        ));
        assert!(EngineOptions::from_json_str("not json").is_err());
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{ "placeholder": "??" }"#).unwrap();
        let options = EngineOptions::from_path(&path).unwrap();
        assert_eq!(options.placeholder, "??");
        assert!(EngineOptions::from_path(dir.path().join("missing.json")).is_err());
    }
}
