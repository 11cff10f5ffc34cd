use serde::Deserialize;

use crate::error::ProfileError;

// ---------------------------------------------------------------------------
// Column profile
// ---------------------------------------------------------------------------

/// Localized column names and token sets the pipeline keys on.
///
/// Defaults match the Chinese BOM exports this tool was built for; deployments
/// with differently-labelled sources override them from a TOML file. The
/// profile is passed explicitly through ingest, clean, reconcile, and export;
/// there is no global.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnProfile {
    /// Primary key column (part number).
    pub part_number: String,
    /// Secondary key column (supplier part number).
    pub supplier_part_number: String,
    /// Customer part number; only participates in header detection.
    pub customer_part_number: String,
    pub quantity: String,
    /// Part type column. `TYPE` is also consulted as a literal fallback in
    /// the wire report when this column is absent.
    pub kind: String,
    /// Name of the appended tag column on exported coloured sheets.
    pub compare_tag: String,
    /// A grid row whose first cell contains one of these is the header row.
    pub header_keywords: Vec<String>,
    /// Exact-match type values identifying wire/harness parts.
    pub wire_types: Vec<String>,
}

impl Default for ColumnProfile {
    fn default() -> Self {
        Self {
            part_number: "零件号".into(),
            supplier_part_number: "供应商零件号".into(),
            customer_part_number: "客户零件号".into(),
            quantity: "数量".into(),
            kind: "类型".into(),
            compare_tag: "对比标记".into(),
            header_keywords: vec!["零件号".into(), "供应商零件号".into(), "客户零件号".into()],
            wire_types: vec!["WIRE".into(), "线束".into(), "导线".into()],
        }
    }
}

impl ColumnProfile {
    pub fn from_toml(input: &str) -> Result<Self, ProfileError> {
        let profile: ColumnProfile =
            toml::from_str(input).map_err(|e| ProfileError::Parse(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        let named = [
            ("part_number", &self.part_number),
            ("supplier_part_number", &self.supplier_part_number),
            ("customer_part_number", &self.customer_part_number),
            ("quantity", &self.quantity),
            ("kind", &self.kind),
            ("compare_tag", &self.compare_tag),
        ];
        for (field, value) in named {
            if value.trim().is_empty() {
                return Err(ProfileError::Validation(format!(
                    "column name '{field}' must not be empty"
                )));
            }
        }
        if self.header_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ProfileError::Validation(
                "at least one header keyword is required".into(),
            ));
        }
        if self.wire_types.iter().all(|t| t.trim().is_empty()) {
            return Err(ProfileError::Validation(
                "at least one wire type token is required".into(),
            ));
        }
        Ok(())
    }

    /// Columns floated to the front of every ingested table, in order.
    pub fn priority_columns(&self) -> [&str; 4] {
        [
            self.part_number.as_str(),
            self.supplier_part_number.as_str(),
            self.kind.as_str(),
            self.quantity.as_str(),
        ]
    }

    pub fn is_wire_type(&self, value: &str) -> bool {
        self.wire_types.iter().any(|t| t == value)
    }

    pub fn matches_header_keyword(&self, cell: &str) -> bool {
        self.header_keywords
            .iter()
            .any(|k| !k.is_empty() && cell.contains(k.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
