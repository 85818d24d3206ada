use std::collections::BTreeSet;
use std::io::Read;

use planner_core::models::AlertDefinition;
use serde::Deserialize;
use thiserror::Error;

/// The catalog format version this loader understands.
pub const SUPPORTED_CATALOG_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Unsupported catalog version {found} (this build reads version {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Duplicate alert id: {0}")]
    DuplicateId(String),

    #[error("Alert id must not be empty")]
    EmptyId,
}

/// On-disk shape of an alert catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: u32,
    alerts: Vec<AlertDefinition>,
}

/// Loader for declarative alert catalogs.
///
/// Catalogs are JSON documents of the form
/// `{"version": 1, "alerts": [...]}`. Malformed condition trees fail at
/// load time rather than at evaluation time, so a deployed catalog never
/// half-works.
pub struct AlertCatalogLoader;

impl AlertCatalogLoader {
    pub fn load<R: Read>(reader: R) -> Result<Vec<AlertDefinition>, CatalogError> {
        let file: CatalogFile = serde_json::from_reader(reader)?;

        if file.version != SUPPORTED_CATALOG_VERSION {
            return Err(CatalogError::UnsupportedVersion {
                found: file.version,
                supported: SUPPORTED_CATALOG_VERSION,
            });
        }

        let mut seen = BTreeSet::new();
        for definition in &file.alerts {
            if definition.id.is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if !seen.insert(definition.id.as_str()) {
                return Err(CatalogError::DuplicateId(definition.id.clone()));
            }
        }

        Ok(file.alerts)
    }
}

#[cfg(test)]
mod tests {
    use planner_core::models::{AlertPriority, Comparison, Condition, FieldRef, Operand};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const SAMPLE: &str = r#"{
        "version": 1,
        "alerts": [
            {
                "id": "amt-exposure",
                "category": "amt",
                "priority": "critical",
                "condition": {
                    "leaf": { "field": "amt_owed", "op": "gt", "value": "0" }
                },
                "message": "Projected AMT of {amt_owed}",
                "deadline": { "rule": "filing_deadline" }
            },
            {
                "id": "harvest-window",
                "category": "capital-gains",
                "priority": "info",
                "condition": {
                    "all": [
                        { "leaf": { "field": "short_term_gains", "op": "gt", "value": "0" } },
                        { "leaf": { "field": "capital_loss_carryforward", "op": "eq", "value": "0" } }
                    ]
                },
                "message": "Short-term gains with no loss carryforward",
                "deadline": { "rule": "end_of_year" }
            }
        ]
    }"#;

    #[test]
    fn loads_a_well_formed_catalog() {
        let alerts = AlertCatalogLoader::load(SAMPLE.as_bytes()).unwrap();

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].id, "amt-exposure");
        assert_eq!(alerts[0].priority, AlertPriority::Critical);
        assert_eq!(
            alerts[0].condition,
            Condition::Leaf {
                field: FieldRef::AmtOwed,
                comparison: Comparison::Gt {
                    value: Operand::Literal(dec!(0)),
                },
            }
        );
    }

    #[test]
    fn rejects_a_future_version() {
        let doc = r#"{ "version": 2, "alerts": [] }"#;
        let err = AlertCatalogLoader::load(doc.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UnsupportedVersion {
                found: 2,
                supported: 1
            }
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let doc = r#"{
            "version": 1,
            "alerts": [
                {
                    "id": "dup", "category": "x", "priority": "info",
                    "condition": { "all": [] }, "message": "a", "deadline": null
                },
                {
                    "id": "dup", "category": "x", "priority": "info",
                    "condition": { "all": [] }, "message": "b", "deadline": null
                }
            ]
        }"#;
        let err = AlertCatalogLoader::load(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "dup"));
    }

    #[test]
    fn rejects_an_unknown_field_reference() {
        let doc = r#"{
            "version": 1,
            "alerts": [
                {
                    "id": "bad", "category": "x", "priority": "info",
                    "condition": {
                        "leaf": { "field": "not_a_field", "op": "gt", "value": "0" }
                    },
                    "message": "x", "deadline": null
                }
            ]
        }"#;
        let err = AlertCatalogLoader::load(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, CatalogError::JsonParse(_)));
    }
}
