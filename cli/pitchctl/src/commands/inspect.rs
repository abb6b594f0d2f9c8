//! Offline identifier commands: parse, validate, parent, describe.
//!
//! None of these touch a store; they only read the identifier grammar and
//! the code tables.

use anyhow::Result;
use clap::Args;
use pitchside_id::{get_parent_job_id, parse_id, AnyId, Decoded, EntityKind};
use serde::Serialize;
use tabled::Tabled;

use super::CommandContext;
use crate::error::CliError;
use crate::output::{dash, print_output, print_record, print_row};

fn parse(id: &str) -> Result<AnyId, CliError> {
    parse_id(id).map_err(|source| CliError::invalid_id(id, source))
}

// =============================================================================
// parse
// =============================================================================

#[derive(Debug, Args)]
pub struct ParseCommand {
    /// Identifier to decode, e.g. ACOBAPA001001.
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParsedId {
    id: String,
    #[serde(flatten)]
    decoded: Decoded,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_job_id: Option<String>,
}

#[derive(Debug, Tabled)]
struct ParsedRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Type")]
    kind: EntityKind,

    #[tabled(rename = "Category")]
    category: String,

    #[tabled(rename = "City")]
    city: String,

    #[tabled(rename = "Area")]
    area: String,

    #[tabled(rename = "Seq")]
    sequence: String,

    #[tabled(rename = "Job Seq")]
    job_sequence: String,

    #[tabled(rename = "App Seq")]
    app_sequence: String,
}

impl From<&ParsedId> for ParsedRow {
    fn from(parsed: &ParsedId) -> Self {
        let d = &parsed.decoded;
        Self {
            id: parsed.id.clone(),
            kind: d.kind,
            category: d.category_code.to_string(),
            city: d.city_code.to_string(),
            area: d.area_code.to_string(),
            sequence: dash(d.sequence),
            job_sequence: dash(d.job_sequence),
            app_sequence: dash(d.app_sequence),
        }
    }
}

impl ParseCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let id = parse(&self.id)?;
        let parsed = ParsedId {
            id: id.to_string(),
            decoded: id.decode(),
            parent_job_id: get_parent_job_id(&self.id),
        };
        print_record(ParsedRow::from(&parsed), &parsed, ctx.format);
        Ok(())
    }
}

// =============================================================================
// validate
// =============================================================================

#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Identifiers to check.
    #[arg(required = true)]
    ids: Vec<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct ValidationRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Valid")]
    valid: bool,

    #[tabled(rename = "Type")]
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    kind: String,

    #[tabled(rename = "Reason")]
    #[serde(skip_serializing_if = "String::is_empty")]
    reason: String,
}

impl ValidationRow {
    fn check(id: &str) -> Self {
        match parse_id(id) {
            Ok(parsed) => Self {
                id: id.to_string(),
                valid: true,
                kind: parsed.kind().to_string(),
                reason: String::new(),
            },
            Err(e) => Self {
                id: id.to_string(),
                valid: false,
                kind: String::new(),
                reason: e.to_string(),
            },
        }
    }
}

impl ValidateCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let rows: Vec<ValidationRow> = self.ids.iter().map(|id| ValidationRow::check(id)).collect();
        print_output(&rows, ctx.format);

        let invalid = rows.iter().filter(|row| !row.valid).count();
        if invalid > 0 {
            return Err(CliError::InvalidIds {
                invalid,
                total: rows.len(),
            }
            .into());
        }
        Ok(())
    }
}

// =============================================================================
// parent
// =============================================================================

#[derive(Debug, Args)]
pub struct ParentCommand {
    /// Application identifier, e.g. ACOBAPA001001.
    id: String,
}

#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct ParentRow {
    #[tabled(rename = "Application")]
    id: String,

    #[tabled(rename = "Parent Job")]
    parent_job_id: String,
}

impl ParentCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let app = match parse(&self.id)? {
            AnyId::Application(app) => app,
            other => {
                return Err(CliError::NotAnApplication {
                    id: other.to_string(),
                    kind: other.kind().to_string(),
                }
                .into())
            }
        };
        let row = ParentRow {
            id: app.to_string(),
            parent_job_id: app.parent_job_id().to_string(),
        };
        print_row(row, ctx.format);
        Ok(())
    }
}

// =============================================================================
// describe
// =============================================================================

#[derive(Debug, Args)]
pub struct DescribeCommand {
    /// Identifier to describe.
    id: String,
}

#[derive(Debug, Serialize, Tabled)]
struct DescriptionRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Description")]
    description: String,
}

impl DescribeCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let id = parse(&self.id)?;
        let row = DescriptionRow {
            id: id.to_string(),
            description: id.describe(),
        };
        print_row(row, ctx.format);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("JPLCHVE001", true, "job")]
    #[case("ACOBAPA001001", true, "application")]
    #[case("BVEMAAN999", true, "booking")]
    #[case("", false, "")]
    #[case("XYZ", false, "")]
    #[case("J12", false, "")]
    #[case("JPLCHVE000", false, "")]
    fn validation_rows(#[case] id: &str, #[case] valid: bool, #[case] kind: &str) {
        let row = ValidationRow::check(id);
        assert_eq!(row.valid, valid);
        assert_eq!(row.kind, kind);
        assert_eq!(row.reason.is_empty(), valid);
    }

    #[test]
    fn parsed_application_json_shape() {
        let id = parse_id("ACOBAPA001001").unwrap();
        let parsed = ParsedId {
            id: id.to_string(),
            decoded: id.decode(),
            parent_job_id: get_parent_job_id("ACOBAPA001001"),
        };
        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "ACOBAPA001001",
                "type": "application",
                "categoryCode": "CO",
                "cityCode": "BA",
                "areaCode": "PA",
                "jobSequence": "001",
                "appSequence": "001",
                "parentJobId": "JCOBAPA001",
            })
        );
    }

    #[test]
    fn parsed_job_row_dashes_application_fields() {
        let id = parse_id("JPLCHVE004").unwrap();
        let parsed = ParsedId {
            id: id.to_string(),
            decoded: id.decode(),
            parent_job_id: None,
        };
        let row = ParsedRow::from(&parsed);
        assert_eq!(row.sequence, "004");
        assert_eq!(row.job_sequence, "-");
        assert_eq!(row.app_sequence, "-");
    }

    #[test]
    fn parent_rejects_jobs() {
        let cmd = ParentCommand {
            id: "JCOBAPA001".to_string(),
        };
        let err = cmd
            .run(CommandContext {
                format: crate::output::OutputFormat::Json,
            })
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::NotAnApplication { .. })
        ));
    }
}
