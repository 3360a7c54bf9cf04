//! Row layout of the tabular exports.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::StoredRecord;
use crate::scorer::compute_accuracy;

/// File format of a tabular export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Spreadsheet workbook with a single "Analytics" sheet.
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    /// `Content-Type` used when the file is downloaded.
    pub fn media_type(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format: {other} (expected xlsx or csv)")),
        }
    }
}

/// Columns holding numbers; spreadsheet exports write them as numeric cells.
pub const NUMERIC_COLUMNS: [usize; 5] = [5, 6, 7, 10, 12];

/// Fixed header of the export file.
pub const EXPORT_HEADER: [&str; 18] = [
    "id",
    "ts",
    "role",
    "user_name",
    "user_email",
    "accuracy",
    "concern",
    "damage",
    "would_use",
    "pay",
    "encounter",
    "scan_label",
    "scan_score",
    "b2b_verify",
    "b2b_damage",
    "b2b_api",
    "b2b_size",
    "b2b_demo",
];

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Flatten a stored record into export cells. Unset values are empty cells.
pub fn export_row(stored: &StoredRecord) -> Vec<String> {
    let record = &stored.record;
    let contact = record.contact.as_ref();
    let profile = record.business_profile.as_ref();
    let scan = record.scan_result.as_ref();

    let accuracy = compute_accuracy(record);
    let accuracy = (accuracy.total_count > 0).then_some(accuracy.percent);

    vec![
        stored.id.to_string(),
        stored.ts.to_rfc3339(),
        cell(record.effective_role()),
        contact.map(|c| c.name.clone()).unwrap_or_default(),
        contact.map(|c| c.email.clone()).unwrap_or_default(),
        cell(accuracy),
        cell(record.concern_level),
        cell(record.damage_level),
        cell(record.would_use_tool),
        cell(record.willingness_to_pay),
        cell(record.encounter_level),
        cell(scan.map(|s| s.label)),
        cell(scan.map(|s| s.score)),
        cell(profile.and_then(|p| p.verify)),
        cell(profile.and_then(|p| p.damage)),
        cell(profile.and_then(|p| p.api)),
        cell(profile.and_then(|p| p.size.clone())),
        cell(profile.and_then(|p| p.demo)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BusinessProfile, Contact, PayIntent, QuizAnswer, ResponseRecord, Role, ScanResult,
        Verdict, YesNo,
    };

    #[test]
    fn full_row_matches_header() {
        let stored = StoredRecord::stamp(ResponseRecord {
            quiz_answers: vec![
                QuizAnswer {
                    item_index: 0,
                    choice: Verdict::Real,
                    correct: false,
                },
                QuizAnswer {
                    item_index: 1,
                    choice: Verdict::Real,
                    correct: true,
                },
            ],
            encounter_level: Some(2),
            concern_level: Some(7),
            damage_level: Some(8),
            would_use_tool: Some(YesNo::Yes),
            willingness_to_pay: Some(PayIntent::Maybe),
            role: None,
            business_profile: Some(BusinessProfile {
                verify: Some(YesNo::No),
                damage: Some(YesNo::No),
                api: Some(YesNo::Yes),
                size: Some("1–10".into()),
                demo: Some(YesNo::No),
            }),
            scan_result: Some(ScanResult {
                score: 82,
                label: Verdict::Real,
                explanation: "Stable lighting".into(),
            }),
            contact: Some(Contact {
                name: "Seed User".into(),
                email: "seed@example.com".into(),
                role: Some(Role::Professional),
            }),
        });

        let row = export_row(&stored);
        assert_eq!(row.len(), EXPORT_HEADER.len());
        assert_eq!(row[0], stored.id.to_string());
        assert_eq!(
            &row[2..],
            &[
                "Professional",
                "Seed User",
                "seed@example.com",
                "50",
                "7",
                "8",
                "Yes",
                "Maybe",
                "2",
                "Real",
                "82",
                "No",
                "No",
                "Yes",
                "1–10",
                "No",
            ]
        );
    }

    #[test]
    fn numeric_columns_are_the_numeric_fields() {
        let names: Vec<&str> = NUMERIC_COLUMNS.iter().map(|&i| EXPORT_HEADER[i]).collect();
        assert_eq!(names, ["accuracy", "concern", "damage", "encounter", "scan_score"]);
    }

    #[test]
    fn format_parsing() {
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("ods".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn empty_record_has_blank_cells() {
        let row = export_row(&StoredRecord::stamp(ResponseRecord::default()));
        assert_eq!(row.len(), EXPORT_HEADER.len());
        assert!(row[2..].iter().all(String::is_empty));
    }
}
