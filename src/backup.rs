use crate::models::BackupDocument;
use crate::validation::{InvalidValue, check_backup};
use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("invalid backup file: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid backup file: neither settings nor daily logs present")]
    MissingSections,

    #[error("invalid backup file: {0}")]
    Invalid(#[from] InvalidValue),
}

/// Parses an uploaded backup into the typed record shapes.
///
/// Unknown fields are ignored and unknown mood labels read as unset. A
/// document carrying neither `settings` nor `dailyLogs` is not a backup, and
/// one holding a value the edit endpoints would refuse is rejected whole.
pub fn parse_backup(raw: &str) -> Result<BackupDocument, BackupError> {
    let document: BackupDocument = serde_json::from_str(raw)?;
    if document.settings.is_none() && document.daily_logs.is_none() {
        return Err(BackupError::MissingSections);
    }
    check_backup(&document)?;
    Ok(document)
}

pub fn backup_file_name(date: NaiveDate) -> String {
    format!("bingebreaker_backup_{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Mood, Role};

    #[test]
    fn accepts_backup_from_older_app() {
        let raw = r#"{
            "dailyLogs": [
                {"date": "2026-01-04", "snacked": true, "snackDetails": "crisps", "mood": "Stressed", "notes": ""},
                {"date": "2026-01-05", "snacked": false, "mood": "Elated", "notes": "walked"}
            ],
            "chatHistory": [
                {"id": "init", "role": "model", "text": "Hi!", "timestamp": 1767225600000}
            ],
            "theme": "dark"
        }"#;

        let document = parse_backup(raw).unwrap();
        let logs = document.daily_logs.unwrap();
        assert_eq!(logs[0].mood, Mood::Stressed);
        assert_eq!(logs[0].snack_details.as_deref(), Some("crisps"));
        assert_eq!(logs[1].mood, Mood::Unset);
        assert_eq!(document.chat_history.unwrap()[0].role, Role::Assistant);
        assert!(document.settings.is_none());
        assert!(document.weight_logs.is_none());
    }

    #[test]
    fn settings_alone_is_enough() {
        let document = parse_backup(r#"{"settings": {"streakGoal": 21}}"#).unwrap();
        let settings = document.settings.unwrap();
        assert_eq!(settings.streak_goal, 21);
        assert_eq!(settings.start_weight, 62.0);
    }

    #[test]
    fn rejects_document_without_settings_or_daily_logs() {
        let err = parse_backup(r#"{"weightLogs": []}"#).unwrap_err();
        assert!(matches!(err, BackupError::MissingSections));
    }

    #[test]
    fn rejects_malformed_json_and_bad_dates() {
        assert!(matches!(parse_backup("not json"), Err(BackupError::Malformed(_))));
        assert!(matches!(
            parse_backup(r#"{"dailyLogs": [{"date": "05/01/2026", "snacked": false}]}"#),
            Err(BackupError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_values_the_edit_endpoints_refuse() {
        let raw = r#"{
            "settings": {"streakGoal": 0, "goalWeight": -5},
            "weightLogs": [{"date": "2026-01-03", "weight": -70}]
        }"#;
        assert!(matches!(
            parse_backup(raw),
            Err(BackupError::Invalid(InvalidValue::Weight))
        ));

        let raw = r#"{
            "dailyLogs": [],
            "weightLogs": [{"date": "2026-01-03", "weight": -70}]
        }"#;
        assert!(matches!(
            parse_backup(raw),
            Err(BackupError::Invalid(InvalidValue::Weight))
        ));
    }

    #[test]
    fn file_name_carries_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(backup_file_name(date), "bingebreaker_backup_2026-03-09.json");
    }
}
