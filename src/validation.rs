//! Value checks shared by the HTTP handlers and the backup restore path.

use crate::models::{BackupDocument, SettingsField, UserSettings};
use chrono::{Datelike, NaiveDate};

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidValue {
    #[error("weight must be a positive number")]
    Weight,

    #[error("monthlyLossTarget must be a non-negative number")]
    MonthlyLossTarget,

    #[error("streakGoal must be a positive integer")]
    StreakGoal,

    #[error("date must fall between years 1900 and 9999")]
    Date,
}

pub fn check_weight(weight: f64) -> Result<f64, InvalidValue> {
    if weight.is_finite() && weight > 0.0 {
        Ok(weight)
    } else {
        Err(InvalidValue::Weight)
    }
}

pub fn check_date(date: NaiveDate) -> Result<NaiveDate, InvalidValue> {
    if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        Ok(date)
    } else {
        Err(InvalidValue::Date)
    }
}

pub fn check_setting(field: &SettingsField) -> Result<(), InvalidValue> {
    match field {
        SettingsField::StartDate(date) => check_date(*date).map(|_| ()),
        SettingsField::StartWeight(value) | SettingsField::GoalWeight(value) => {
            check_weight(*value).map(|_| ())
        }
        SettingsField::MonthlyLossTarget(value) if !value.is_finite() || *value < 0.0 => {
            Err(InvalidValue::MonthlyLossTarget)
        }
        SettingsField::StreakGoal(0) => Err(InvalidValue::StreakGoal),
        _ => Ok(()),
    }
}

pub fn check_settings(settings: &UserSettings) -> Result<(), InvalidValue> {
    [
        SettingsField::StartDate(settings.start_date),
        SettingsField::StartWeight(settings.start_weight),
        SettingsField::GoalWeight(settings.goal_weight),
        SettingsField::MonthlyLossTarget(settings.monthly_loss_target),
        SettingsField::StreakGoal(settings.streak_goal),
    ]
    .iter()
    .try_for_each(check_setting)
}

/// Applies the same rules the edit endpoints enforce to every section present.
pub fn check_backup(document: &BackupDocument) -> Result<(), InvalidValue> {
    if let Some(settings) = &document.settings {
        check_settings(settings)?;
    }
    if let Some(logs) = &document.weight_logs {
        for entry in logs {
            check_date(entry.date)?;
            check_weight(entry.weight)?;
        }
    }
    if let Some(logs) = &document.daily_logs {
        for entry in logs {
            check_date(entry.date)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeightEntry;

    #[test]
    fn rejects_non_positive_weights() {
        assert!(check_weight(61.2).is_ok());
        assert_eq!(check_weight(0.0), Err(InvalidValue::Weight));
        assert_eq!(check_weight(-3.0), Err(InvalidValue::Weight));
        assert_eq!(check_weight(f64::NAN), Err(InvalidValue::Weight));
    }

    #[test]
    fn checks_each_setting_field() {
        assert_eq!(
            check_setting(&SettingsField::StreakGoal(0)),
            Err(InvalidValue::StreakGoal)
        );
        assert!(check_setting(&SettingsField::StreakGoal(3)).is_ok());
        assert_eq!(
            check_setting(&SettingsField::MonthlyLossTarget(-1.0)),
            Err(InvalidValue::MonthlyLossTarget)
        );
        assert!(check_setting(&SettingsField::MonthlyLossTarget(0.0)).is_ok());
        assert!(check_setting(&SettingsField::Name(String::new())).is_ok());
    }

    #[test]
    fn rejects_far_future_start_date() {
        let far: SettingsField =
            serde_json::from_str(r#"{"key": "startDate", "value": "+262142-12-01"}"#).unwrap();
        assert_eq!(check_setting(&far), Err(InvalidValue::Date));

        let edge = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
        assert!(check_setting(&SettingsField::StartDate(edge)).is_ok());
    }

    #[test]
    fn default_settings_pass() {
        assert!(check_settings(&UserSettings::default()).is_ok());
    }

    #[test]
    fn backup_with_bad_values_is_rejected() {
        let settings = UserSettings {
            streak_goal: 0,
            ..UserSettings::default()
        };
        let document = BackupDocument {
            settings: Some(settings),
            ..BackupDocument::default()
        };
        assert_eq!(check_backup(&document), Err(InvalidValue::StreakGoal));

        let document = BackupDocument {
            settings: Some(UserSettings::default()),
            weight_logs: Some(vec![WeightEntry {
                date: NaiveDate::from_ymd_opt(2026, 1, 3).unwrap(),
                weight: -70.0,
            }]),
            ..BackupDocument::default()
        };
        assert_eq!(check_backup(&document), Err(InvalidValue::Weight));
    }
}
