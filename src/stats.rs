use crate::models::{
    ChartPoint, DailyEntry, DashboardResponse, DateWindow, DayStatus, DayStatusPoint,
    StreakProgress, UserSettings, WeeklyTrend, WeightComparison, WeightEntry,
    WeightProgressResponse,
};
use chrono::{Duration, Local, NaiveDate};

const DAYS_PER_MONTH: f64 = 30.0;
const CHART_STEP_DAYS: i64 = 15;
const CHART_TARGET_POINTS: i64 = 15;

pub fn build_dashboard(
    daily: &[DailyEntry],
    weights: &[WeightEntry],
    settings: &UserSettings,
) -> DashboardResponse {
    build_dashboard_at(today(), daily, weights, settings)
}

pub fn build_dashboard_at(
    today: NaiveDate,
    daily: &[DailyEntry],
    weights: &[WeightEntry],
    settings: &UserSettings,
) -> DashboardResponse {
    let streak = current_streak(daily);

    DashboardResponse {
        date: today,
        name: settings.name.clone(),
        streak: streak_progress(streak, settings.streak_goal),
        today: daily.iter().find(|entry| entry.date == today).cloned(),
        recent_days: recent_days_at(today, daily),
        weight: weight_comparison_at(today, settings, weights),
        weekly_trend: weekly_trend_at(today, weights),
    }
}

pub fn build_weight_progress(
    weights: &[WeightEntry],
    settings: &UserSettings,
) -> WeightProgressResponse {
    build_weight_progress_at(today(), weights, settings)
}

pub fn build_weight_progress_at(
    today: NaiveDate,
    weights: &[WeightEntry],
    settings: &UserSettings,
) -> WeightProgressResponse {
    WeightProgressResponse {
        comparison: weight_comparison_at(today, settings, weights),
        weekly_trend: weekly_trend_at(today, weights),
        chart: weight_chart(settings, weights),
    }
}

/// Consecutive clean entries counted back from the most recent one.
///
/// Only recorded days are walked: a date with no entry neither breaks nor
/// extends the streak.
pub fn current_streak(entries: &[DailyEntry]) -> u32 {
    let mut sorted: Vec<&DailyEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut streak = 0;
    for entry in sorted {
        if entry.snacked {
            break;
        }
        streak += 1;
    }
    streak
}

pub fn streak_progress(streak: u32, goal: u32) -> StreakProgress {
    let percent = if goal == 0 {
        0.0
    } else {
        (f64::from(streak) / f64::from(goal) * 100.0).min(100.0)
    };

    StreakProgress {
        streak,
        goal,
        percent,
        goal_met: streak >= goal,
    }
}

/// Straight-line target from the start weight at `monthly_loss_target / 30`
/// per day, floored at the goal. `None` before the start date.
pub fn target_weight_on(
    start_date: NaiveDate,
    start_weight: f64,
    goal_weight: f64,
    monthly_loss_target: f64,
    date: NaiveDate,
) -> Option<f64> {
    let days_elapsed = (date - start_date).num_days();
    if days_elapsed < 0 {
        return None;
    }

    let daily_loss_rate = monthly_loss_target / DAYS_PER_MONTH;
    Some(goal_weight.max(start_weight - days_elapsed as f64 * daily_loss_rate))
}

pub fn target_weight_for(settings: &UserSettings, date: NaiveDate) -> Option<f64> {
    target_weight_on(
        settings.start_date,
        settings.start_weight,
        settings.goal_weight,
        settings.monthly_loss_target,
        date,
    )
}

/// `weights` must be sorted ascending, as the weight store keeps them.
pub fn weight_comparison_at(
    today: NaiveDate,
    settings: &UserSettings,
    weights: &[WeightEntry],
) -> Option<WeightComparison> {
    let target = target_weight_for(settings, today)?;
    let current = weights
        .last()
        .map(|entry| entry.weight)
        .unwrap_or(settings.start_weight);
    let diff = current - target;

    Some(WeightComparison {
        target,
        current,
        diff,
        on_track: diff <= 0.0,
    })
}

pub fn weekly_trend_at(today: NaiveDate, weights: &[WeightEntry]) -> WeeklyTrend {
    let current_window = DateWindow {
        start: today - Duration::days(6),
        end: today,
    };
    let previous_window = DateWindow {
        start: today - Duration::days(13),
        end: today - Duration::days(7),
    };

    let current_average = window_average(&current_window, weights);
    let previous_average = window_average(&previous_window, weights);
    let delta = match (current_average, previous_average) {
        (Some(current), Some(previous)) => Some(current - previous),
        _ => None,
    };

    WeeklyTrend {
        current_window,
        previous_window,
        current_average,
        previous_average,
        delta,
    }
}

fn window_average(window: &DateWindow, weights: &[WeightEntry]) -> Option<f64> {
    let in_window: Vec<f64> = weights
        .iter()
        .filter(|entry| entry.date >= window.start && entry.date <= window.end)
        .map(|entry| entry.weight)
        .collect();

    if in_window.is_empty() {
        return None;
    }
    Some(in_window.iter().sum::<f64>() / in_window.len() as f64)
}

pub fn recent_days_at(today: NaiveDate, entries: &[DailyEntry]) -> Vec<DayStatusPoint> {
    (0..7)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let status = match entries.iter().find(|entry| entry.date == date) {
                Some(entry) if entry.snacked => DayStatus::Snacked,
                Some(_) => DayStatus::Clean,
                None => DayStatus::Unlogged,
            };
            DayStatusPoint { date, status }
        })
        .collect()
}

/// Target points every 15 days from the start date, merged with the actual
/// entries and sorted by date. Target dates past the calendar's end are dropped.
pub fn weight_chart(settings: &UserSettings, weights: &[WeightEntry]) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = (0..CHART_TARGET_POINTS)
        .map_while(|step| {
            let date = settings
                .start_date
                .checked_add_signed(Duration::days(step * CHART_STEP_DAYS))?;
            Some(ChartPoint {
                date,
                target: target_weight_for(settings, date).map(round_to_hundredths),
                actual: None,
                is_target: true,
            })
        })
        .collect();

    for entry in weights {
        match points.iter_mut().find(|point| point.date == entry.date) {
            Some(point) => point.actual = Some(entry.weight),
            None => points.push(ChartPoint {
                date: entry.date,
                target: target_weight_for(settings, entry.date).map(round_to_hundredths),
                actual: Some(entry.weight),
                is_target: false,
            }),
        }
    }

    points.sort_by_key(|point| point.date);
    points
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn weight_celebration(previous: &[WeightEntry], new_weight: f64) -> Option<&'static str> {
    match previous.last() {
        None => Some("First Step!"),
        Some(last) if new_weight < last.weight => Some("Weight Down!"),
        Some(_) => None,
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mood;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(day: u32, snacked: bool) -> DailyEntry {
        DailyEntry {
            date: date(2026, 1, day),
            snacked,
            snack_details: None,
            mood: Mood::Unset,
            notes: String::new(),
        }
    }

    fn weight(date: NaiveDate, weight: f64) -> WeightEntry {
        WeightEntry { date, weight }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn streak_of_nothing_is_zero() {
        assert_eq!(current_streak(&[]), 0);
    }

    #[test]
    fn streak_stops_at_most_recent_lapse() {
        let entries = [entry(3, true), entry(5, false), entry(4, false)];
        assert_eq!(current_streak(&entries), 2);
    }

    #[test]
    fn streak_is_zero_when_latest_day_snacked() {
        let entries = [entry(4, false), entry(5, true)];
        assert_eq!(current_streak(&entries), 0);
    }

    #[test]
    fn streak_skips_unlogged_days() {
        // 01-04 has no entry; the two recorded clean days still count.
        let entries = [entry(5, false), entry(3, false)];
        assert_eq!(current_streak(&entries), 2);
    }

    #[test]
    fn streak_progress_caps_at_hundred() {
        let progress = streak_progress(10, 7);
        assert!(progress.goal_met);
        assert!(close(progress.percent, 100.0));

        let progress = streak_progress(3, 6);
        assert!(!progress.goal_met);
        assert!(close(progress.percent, 50.0));

        assert!(close(streak_progress(3, 0).percent, 0.0));
    }

    #[test]
    fn target_follows_linear_rate() {
        let settings = UserSettings::default();
        let target = target_weight_for(&settings, date(2026, 1, 31)).unwrap();
        assert!(close(target, 60.5));
        assert!(close(target_weight_for(&settings, date(2026, 1, 1)).unwrap(), 62.0));
    }

    #[test]
    fn target_is_floored_at_goal() {
        let settings = UserSettings::default();
        assert!(close(target_weight_for(&settings, date(2027, 1, 1)).unwrap(), 53.0));
    }

    #[test]
    fn target_before_start_is_undefined() {
        let settings = UserSettings::default();
        assert!(target_weight_for(&settings, date(2025, 12, 31)).is_none());
        assert!(weight_comparison_at(date(2025, 12, 31), &settings, &[]).is_none());
    }

    #[test]
    fn comparison_uses_start_weight_without_entries() {
        let settings = UserSettings::default();
        let comparison = weight_comparison_at(date(2026, 1, 31), &settings, &[]).unwrap();
        assert!(close(comparison.current, 62.0));
        assert!(close(comparison.diff, 1.5));
        assert!(!comparison.on_track);
    }

    #[test]
    fn weight_equal_to_target_is_on_track() {
        let settings = UserSettings::default();
        let weights = [
            weight(date(2026, 1, 10), 61.0),
            weight(date(2026, 1, 30), 60.5),
        ];
        let comparison = weight_comparison_at(date(2026, 1, 31), &settings, &weights).unwrap();
        assert!(close(comparison.current, 60.5));
        assert!(comparison.on_track);
    }

    #[test]
    fn weekly_trend_without_data_has_no_averages() {
        let trend = weekly_trend_at(date(2026, 2, 14), &[]);
        assert_eq!(trend.current_average, None);
        assert_eq!(trend.previous_average, None);
        assert_eq!(trend.delta, None);
        assert_eq!(trend.current_window.start, date(2026, 2, 8));
        assert_eq!(trend.previous_window.end, date(2026, 2, 7));
        assert_eq!(trend.previous_window.start, date(2026, 2, 1));
    }

    #[test]
    fn weekly_trend_needs_both_windows_for_delta() {
        let today = date(2026, 2, 14);
        let weights = [weight(date(2026, 2, 8), 60.0), weight(date(2026, 2, 14), 59.0)];
        let trend = weekly_trend_at(today, &weights);
        assert!(close(trend.current_average.unwrap(), 59.5));
        assert_eq!(trend.previous_average, None);
        assert_eq!(trend.delta, None);
    }

    #[test]
    fn weekly_trend_compares_adjacent_windows() {
        let today = date(2026, 2, 14);
        let weights = [
            weight(date(2026, 1, 31), 70.0),
            weight(date(2026, 2, 1), 61.0),
            weight(date(2026, 2, 7), 60.0),
            weight(date(2026, 2, 8), 59.6),
            weight(date(2026, 2, 15), 50.0),
        ];
        let trend = weekly_trend_at(today, &weights);
        assert!(close(trend.previous_average.unwrap(), 60.5));
        assert!(close(trend.current_average.unwrap(), 59.6));
        assert!(close(trend.delta.unwrap(), -0.9));
    }

    #[test]
    fn recent_days_cover_last_week_oldest_first() {
        let today = date(2026, 1, 7);
        let days = recent_days_at(today, &[entry(7, false), entry(3, true)]);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, date(2026, 1, 1));
        assert_eq!(days[2].status, DayStatus::Snacked);
        assert_eq!(days[5].status, DayStatus::Unlogged);
        assert_eq!(days[6].status, DayStatus::Clean);
    }

    #[test]
    fn chart_merges_actuals_into_target_series() {
        let settings = UserSettings::default();
        let weights = [
            weight(date(2026, 1, 16), 61.1),
            weight(date(2026, 1, 20), 60.9),
            weight(date(2025, 12, 30), 62.4),
        ];
        let chart = weight_chart(&settings, &weights);
        assert_eq!(chart.len(), 17);
        assert!(chart.windows(2).all(|pair| pair[0].date <= pair[1].date));

        let before_start = &chart[0];
        assert_eq!(before_start.target, None);
        assert!(!before_start.is_target);

        let merged = chart.iter().find(|p| p.date == date(2026, 1, 16)).unwrap();
        assert!(merged.is_target);
        assert_eq!(merged.actual, Some(61.1));
        assert_eq!(merged.target, Some(61.25));

        let last = chart.last().unwrap();
        assert_eq!(last.date, date(2026, 7, 30));
        assert_eq!(last.target, Some(53.0));
    }

    #[test]
    fn chart_stops_at_last_representable_date() {
        let settings = UserSettings {
            start_date: NaiveDate::MAX - Duration::days(30),
            ..UserSettings::default()
        };
        let chart = weight_chart(&settings, &[]);
        assert_eq!(chart.len(), 3);
        assert_eq!(chart.last().unwrap().date, NaiveDate::MAX);
    }

    #[test]
    fn celebrations_for_first_and_lower_weights() {
        assert_eq!(weight_celebration(&[], 62.0), Some("First Step!"));
        let previous = [weight(date(2026, 1, 2), 61.0)];
        assert_eq!(weight_celebration(&previous, 60.8), Some("Weight Down!"));
        assert_eq!(weight_celebration(&previous, 61.0), None);
    }

    #[test]
    fn dashboard_handles_empty_data() {
        let settings = UserSettings::default();
        let dashboard = build_dashboard_at(date(2026, 1, 5), &[], &[], &settings);
        assert_eq!(dashboard.streak.streak, 0);
        assert!(dashboard.today.is_none());
        assert_eq!(dashboard.recent_days.len(), 7);
        assert!(dashboard.weight.is_some());
        assert_eq!(dashboard.weekly_trend.delta, None);
    }
}
