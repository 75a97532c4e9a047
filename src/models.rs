use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Mood {
    #[default]
    Unset,
    Happy,
    Neutral,
    Sad,
    Angry,
    Anxious,
    Tired,
    Stressed,
}

impl Mood {
    pub const ALL: [Mood; 7] = [
        Mood::Happy,
        Mood::Neutral,
        Mood::Sad,
        Mood::Angry,
        Mood::Anxious,
        Mood::Tired,
        Mood::Stressed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Mood::Unset => "",
            Mood::Happy => "Happy",
            Mood::Neutral => "Neutral",
            Mood::Sad => "Sad",
            Mood::Angry => "Angry",
            Mood::Anxious => "Anxious",
            Mood::Tired => "Tired",
            Mood::Stressed => "Stressed",
        }
    }
}

// Unrecognised labels read back as unset rather than failing the whole collection.
impl From<String> for Mood {
    fn from(label: String) -> Self {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.label() == label.trim())
            .unwrap_or_default()
    }
}

impl From<Mood> for &'static str {
    fn from(mood: Mood) -> Self {
        mood.label()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    pub date: NaiveDate,
    pub snacked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snack_details: Option<String>,
    #[serde(default)]
    pub mood: Mood,
    #[serde(default)]
    pub notes: String,
}

impl DailyEntry {
    /// Snack details only mean something on a lapse day.
    pub fn normalized(mut self) -> Self {
        if !self.snacked {
            self.snack_details = None;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub date: NaiveDate,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub start_date: NaiveDate,
    pub start_weight: f64,
    pub goal_weight: f64,
    pub monthly_loss_target: f64,
    pub name: String,
    pub streak_goal: u32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
            start_weight: 62.0,
            goal_weight: 53.0,
            monthly_loss_target: 1.5,
            name: "User".to_string(),
            streak_goal: 7,
        }
    }
}

/// A single-field settings change, on the wire as `{"key": ..., "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum SettingsField {
    StartDate(NaiveDate),
    StartWeight(f64),
    GoalWeight(f64),
    MonthlyLossTarget(f64),
    Name(String),
    StreakGoal(u32),
}

impl SettingsField {
    pub fn apply(self, settings: &mut UserSettings) {
        match self {
            SettingsField::StartDate(value) => settings.start_date = value,
            SettingsField::StartWeight(value) => settings.start_weight = value,
            SettingsField::GoalWeight(value) => settings.goal_weight = value,
            SettingsField::MonthlyLossTarget(value) => settings.monthly_loss_target = value,
            SettingsField::Name(value) => settings.name = value,
            SettingsField::StreakGoal(value) => settings.streak_goal = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "model")]
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_logs: Option<Vec<DailyEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_logs: Option<Vec<WeightEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<UserSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_history: Option<Vec<ChatMessage>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSummary {
    pub daily_logs: Option<usize>,
    pub weight_logs: Option<usize>,
    pub settings: bool,
    pub chat_history: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntryRequest {
    pub snacked: bool,
    #[serde(default)]
    pub snack_details: Option<String>,
    #[serde(default)]
    pub mood: Mood,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogResponse {
    pub entry: DailyEntry,
    pub celebration: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuickCheckInRequest {
    pub snacked: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickCheckInResponse {
    pub entry: DailyEntry,
    pub streak: u32,
    pub celebration: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeightRequest {
    pub weight: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickWeightResponse {
    pub entry: WeightEntry,
    pub celebration: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub user: ChatMessage,
    pub reply: ChatMessage,
    pub fallback: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MotivationResponse {
    pub quote: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Clean,
    Snacked,
    Unlogged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStatusPoint {
    pub date: NaiveDate,
    pub status: DayStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakProgress {
    pub streak: u32,
    pub goal: u32,
    pub percent: f64,
    pub goal_met: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightComparison {
    pub target: f64,
    pub current: f64,
    pub diff: f64,
    pub on_track: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTrend {
    pub current_window: DateWindow,
    pub previous_window: DateWindow,
    pub current_average: Option<f64>,
    pub previous_average: Option<f64>,
    pub delta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub target: Option<f64>,
    pub actual: Option<f64>,
    pub is_target: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub date: NaiveDate,
    pub name: String,
    pub streak: StreakProgress,
    pub today: Option<DailyEntry>,
    pub recent_days: Vec<DayStatusPoint>,
    pub weight: Option<WeightComparison>,
    pub weekly_trend: WeeklyTrend,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightProgressResponse {
    pub comparison: Option<WeightComparison>,
    pub weekly_trend: WeeklyTrend,
    pub chart: Vec<ChartPoint>,
}
