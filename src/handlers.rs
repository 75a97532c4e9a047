use crate::backup::{backup_file_name, parse_backup};
use crate::coach;
use crate::errors::AppError;
use crate::models::{
    BackupDocument, ChatMessage, ChatRequest, ChatResponse, DailyEntry, DailyEntryRequest,
    DailyLogResponse, DashboardResponse, MotivationResponse, QuickCheckInRequest, QuickCheckInResponse,
    QuickWeightResponse, RestoreSummary, SettingsField, UserSettings, WeightEntry,
    WeightProgressResponse, WeightRequest,
};
use crate::state::AppState;
use crate::stats::{
    build_dashboard, build_weight_progress, current_streak, today, weight_celebration,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use crate::validation::{check_setting, check_settings, check_weight};
use chrono::{NaiveDate, Utc};
use tracing::info;

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let repo = &state.repository;
    let daily = repo.daily_logs().await;
    let weights = repo.weight_logs().await;
    let settings = repo.settings().await;
    Json(build_dashboard(&daily, &weights, &settings))
}

pub async fn list_daily_logs(State(state): State<AppState>) -> Json<Vec<DailyEntry>> {
    let mut logs = state.repository.daily_logs().await;
    logs.sort_by(|a, b| b.date.cmp(&a.date));
    Json(logs)
}

pub async fn put_daily_log(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
    Json(payload): Json<DailyEntryRequest>,
) -> Result<Json<DailyLogResponse>, AppError> {
    let entry = DailyEntry {
        date,
        snacked: payload.snacked,
        snack_details: payload.snack_details,
        mood: payload.mood,
        notes: payload.notes,
    }
    .normalized();

    state.repository.save_daily_log(entry.clone()).await?;
    Ok(Json(DailyLogResponse {
        celebration: (!entry.snacked).then(|| "Clean Day!".to_string()),
        entry,
    }))
}

pub async fn delete_daily_log(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<StatusCode, AppError> {
    if state.repository.delete_daily_log(date).await? {
        info!(%date, "daily log deleted");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Today's one-tap check-in. Mood and notes already logged today are kept.
pub async fn quick_check_in(
    State(state): State<AppState>,
    Json(payload): Json<QuickCheckInRequest>,
) -> Result<Json<QuickCheckInResponse>, AppError> {
    let date = today();
    let entry = state
        .repository
        .update_daily_log(date, |existing| {
            let existing = existing.unwrap_or(DailyEntry {
                date,
                snacked: false,
                snack_details: None,
                mood: Default::default(),
                notes: String::new(),
            });
            DailyEntry {
                snacked: payload.snacked,
                ..existing
            }
            .normalized()
        })
        .await?;
    let streak = current_streak(&state.repository.daily_logs().await);

    Ok(Json(QuickCheckInResponse {
        celebration: (!entry.snacked).then(|| "Clean Streak!".to_string()),
        entry,
        streak,
    }))
}

pub async fn list_weight_logs(State(state): State<AppState>) -> Json<Vec<WeightEntry>> {
    Json(state.repository.weight_logs().await)
}

pub async fn put_weight_log(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
    Json(payload): Json<WeightRequest>,
) -> Result<Json<WeightEntry>, AppError> {
    let weight = check_weight(payload.weight)?;
    let entry = WeightEntry { date, weight };
    state.repository.save_weight_log(entry.clone()).await?;
    Ok(Json(entry))
}

pub async fn delete_weight_log(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<StatusCode, AppError> {
    if state.repository.delete_weight_log(date).await? {
        info!(%date, "weight log deleted");
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn quick_weight(
    State(state): State<AppState>,
    Json(payload): Json<WeightRequest>,
) -> Result<Json<QuickWeightResponse>, AppError> {
    let weight = check_weight(payload.weight)?;
    let previous = state.repository.weight_logs().await;
    let celebration = weight_celebration(&previous, weight).map(str::to_string);

    let entry = WeightEntry {
        date: today(),
        weight,
    };
    state.repository.save_weight_log(entry.clone()).await?;

    Ok(Json(QuickWeightResponse { entry, celebration }))
}

pub async fn get_weight_progress(State(state): State<AppState>) -> Json<WeightProgressResponse> {
    let weights = state.repository.weight_logs().await;
    let settings = state.repository.settings().await;
    Json(build_weight_progress(&weights, &settings))
}

pub async fn get_settings(State(state): State<AppState>) -> Json<UserSettings> {
    Json(state.repository.settings().await)
}

pub async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<UserSettings>,
) -> Result<Json<UserSettings>, AppError> {
    check_settings(&settings)?;

    state.repository.save_settings(&settings).await?;
    Ok(Json(settings))
}

pub async fn patch_settings(
    State(state): State<AppState>,
    Json(field): Json<SettingsField>,
) -> Result<Json<UserSettings>, AppError> {
    check_setting(&field)?;
    let settings = state.repository.update_setting(field).await?;
    Ok(Json(settings))
}

pub async fn get_chat(State(state): State<AppState>) -> Json<Vec<ChatMessage>> {
    let history = state.repository.chat_history().await;
    if history.is_empty() {
        return Json(vec![coach::greeting(now_millis())]);
    }
    Json(history)
}

pub async fn post_chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::bad_request("message must not be empty"));
    }

    let exchange =
        coach::converse(&state.repository, state.coach.as_ref(), message, now_millis()).await?;

    Ok(Json(ChatResponse {
        user: exchange.user,
        reply: exchange.reply,
        fallback: exchange.fallback,
    }))
}

pub async fn get_motivation(State(state): State<AppState>) -> Json<MotivationResponse> {
    Json(MotivationResponse {
        quote: coach::motivation(state.coach.as_ref()).await,
    })
}

pub async fn export_backup(State(state): State<AppState>) -> impl IntoResponse {
    let document: BackupDocument = state.repository.export().await;
    let disposition = format!("attachment; filename=\"{}\"", backup_file_name(today()));
    ([(header::CONTENT_DISPOSITION, disposition)], Json(document))
}

pub async fn restore_backup(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<RestoreSummary>, AppError> {
    let document = parse_backup(&body)?;
    let summary = state.repository.restore(document).await?;
    info!(?summary, "backup restored");
    Ok(Json(summary))
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
