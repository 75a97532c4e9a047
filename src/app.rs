use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/daily-logs", get(handlers::list_daily_logs))
        .route("/api/daily-logs/quick", post(handlers::quick_check_in))
        .route(
            "/api/daily-logs/:date",
            put(handlers::put_daily_log).delete(handlers::delete_daily_log),
        )
        .route("/api/weight-logs", get(handlers::list_weight_logs))
        .route("/api/weight-logs/quick", post(handlers::quick_weight))
        .route(
            "/api/weight-logs/:date",
            put(handlers::put_weight_log).delete(handlers::delete_weight_log),
        )
        .route("/api/weight/progress", get(handlers::get_weight_progress))
        .route(
            "/api/settings",
            get(handlers::get_settings)
                .put(handlers::put_settings)
                .patch(handlers::patch_settings),
        )
        .route("/api/chat", get(handlers::get_chat).post(handlers::post_chat))
        .route("/api/motivation", get(handlers::get_motivation))
        .route(
            "/api/backup",
            get(handlers::export_backup).post(handlers::restore_backup),
        )
        .with_state(state)
}
