pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::feedback::handlers as feedback_handlers;
use crate::interview::handlers as interview_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route(
            "/api/v1/interviews",
            post(interview_handlers::handle_generate).get(interview_handlers::handle_list),
        )
        .route(
            "/api/v1/interviews/:mock_id",
            get(interview_handlers::handle_get_interview)
                .delete(interview_handlers::handle_delete),
        )
        .route(
            "/api/v1/interviews/:mock_id/retake",
            post(interview_handlers::handle_retake),
        )
        .route(
            "/api/v1/interviews/:mock_id/active",
            patch(interview_handlers::handle_toggle_active),
        )
        // Feedback API
        .route(
            "/api/v1/interviews/:mock_id/feedback",
            post(feedback_handlers::handle_submit_feedback)
                .get(feedback_handlers::handle_get_feedback),
        )
        .with_state(state)
}
