use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use adsight_agent::{run_workflow, ChatMessage};

use crate::api::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// `POST /api/v1/chat`: runs one agent turn over the conversation.
///
/// The workflow degrades internally, so a well-formed body always gets a
/// 200 with an agent response; only an unparseable body is rejected.
pub async fn chat(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejecting malformed chat body");
            return ApiError::new(req_id.0, "bad_request", rejection.body_text()).into_response();
        }
    };

    let response = run_workflow(&state.agent, &request.messages).await;
    Json(ApiResponse {
        data: response,
        meta: ResponseMeta::new(req_id.0),
    })
    .into_response()
}
