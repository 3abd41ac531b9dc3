use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};

use adsight_data::{
    account_overview, list_campaigns, query_campaign_metrics, CampaignListFilter, MetricsFilter,
};

use crate::api::{ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

/// `POST /api/v1/metrics/query`: raw engine access.
///
/// The body is taken as a string and run through the lenient filter parse,
/// so both a `MetricsFilter` JSON object and a bare date phrase work.
pub async fn metrics_query(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: String,
) -> impl IntoResponse {
    let filter = MetricsFilter::from_request(&body);
    tracing::debug!(?filter, "running metrics query");
    let report = query_campaign_metrics(&state.agent.dataset, &filter);
    Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    })
}

/// `GET /api/v1/accounts`: all connected accounts with active/total counts.
pub async fn accounts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let overview = account_overview(&state.agent.dataset);
    Json(ApiResponse {
        data: overview,
        meta: ResponseMeta::new(req_id.0),
    })
}

/// `GET /api/v1/campaigns`: campaign metadata, filterable by
/// `account_id`, `program`, and `keyword` query parameters.
pub async fn campaigns(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<CampaignListFilter>,
) -> impl IntoResponse {
    let list = list_campaigns(&state.agent.dataset, &filter);
    Json(ApiResponse {
        data: list,
        meta: ResponseMeta::new(req_id.0),
    })
}
