use axum::{
    extract::{Extension, Path, Query, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::test_dto::TestPerformanceQuery,
    error::Result,
    middleware::{
        auth::Claims,
        policy::{ensure, Operation},
    },
    AppState,
};

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::ViewAnalytics)?;
    Ok(Json(state.analytics_service.dashboard().await?))
}

pub async fn test_performance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<TestPerformanceQuery>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::ViewAnalytics)?;
    let perf = state.analytics_service.test_performance(query.test_type).await?;
    Ok(Json(perf))
}

pub async fn candidate_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(candidate_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::ViewReports)?;
    let report = state.report_service.candidate_report(candidate_id).await?;
    Ok(Json(report))
}
