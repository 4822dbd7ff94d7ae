use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::pagination::PageQuery,
    error::Result,
    middleware::{
        auth::Claims,
        policy::{ensure, Operation},
    },
    AppState,
};

pub async fn generate_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::GenerateResult)?;
    let result = state.result_service.generate_from_session(session_id).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn list_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::ListResults)?;
    Ok(Json(state.result_service.list(query.into()).await?))
}

pub async fn candidate_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(candidate_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::ViewCandidateResults)?;
    Ok(Json(state.result_service.find_by_candidate(candidate_id).await?))
}

pub async fn get_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::ViewResult)?;
    Ok(Json(state.result_service.get(id).await?))
}

pub async fn verify_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::VerifyResult)?;
    Ok(Json(state.result_service.verify(id).await?))
}
