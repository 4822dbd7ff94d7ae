use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        candidate_dto::{CreateCandidatePayload, UpdateCandidatePayload},
        pagination::PageQuery,
    },
    error::Result,
    middleware::{
        auth::Claims,
        policy::{ensure, Operation},
    },
    AppState,
};

#[axum::debug_handler]
pub async fn create_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCandidatePayload>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::CreateCandidate)?;
    payload.validate()?;
    let candidate = state.candidate_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

pub async fn list_candidates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::ListCandidates)?;
    Ok(Json(state.candidate_service.list(query.into()).await?))
}

pub async fn get_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::ViewCandidate)?;
    Ok(Json(state.candidate_service.get(id).await?))
}

#[axum::debug_handler]
pub async fn update_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCandidatePayload>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::UpdateCandidate)?;
    payload.validate()?;
    let candidate = state.candidate_service.update(id, payload).await?;
    Ok(Json(candidate))
}

pub async fn delete_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::DeleteCandidate)?;
    state.candidate_service.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
