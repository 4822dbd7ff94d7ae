use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        pagination::PageQuery,
        session_dto::{CreateSessionRequest, SubmitAnswerRequest},
    },
    error::Result,
    middleware::{
        auth::Claims,
        policy::{ensure, Operation},
    },
    AppState,
};

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::CreateSession)?;
    let session = state.session_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::ListSessions)?;
    Ok(Json(state.session_service.list(query.into()).await?))
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::ViewSession)?;
    Ok(Json(state.session_service.get(id).await?))
}

pub async fn start_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::StartSession)?;
    Ok(Json(state.session_service.start(id).await?))
}

#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::AnswerSession)?;
    payload.validate()?;
    let session = state.session_service.submit_answer(id, payload).await?;
    Ok(Json(session))
}

pub async fn submit_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::SubmitSession)?;
    Ok(Json(state.session_service.submit(id).await?))
}
