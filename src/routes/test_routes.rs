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
        test_dto::{CreateTestPayload, UpdateTestPayload},
    },
    error::Result,
    middleware::{
        auth::Claims,
        policy::{ensure, Operation},
    },
    models::test::TestType,
    AppState,
};

#[axum::debug_handler]
pub async fn create_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTestPayload>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::CreateTest)?;
    payload.validate()?;
    let test = state.test_service.create_test(payload, Some(claims.sub)).await?;
    Ok((StatusCode::CREATED, Json(test)))
}

pub async fn list_tests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::ListTests)?;
    let page = state.test_service.list_tests(query.into()).await?;
    Ok(Json(page))
}

pub async fn list_tests_by_type(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(test_type): Path<TestType>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::ListTests)?;
    let tests = state.test_service.list_by_type(test_type).await?;
    Ok(Json(tests))
}

pub async fn get_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::ViewTest)?;
    let test = state.test_service.get_test(id).await?;
    Ok(Json(test))
}

#[axum::debug_handler]
pub async fn update_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTestPayload>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::UpdateTest)?;
    payload.validate()?;
    let test = state.test_service.update_test(id, payload).await?;
    Ok(Json(test))
}

pub async fn delete_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    ensure(&claims, Operation::DeleteTest)?;
    state.test_service.remove_test(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
