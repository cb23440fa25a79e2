//! Team endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use teamdex_core::{MemberView, TeamListing, TeamService, TeamSummary, TeamView};

use crate::error::AppError;
use crate::json::{CreateTeamRequest, SuccessResponse, UpdateTeamRequest};
use crate::AppState;

/// Team routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/teams", get(list_teams).post(create_team))
        .route(
            "/teams/:name",
            get(get_team).put(update_team).delete(delete_team),
        )
        .route("/teams/:name/members/:creature", get(get_member))
}

async fn list_teams(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<Vec<TeamListing>>>, AppError> {
    let teams = state
        .execute_read(|engine, catalog| TeamService::new(engine, catalog).list_teams())
        .await?;
    Ok(Json(SuccessResponse::new(teams)))
}

async fn create_team(
    State(state): State<AppState>,
    body: Result<Json<CreateTeamRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SuccessResponse<TeamSummary>>), AppError> {
    let Json(request) = body?;
    let summary = state
        .execute_write(move |engine, catalog| {
            TeamService::new(engine, catalog).create_team(&request.name, request.members.clone())
        })
        .await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(summary))))
}

async fn get_team(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<SuccessResponse<TeamView>>, AppError> {
    let Path(name) = path?;
    let team = state
        .execute_read(move |engine, catalog| TeamService::new(engine, catalog).get_team(&name))
        .await?;
    Ok(Json(SuccessResponse::new(team)))
}

async fn update_team(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateTeamRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<TeamSummary>>, AppError> {
    let Path(name) = path?;
    let Json(request) = body?;
    let summary = state
        .execute_write(move |engine, catalog| {
            TeamService::new(engine, catalog).update_team(&name, request.members.clone())
        })
        .await?;
    Ok(Json(SuccessResponse::new(summary)))
}

async fn delete_team(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(name) = path?;
    state
        .execute_write(move |engine, catalog| TeamService::new(engine, catalog).delete_team(&name))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_member(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<SuccessResponse<MemberView>>, AppError> {
    let Path((team, creature)) = path?;
    let member = state
        .execute_read(move |engine, catalog| {
            TeamService::new(engine, catalog).get_member(&team, &creature)
        })
        .await?;
    Ok(Json(SuccessResponse::new(member)))
}
