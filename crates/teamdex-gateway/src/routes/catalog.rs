//! Catalog browse endpoints.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use teamdex_core::{
    BaseStats, CatalogLookup, CreatureRow, EntityKind, Error, ItemRow, MoveQuery, MoveRow,
};

use crate::error::AppError;
use crate::json::{CreatureMovesQuery, SuccessResponse};
use crate::AppState;

/// Catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/creatures/:name", get(get_creature))
        .route("/creatures/:name/stats", get(get_stats))
        .route("/creatures/:name/moves", get(get_creature_moves))
        .route("/moves", get(search_moves))
        .route("/moves/:name", get(get_move))
        .route("/items/:name", get(get_item))
}

async fn get_creature(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<SuccessResponse<CreatureRow>>, AppError> {
    let Path(name) = path?;
    let creature = state
        .execute_read(move |_, catalog| {
            catalog
                .find_creature(&name)?
                .ok_or_else(|| Error::not_found(EntityKind::Creature, name))
        })
        .await?;
    Ok(Json(SuccessResponse::new(creature)))
}

async fn get_stats(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<SuccessResponse<BaseStats>>, AppError> {
    let Path(name) = path?;
    let stats = state
        .execute_read(move |_, catalog| catalog.creature_stats(&name))
        .await?;
    Ok(Json(SuccessResponse::new(stats)))
}

async fn get_creature_moves(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<CreatureMovesQuery>, QueryRejection>,
) -> Result<Json<SuccessResponse<Vec<MoveRow>>>, AppError> {
    let Path(name) = path?;
    let Query(query) = query?;
    let moves = state
        .execute_read(move |_, catalog| catalog.creature_moves(&name, query.mv.as_deref()))
        .await?;
    Ok(Json(SuccessResponse::new(moves)))
}

async fn search_moves(
    State(state): State<AppState>,
    query: Result<Query<MoveQuery>, QueryRejection>,
) -> Result<Json<SuccessResponse<Vec<MoveRow>>>, AppError> {
    let Query(query) = query?;
    let moves = state
        .execute_read(move |_, catalog| catalog.search_moves(&query))
        .await?;
    Ok(Json(SuccessResponse::new(moves)))
}

async fn get_move(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<SuccessResponse<MoveRow>>, AppError> {
    let Path(name) = path?;
    let mv = state
        .execute_read(move |_, catalog| {
            catalog
                .find_move(&name)?
                .ok_or_else(|| Error::not_found(EntityKind::Move, name))
        })
        .await?;
    Ok(Json(SuccessResponse::new(mv)))
}

async fn get_item(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<SuccessResponse<ItemRow>>, AppError> {
    let Path(name) = path?;
    let item = state
        .execute_read(move |_, catalog| {
            catalog
                .find_item(&name)?
                .ok_or_else(|| Error::not_found(EntityKind::Item, name))
        })
        .await?;
    Ok(Json(SuccessResponse::new(item)))
}
