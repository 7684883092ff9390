use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use tower::ServiceExt;
use uuid::Uuid;

use super::ApiError;
use crate::{
    commands::{
        sport::{
            CreateSportRequest, DeleteSportRequest, GetSportRequest, ListSportsRequest,
            UpdateSportInput, UpdateSportRequest,
        },
        DomainLogic,
    },
    domain::Sport,
    ports::database::DatabasePort,
};

pub(super) async fn create<D>(
    State(domain): State<DomainLogic<D>>,
    body: Result<Json<CreateSportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Sport>), ApiError>
where
    D: DatabasePort + Send + Sync + 'static,
{
    let Json(req) = body?;
    let sport = domain.oneshot(req).await?;
    Ok((StatusCode::CREATED, Json(sport)))
}

pub(super) async fn list<D>(
    State(domain): State<DomainLogic<D>>,
) -> Result<Json<Vec<Sport>>, ApiError>
where
    D: DatabasePort + Send + Sync + 'static,
{
    Ok(Json(domain.oneshot(ListSportsRequest).await?))
}

pub(super) async fn find_one<D>(
    State(domain): State<DomainLogic<D>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Sport>, ApiError>
where
    D: DatabasePort + Send + Sync + 'static,
{
    let Path(sport_id) = path?;
    Ok(Json(domain.oneshot(GetSportRequest { sport_id }).await?))
}

pub(super) async fn update<D>(
    State(domain): State<DomainLogic<D>>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateSportInput>, JsonRejection>,
) -> Result<Json<Sport>, ApiError>
where
    D: DatabasePort + Send + Sync + 'static,
{
    let Path(sport_id) = path?;
    let Json(input) = body?;
    Ok(Json(domain.oneshot(UpdateSportRequest { sport_id, input }).await?))
}

pub(super) async fn remove<D>(
    State(domain): State<DomainLogic<D>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Sport>, ApiError>
where
    D: DatabasePort + Send + Sync + 'static,
{
    let Path(sport_id) = path?;
    Ok(Json(domain.oneshot(DeleteSportRequest { sport_id }).await?))
}
