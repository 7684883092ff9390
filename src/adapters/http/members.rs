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
        member::{
            CreateMemberRequest, DeleteMemberRequest, GetMemberRequest, ListMembersRequest,
            UpdateMemberInput, UpdateMemberRequest,
        },
        DomainLogic,
    },
    domain::{Member, MemberDetails},
    ports::database::DatabasePort,
};

pub(super) async fn create<D>(
    State(domain): State<DomainLogic<D>>,
    body: Result<Json<CreateMemberRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MemberDetails>), ApiError>
where
    D: DatabasePort + Send + Sync + 'static,
{
    let Json(req) = body?;
    let details = domain.oneshot(req).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

pub(super) async fn list<D>(
    State(domain): State<DomainLogic<D>>,
) -> Result<Json<Vec<Member>>, ApiError>
where
    D: DatabasePort + Send + Sync + 'static,
{
    Ok(Json(domain.oneshot(ListMembersRequest).await?))
}

pub(super) async fn find_one<D>(
    State(domain): State<DomainLogic<D>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MemberDetails>, ApiError>
where
    D: DatabasePort + Send + Sync + 'static,
{
    let Path(member_id) = path?;
    Ok(Json(domain.oneshot(GetMemberRequest { member_id }).await?))
}

pub(super) async fn update<D>(
    State(domain): State<DomainLogic<D>>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateMemberInput>, JsonRejection>,
) -> Result<Json<MemberDetails>, ApiError>
where
    D: DatabasePort + Send + Sync + 'static,
{
    let Path(member_id) = path?;
    let Json(input) = body?;
    let details = domain
        .oneshot(UpdateMemberRequest { member_id, input })
        .await?;
    Ok(Json(details))
}

pub(super) async fn remove<D>(
    State(domain): State<DomainLogic<D>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Member>, ApiError>
where
    D: DatabasePort + Send + Sync + 'static,
{
    let Path(member_id) = path?;
    Ok(Json(domain.oneshot(DeleteMemberRequest { member_id }).await?))
}
