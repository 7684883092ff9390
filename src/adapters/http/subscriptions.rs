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
        subscription::{CreateSubscriptionRequest, DeleteSubscriptionRequest},
        DomainLogic,
    },
    domain::{Subscription, SubscriptionDetails},
    ports::database::DatabasePort,
};

pub(super) async fn create<D>(
    State(domain): State<DomainLogic<D>>,
    body: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubscriptionDetails>), ApiError>
where
    D: DatabasePort + Send + Sync + 'static,
{
    let Json(req) = body?;
    let details = domain.oneshot(req).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

pub(super) async fn remove<D>(
    State(domain): State<DomainLogic<D>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Subscription>, ApiError>
where
    D: DatabasePort + Send + Sync + 'static,
{
    let Path(subscription_id) = path?;
    let subscription = domain
        .oneshot(DeleteSubscriptionRequest { subscription_id })
        .await?;
    Ok(Json(subscription))
}
