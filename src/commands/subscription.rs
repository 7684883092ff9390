use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::{
    domain::{Subscription, SubscriptionDetails, SubscriptionType},
    ports::database::{self, DatabasePort, NewSubscription},
};

use super::Error;

const MEMBER_NOT_FOUND: &str = "Member not found";
const SPORT_NOT_FOUND: &str = "Sport not found";
const ALREADY_SUBSCRIBED: &str = "Member is already subscribed to this sport";
const SUBSCRIPTION_NOT_FOUND: &str = "Subscription not found";

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub member_id: Uuid,
    pub sport_id: Uuid,
    pub subscription_type: SubscriptionType,
}

pub struct DeleteSubscriptionRequest {
    pub subscription_id: Uuid,
}

command!(CreateSubscriptionRequest => SubscriptionDetails, create_subscription);
command!(DeleteSubscriptionRequest => Subscription, delete_subscription);

/// Subscribe a member to a sport
///
/// Checks run in a fixed order, and the first failing one decides the error:
/// 1. the member exists,
/// 2. the sport exists,
/// 3. the sport admits the member's gender.
///
/// Only then is the subscription written. Duplicates are not checked here: the store's
/// uniqueness constraint on (member, sport) rejects them, and that rejection becomes a
/// conflict.
async fn create_subscription<D>(
    database: Arc<D>,
    req: CreateSubscriptionRequest,
) -> Result<SubscriptionDetails, Error>
where
    D: DatabasePort + Send + Sync,
{
    let span = info_span!(
        "create_subscription",
        member_id = %req.member_id,
        sport_id = %req.sport_id,
    );

    async move {
        let member = database
            .find_member(req.member_id)
            .await?
            .ok_or(Error::NotFound(MEMBER_NOT_FOUND.into()))?;
        let sport = database
            .find_sport(req.sport_id)
            .await?
            .ok_or(Error::NotFound(SPORT_NOT_FOUND.into()))?;

        if !sport.allowed_gender.admits(member.gender) {
            debug!(gender = %member.gender, allowed = %sport.allowed_gender, "gender mismatch");
            return Err(Error::InvalidInput(
                format!(
                    "This sport is only available for {} members",
                    sport.allowed_gender
                )
                .into(),
            ));
        }

        let new = NewSubscription {
            member_id: member.id,
            sport_id: sport.id,
            subscription_type: req.subscription_type,
        };
        let subscription = match database.create_subscription(new).await {
            Ok(subscription) => subscription,
            Err(database::Error::Duplicate(constraint)) => {
                debug!(%constraint, "duplicate subscription");
                return Err(Error::Conflict(ALREADY_SUBSCRIBED.into()));
            }
            Err(err @ (database::Error::NotFound | database::Error::Adapter(_))) => {
                return Err(err.into())
            }
        };
        info!(subscription_id = %subscription.id, "subscription created");

        Ok(SubscriptionDetails {
            subscription,
            member,
            sport,
        })
    }
    .instrument(span)
    .await
}

async fn delete_subscription<D>(
    database: Arc<D>,
    req: DeleteSubscriptionRequest,
) -> Result<Subscription, Error>
where
    D: DatabasePort + Send + Sync,
{
    match database.delete_subscription(req.subscription_id).await {
        Ok(subscription) => {
            info!(subscription_id = %subscription.id, "subscription deleted");
            Ok(subscription)
        }
        Err(database::Error::NotFound) => Err(Error::NotFound(SUBSCRIPTION_NOT_FOUND.into())),
        Err(err @ (database::Error::Duplicate(_) | database::Error::Adapter(_))) => {
            Err(err.into())
        }
    }
}
