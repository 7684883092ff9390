use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    domain::{Gender, Member, MemberDetails, SubscriptionWithSport},
    ports::database::{self, DatabasePort, MemberChanges, NewMember},
    validation::{non_blank, parse_birthdate, Validate, ValidationError},
};

use super::{nullable, Error};

const MEMBER_NOT_FOUND: &str = "Member not found";
const FAMILY_HEAD_NOT_FOUND: &str = "Family head not found";

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    /// ISO 8601 date string
    pub birthdate: String,
    #[serde(default)]
    pub family_head_id: Option<Uuid>,
}

impl Validate for CreateMemberRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        non_blank("firstName", &self.first_name)?;
        non_blank("lastName", &self.last_name)?;
        parse_birthdate("birthdate", &self.birthdate)?;
        Ok(())
    }
}

pub struct GetMemberRequest {
    pub member_id: Uuid,
}

pub struct ListMembersRequest;

pub struct UpdateMemberRequest {
    pub member_id: Uuid,
    pub input: UpdateMemberInput,
}

/// Fields to replace on a member, omitted fields are left untouched
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub birthdate: Option<String>,
    /// `null` detaches the member from its family head
    #[serde(default, deserialize_with = "nullable")]
    pub family_head_id: Option<Option<Uuid>>,
}

impl Validate for UpdateMemberInput {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(first_name) = &self.first_name {
            non_blank("firstName", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            non_blank("lastName", last_name)?;
        }
        if let Some(birthdate) = &self.birthdate {
            parse_birthdate("birthdate", birthdate)?;
        }
        Ok(())
    }
}

pub struct DeleteMemberRequest {
    pub member_id: Uuid,
}

command!(CreateMemberRequest => MemberDetails, create_member);
command!(GetMemberRequest => MemberDetails, get_member);
command!(ListMembersRequest => Vec<Member>, list_members);
command!(UpdateMemberRequest => MemberDetails, update_member);
command!(DeleteMemberRequest => Member, delete_member);

async fn create_member<D>(
    database: Arc<D>,
    req: CreateMemberRequest,
) -> Result<MemberDetails, Error>
where
    D: DatabasePort + Send + Sync,
{
    req.validate()?;
    let birthdate = parse_birthdate("birthdate", &req.birthdate)?;

    if let Some(family_head_id) = req.family_head_id {
        ensure_family_head(database.as_ref(), family_head_id).await?;
    }

    let member = database
        .create_member(NewMember {
            first_name: req.first_name,
            last_name: req.last_name,
            gender: req.gender,
            birthdate,
            family_head_id: req.family_head_id,
        })
        .await?;
    info!(member_id = %member.id, "member created");

    load_details(database.as_ref(), member).await
}

async fn get_member<D>(database: Arc<D>, req: GetMemberRequest) -> Result<MemberDetails, Error>
where
    D: DatabasePort + Send + Sync,
{
    let member = database
        .find_member(req.member_id)
        .await?
        .ok_or(Error::NotFound(MEMBER_NOT_FOUND.into()))?;

    load_details(database.as_ref(), member).await
}

async fn list_members<D>(database: Arc<D>, _req: ListMembersRequest) -> Result<Vec<Member>, Error>
where
    D: DatabasePort + Send + Sync,
{
    Ok(database.list_members().await?)
}

async fn update_member<D>(
    database: Arc<D>,
    req: UpdateMemberRequest,
) -> Result<MemberDetails, Error>
where
    D: DatabasePort + Send + Sync,
{
    let input = req.input;
    input.validate()?;

    if let Some(Some(family_head_id)) = input.family_head_id {
        if family_head_id == req.member_id {
            return Err(Error::InvalidInput(
                "A member cannot be their own family head".into(),
            ));
        }
        ensure_family_head(database.as_ref(), family_head_id).await?;
    }

    let changes = MemberChanges {
        birthdate: input
            .birthdate
            .as_deref()
            .map(|birthdate| parse_birthdate("birthdate", birthdate))
            .transpose()?,
        first_name: input.first_name,
        last_name: input.last_name,
        gender: input.gender,
        family_head_id: input.family_head_id,
    };

    let member = match database.update_member(req.member_id, changes).await {
        Ok(member) => member,
        Err(database::Error::NotFound) => {
            debug!(member_id = %req.member_id, "member vanished before update");
            return Err(Error::NotFound(MEMBER_NOT_FOUND.into()));
        }
        Err(err @ (database::Error::Duplicate(_) | database::Error::Adapter(_))) => {
            return Err(err.into())
        }
    };
    info!(member_id = %member.id, "member updated");

    load_details(database.as_ref(), member).await
}

async fn delete_member<D>(database: Arc<D>, req: DeleteMemberRequest) -> Result<Member, Error>
where
    D: DatabasePort + Send + Sync,
{
    match database.delete_member(req.member_id).await {
        Ok(member) => {
            info!(member_id = %member.id, "member deleted");
            Ok(member)
        }
        Err(database::Error::NotFound) => Err(Error::NotFound(MEMBER_NOT_FOUND.into())),
        Err(err @ (database::Error::Duplicate(_) | database::Error::Adapter(_))) => {
            Err(err.into())
        }
    }
}

async fn ensure_family_head<D>(database: &D, family_head_id: Uuid) -> Result<(), Error>
where
    D: DatabasePort + Send + Sync,
{
    match database.find_member(family_head_id).await? {
        Some(_) => Ok(()),
        None => Err(Error::NotFound(FAMILY_HEAD_NOT_FOUND.into())),
    }
}

/// Attach the family head, dependents and subscriptions (with their sport) to a member
async fn load_details<D>(database: &D, member: Member) -> Result<MemberDetails, Error>
where
    D: DatabasePort + Send + Sync,
{
    let family_head = match member.family_head_id {
        Some(family_head_id) => database.find_member(family_head_id).await?,
        None => None,
    };
    let family_members = database.list_family_members(member.id).await?;

    let mut sport_subscriptions = Vec::new();
    for subscription in database.list_member_subscriptions(member.id).await? {
        // Deleting a sport removes its subscriptions, so a miss here is a concurrent delete
        if let Some(sport) = database.find_sport(subscription.sport_id).await? {
            sport_subscriptions.push(SubscriptionWithSport {
                subscription,
                sport,
            });
        }
    }

    Ok(MemberDetails {
        member,
        family_head,
        family_members,
        sport_subscriptions,
    })
}
