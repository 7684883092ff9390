use chrono::NaiveDate;
use std::borrow::Cow;
use uuid::Uuid;

use crate::domain::{
    AllowedGender, Gender, Member, Price, Sport, Subscription, SubscriptionType,
};

/// Persistence gateway for club records
///
/// Lookups return `Ok(None)` for missing records. Mutations report missing targets as
/// [`Error::NotFound`] and uniqueness violations as [`Error::Duplicate`], so callers can
/// translate them exhaustively.
#[mockall::automock]
#[async_trait::async_trait]
pub trait DatabasePort {
    async fn find_member(&self, member_id: Uuid) -> Result<Option<Member>, Error>;
    /// All members, ordered by last name then first name
    async fn list_members(&self) -> Result<Vec<Member>, Error>;
    /// Members whose family head is `family_head_id`
    async fn list_family_members(&self, family_head_id: Uuid) -> Result<Vec<Member>, Error>;
    async fn list_member_subscriptions(&self, member_id: Uuid)
        -> Result<Vec<Subscription>, Error>;
    async fn create_member(&self, member: NewMember) -> Result<Member, Error>;
    async fn update_member(&self, member_id: Uuid, changes: MemberChanges)
        -> Result<Member, Error>;
    async fn delete_member(&self, member_id: Uuid) -> Result<Member, Error>;

    async fn find_sport(&self, sport_id: Uuid) -> Result<Option<Sport>, Error>;
    /// All sports, ordered by name
    async fn list_sports(&self) -> Result<Vec<Sport>, Error>;
    async fn create_sport(&self, sport: NewSport) -> Result<Sport, Error>;
    async fn update_sport(&self, sport_id: Uuid, changes: SportChanges) -> Result<Sport, Error>;
    async fn delete_sport(&self, sport_id: Uuid) -> Result<Sport, Error>;

    async fn create_subscription(
        &self,
        subscription: NewSubscription,
    ) -> Result<Subscription, Error>;
    async fn delete_subscription(&self, subscription_id: Uuid) -> Result<Subscription, Error>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMember {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birthdate: NaiveDate,
    pub family_head_id: Option<Uuid>,
}

/// Fields to replace on a member
///
/// `None` leaves the stored value untouched. For `family_head_id`, `Some(None)` clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub birthdate: Option<NaiveDate>,
    pub family_head_id: Option<Option<Uuid>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSport {
    pub name: String,
    pub subscription_price: Price,
    pub allowed_gender: AllowedGender,
}

/// Fields to replace on a sport, `None` leaves the stored value untouched
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SportChanges {
    pub name: Option<String>,
    pub subscription_price: Option<Price>,
    pub allowed_gender: Option<AllowedGender>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSubscription {
    pub member_id: Uuid,
    pub sport_id: Uuid,
    pub subscription_type: SubscriptionType,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The record targeted by a write does not exist
    #[error("record not found")]
    NotFound,

    /// A write would break a uniqueness constraint
    ///
    /// The store enforces these constraints, so this is the only reliable signal that a
    /// record already exists.
    #[error("unique constraint violated: {0}")]
    Duplicate(Cow<'static, str>),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or referential integrity errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
