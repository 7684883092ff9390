use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

mod price;

pub use price::{Price, PriceError};

/// A person enrolled in the club
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birthdate: NaiveDate,
    /// Member anchoring this member's household, if any
    ///
    /// This is a non-owning back-reference: the family head does not hold a list of its
    /// dependents, they are looked up when needed.
    pub family_head_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("male"),
            Gender::Female => f.write_str("female"),
        }
    }
}

/// A sport offered by the club
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sport {
    pub id: Uuid,
    /// Unique across all sports
    pub name: String,
    pub subscription_price: Price,
    pub allowed_gender: AllowedGender,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which members may subscribe to a sport
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowedGender {
    Male,
    Female,
    #[serde(alias = "mixed")]
    Mix,
}

impl AllowedGender {
    pub fn admits(&self, gender: Gender) -> bool {
        match (self, gender) {
            (AllowedGender::Mix, _) => true,
            (AllowedGender::Male, Gender::Male) => true,
            (AllowedGender::Female, Gender::Female) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AllowedGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowedGender::Male => f.write_str("male"),
            AllowedGender::Female => f.write_str("female"),
            AllowedGender::Mix => f.write_str("mix"),
        }
    }
}

/// Enrollment of one member in one sport
///
/// At most one subscription exists per (member, sport) pair. This is guaranteed by the
/// store's uniqueness constraint, not by the application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub member_id: Uuid,
    pub sport_id: Uuid,
    pub subscription_type: SubscriptionType,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    Individual,
    Group,
}

/// A member with its related records attached
///
/// Built by reading the member first, then each relation separately.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetails {
    #[serde(flatten)]
    pub member: Member,
    pub family_head: Option<Member>,
    /// Members that reference this member as their family head
    pub family_members: Vec<Member>,
    pub sport_subscriptions: Vec<SubscriptionWithSport>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionWithSport {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub sport: Sport,
}

/// A subscription with the member and sport it links
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDetails {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub member: Member,
    pub sport: Sport,
}
