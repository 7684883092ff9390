use crate::{
    domain::{Member, Sport, Subscription},
    ports::database::{
        DatabasePort, Error, MemberChanges, NewMember, NewSport, NewSubscription, SportChanges,
    },
};
use chrono::Utc;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::debug;
use uuid::Uuid;

/// In-process store behaving like the relational schema
///
/// All tables sit behind a single lock, so every call is atomic with respect to the
/// uniqueness and referential checks it performs.
#[derive(Clone, Debug)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    members: HashMap<Uuid, Member>,
    sports: HashMap<Uuid, Sport>,
    subscriptions: HashMap<Uuid, Subscription>,
}

#[async_trait::async_trait]
impl DatabasePort for MemoryDatabase {
    async fn find_member(&self, member_id: Uuid) -> Result<Option<Member>, Error> {
        Ok(self.tables.lock()?.members.get(&member_id).cloned())
    }

    async fn list_members(&self) -> Result<Vec<Member>, Error> {
        let mut members: Vec<_> = self.tables.lock()?.members.values().cloned().collect();
        sort_members(&mut members);
        Ok(members)
    }

    async fn list_family_members(&self, family_head_id: Uuid) -> Result<Vec<Member>, Error> {
        let mut members: Vec<_> = self
            .tables
            .lock()?
            .members
            .values()
            .filter(|member| member.family_head_id == Some(family_head_id))
            .cloned()
            .collect();
        sort_members(&mut members);
        Ok(members)
    }

    async fn list_member_subscriptions(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<Subscription>, Error> {
        let mut subscriptions: Vec<_> = self
            .tables
            .lock()?
            .subscriptions
            .values()
            .filter(|subscription| subscription.member_id == member_id)
            .cloned()
            .collect();
        subscriptions.sort_by_key(|subscription| subscription.created_at);
        Ok(subscriptions)
    }

    async fn create_member(&self, new: NewMember) -> Result<Member, Error> {
        let mut tables = self.tables.lock()?;
        if let Some(family_head_id) = new.family_head_id {
            if !tables.members.contains_key(&family_head_id) {
                return Err(ForeignKeyViolation("members.family_head_id").into());
            }
        }

        let now = Utc::now();
        let member = Member {
            id: Uuid::new_v4(),
            first_name: new.first_name,
            last_name: new.last_name,
            gender: new.gender,
            birthdate: new.birthdate,
            family_head_id: new.family_head_id,
            created_at: now,
            updated_at: now,
        };
        tables.members.insert(member.id, member.clone());
        debug!(member_id = %member.id, "inserted member");

        Ok(member)
    }

    async fn update_member(
        &self,
        member_id: Uuid,
        changes: MemberChanges,
    ) -> Result<Member, Error> {
        let mut tables = self.tables.lock()?;
        if let Some(Some(family_head_id)) = changes.family_head_id {
            if !tables.members.contains_key(&family_head_id) {
                return Err(ForeignKeyViolation("members.family_head_id").into());
            }
        }
        let member = tables.members.get_mut(&member_id).ok_or(Error::NotFound)?;

        if let Some(first_name) = changes.first_name {
            member.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            member.last_name = last_name;
        }
        if let Some(gender) = changes.gender {
            member.gender = gender;
        }
        if let Some(birthdate) = changes.birthdate {
            member.birthdate = birthdate;
        }
        if let Some(family_head_id) = changes.family_head_id {
            member.family_head_id = family_head_id;
        }
        member.updated_at = Utc::now();
        debug!(%member_id, "updated member");

        Ok(member.clone())
    }

    async fn delete_member(&self, member_id: Uuid) -> Result<Member, Error> {
        let mut tables = self.tables.lock()?;
        let member = tables.members.remove(&member_id).ok_or(Error::NotFound)?;

        // Dependents are detached, subscriptions go away with the member
        let now = Utc::now();
        for dependent in tables.members.values_mut() {
            if dependent.family_head_id == Some(member_id) {
                dependent.family_head_id = None;
                dependent.updated_at = now;
            }
        }
        tables
            .subscriptions
            .retain(|_, subscription| subscription.member_id != member_id);
        debug!(%member_id, "deleted member");

        Ok(member)
    }

    async fn find_sport(&self, sport_id: Uuid) -> Result<Option<Sport>, Error> {
        Ok(self.tables.lock()?.sports.get(&sport_id).cloned())
    }

    async fn list_sports(&self) -> Result<Vec<Sport>, Error> {
        let mut sports: Vec<_> = self.tables.lock()?.sports.values().cloned().collect();
        sports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sports)
    }

    async fn create_sport(&self, new: NewSport) -> Result<Sport, Error> {
        let mut tables = self.tables.lock()?;
        if tables.sports.values().any(|sport| sport.name == new.name) {
            return Err(Error::Duplicate("sports.name".into()));
        }

        let now = Utc::now();
        let sport = Sport {
            id: Uuid::new_v4(),
            name: new.name,
            subscription_price: new.subscription_price,
            allowed_gender: new.allowed_gender,
            created_at: now,
            updated_at: now,
        };
        tables.sports.insert(sport.id, sport.clone());
        debug!(sport_id = %sport.id, name = %sport.name, "inserted sport");

        Ok(sport)
    }

    async fn update_sport(&self, sport_id: Uuid, changes: SportChanges) -> Result<Sport, Error> {
        let mut tables = self.tables.lock()?;
        if !tables.sports.contains_key(&sport_id) {
            return Err(Error::NotFound);
        }
        if let Some(name) = &changes.name {
            let taken = tables
                .sports
                .values()
                .any(|sport| sport.id != sport_id && &sport.name == name);
            if taken {
                return Err(Error::Duplicate("sports.name".into()));
            }
        }

        let sport = tables.sports.get_mut(&sport_id).ok_or(Error::NotFound)?;
        if let Some(name) = changes.name {
            sport.name = name;
        }
        if let Some(subscription_price) = changes.subscription_price {
            sport.subscription_price = subscription_price;
        }
        if let Some(allowed_gender) = changes.allowed_gender {
            sport.allowed_gender = allowed_gender;
        }
        sport.updated_at = Utc::now();
        debug!(%sport_id, "updated sport");

        Ok(sport.clone())
    }

    async fn delete_sport(&self, sport_id: Uuid) -> Result<Sport, Error> {
        let mut tables = self.tables.lock()?;
        let sport = tables.sports.remove(&sport_id).ok_or(Error::NotFound)?;
        tables
            .subscriptions
            .retain(|_, subscription| subscription.sport_id != sport_id);
        debug!(%sport_id, "deleted sport");

        Ok(sport)
    }

    async fn create_subscription(&self, new: NewSubscription) -> Result<Subscription, Error> {
        let mut tables = self.tables.lock()?;
        if !tables.members.contains_key(&new.member_id) {
            return Err(ForeignKeyViolation("subscriptions.member_id").into());
        }
        if !tables.sports.contains_key(&new.sport_id) {
            return Err(ForeignKeyViolation("subscriptions.sport_id").into());
        }
        let duplicate = tables.subscriptions.values().any(|subscription| {
            subscription.member_id == new.member_id && subscription.sport_id == new.sport_id
        });
        if duplicate {
            return Err(Error::Duplicate("subscriptions.member_id_sport_id".into()));
        }

        let subscription = Subscription {
            id: Uuid::new_v4(),
            member_id: new.member_id,
            sport_id: new.sport_id,
            subscription_type: new.subscription_type,
            created_at: Utc::now(),
        };
        tables
            .subscriptions
            .insert(subscription.id, subscription.clone());
        debug!(subscription_id = %subscription.id, "inserted subscription");

        Ok(subscription)
    }

    async fn delete_subscription(&self, subscription_id: Uuid) -> Result<Subscription, Error> {
        let subscription = self
            .tables
            .lock()?
            .subscriptions
            .remove(&subscription_id)
            .ok_or(Error::NotFound)?;
        debug!(%subscription_id, "deleted subscription");

        Ok(subscription)
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
        }
    }
}

fn sort_members(members: &mut [Member]) {
    members.sort_by(|a, b| {
        (&a.last_name, &a.first_name, a.created_at).cmp(&(
            &b.last_name,
            &b.first_name,
            b.created_at,
        ))
    });
}

/// A write referenced a record that does not exist
///
/// Pre-checks in the commands normally catch this first, so reaching it means the referenced
/// record vanished in between. It is reported as an adapter error.
#[derive(Debug, thiserror::Error)]
#[error("foreign key constraint violated: {0}")]
pub struct ForeignKeyViolation(&'static str);

impl From<ForeignKeyViolation> for Error {
    fn from(err: ForeignKeyViolation) -> Self {
        Self::Adapter(Box::new(err))
    }
}

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we erase the error
/// and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

/// We need to create a custom `From` implementation here for an error that's specific to this
/// adapter.
impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AllowedGender, Gender, Price, SubscriptionType};
    use chrono::NaiveDate;
    use rstest::*;
    use speculoos::prelude::*;

    fn new_member(first_name: &str, family_head_id: Option<Uuid>) -> NewMember {
        NewMember {
            first_name: first_name.to_string(),
            last_name: "Doe".to_string(),
            gender: Gender::Female,
            birthdate: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            family_head_id,
        }
    }

    fn new_sport(name: &str) -> NewSport {
        NewSport {
            name: name.to_string(),
            subscription_price: Price::from_cents(5000),
            allowed_gender: AllowedGender::Mix,
        }
    }

    #[fixture]
    fn database() -> MemoryDatabase {
        MemoryDatabase::default()
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_retrieve_member(database: MemoryDatabase) {
        let res = database.create_member(new_member("Jane", None)).await;
        assert_that!(res).is_ok();
        let member = res.unwrap();

        let res = database.find_member(member.id).await;
        assert_that!(res).is_ok().is_some().is_equal_to(member);
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_member_unknown_family_head(database: MemoryDatabase) {
        let res = database
            .create_member(new_member("Jane", Some(Uuid::new_v4())))
            .await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::Adapter(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_member_partial(database: MemoryDatabase) {
        let member = database
            .create_member(new_member("Jane", None))
            .await
            .unwrap();

        let res = database
            .update_member(
                member.id,
                MemberChanges {
                    first_name: Some("Janet".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert_that!(res).is_ok().matches(|updated| {
            updated.first_name == "Janet"
                && updated.last_name == member.last_name
                && updated.birthdate == member.birthdate
        });
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_member_clear_family_head(database: MemoryDatabase) {
        let head = database
            .create_member(new_member("Jane", None))
            .await
            .unwrap();
        let child = database
            .create_member(new_member("Jill", Some(head.id)))
            .await
            .unwrap();

        let res = database
            .update_member(
                child.id,
                MemberChanges {
                    family_head_id: Some(None),
                    ..Default::default()
                },
            )
            .await;

        assert_that!(res)
            .is_ok()
            .matches(|updated| updated.family_head_id.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_missing_member(database: MemoryDatabase) {
        let res = database
            .update_member(Uuid::new_v4(), MemberChanges::default())
            .await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::NotFound));
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_family_head_detaches_dependents(database: MemoryDatabase) {
        let head = database
            .create_member(new_member("Jane", None))
            .await
            .unwrap();
        let child = database
            .create_member(new_member("Jill", Some(head.id)))
            .await
            .unwrap();
        let sport = database.create_sport(new_sport("Tennis")).await.unwrap();
        database
            .create_subscription(NewSubscription {
                member_id: head.id,
                sport_id: sport.id,
                subscription_type: SubscriptionType::Individual,
            })
            .await
            .unwrap();

        let res = database.delete_member(head.id).await;
        assert_that!(res).is_ok().is_equal_to(head.clone());

        let child = database.find_member(child.id).await.unwrap().unwrap();
        assert_that!(child.family_head_id).is_none();
        let subscriptions = database.list_member_subscriptions(head.id).await.unwrap();
        assert_that!(subscriptions).is_empty();
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_missing_member(database: MemoryDatabase) {
        let res = database.delete_member(Uuid::new_v4()).await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::NotFound));
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_family_members(database: MemoryDatabase) {
        let head = database
            .create_member(new_member("Jane", None))
            .await
            .unwrap();
        database
            .create_member(new_member("Jill", Some(head.id)))
            .await
            .unwrap();
        database
            .create_member(new_member("Jack", Some(head.id)))
            .await
            .unwrap();
        database
            .create_member(new_member("Joe", None))
            .await
            .unwrap();

        let res = database.list_family_members(head.id).await.unwrap();
        let names: Vec<_> = res.iter().map(|m| m.first_name.as_str()).collect();
        assert_that!(names).is_equal_to(vec!["Jack", "Jill"]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_sport_name_unique(database: MemoryDatabase) {
        let res = database.create_sport(new_sport("Basketball")).await;
        assert_that!(res).is_ok();

        let res = database.create_sport(new_sport("Basketball")).await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::Duplicate(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_sport_name_collision(database: MemoryDatabase) {
        database.create_sport(new_sport("Basketball")).await.unwrap();
        let judo = database.create_sport(new_sport("Judo")).await.unwrap();

        let res = database
            .update_sport(
                judo.id,
                SportChanges {
                    name: Some("Basketball".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::Duplicate(_)));

        // Keeping its own name is not a collision
        let res = database
            .update_sport(
                judo.id,
                SportChanges {
                    name: Some("Judo".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert_that!(res).is_ok();
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_sports_case_sensitive_order(database: MemoryDatabase) {
        for name in ["rugby", "Tennis", "Basketball", "archery"] {
            database.create_sport(new_sport(name)).await.unwrap();
        }

        let res = database.list_sports().await.unwrap();
        let names: Vec<_> = res.iter().map(|s| s.name.as_str()).collect();
        assert_that!(names).is_equal_to(vec!["Basketball", "Tennis", "archery", "rugby"]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_duplicate_subscription(database: MemoryDatabase) {
        let member = database
            .create_member(new_member("Jane", None))
            .await
            .unwrap();
        let sport = database.create_sport(new_sport("Tennis")).await.unwrap();
        let new = NewSubscription {
            member_id: member.id,
            sport_id: sport.id,
            subscription_type: SubscriptionType::Group,
        };

        let res = database.create_subscription(new.clone()).await;
        assert_that!(res).is_ok();
        let res = database.create_subscription(new).await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::Duplicate(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_sport_removes_subscriptions(database: MemoryDatabase) {
        let member = database
            .create_member(new_member("Jane", None))
            .await
            .unwrap();
        let sport = database.create_sport(new_sport("Tennis")).await.unwrap();
        let subscription = database
            .create_subscription(NewSubscription {
                member_id: member.id,
                sport_id: sport.id,
                subscription_type: SubscriptionType::Group,
            })
            .await
            .unwrap();

        database.delete_sport(sport.id).await.unwrap();

        let res = database.delete_subscription(subscription.id).await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::NotFound));
    }
}
