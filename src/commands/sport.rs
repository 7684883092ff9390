use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    domain::{AllowedGender, Price, Sport},
    ports::database::{self, DatabasePort, NewSport, SportChanges},
    validation::{non_blank, Validate, ValidationError},
};

use super::Error;

const SPORT_NOT_FOUND: &str = "Sport not found";
const SPORT_NAME_TAKEN: &str = "Sport with this name already exists";

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSportRequest {
    pub name: String,
    pub subscription_price: Price,
    pub allowed_gender: AllowedGender,
}

impl Validate for CreateSportRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        non_blank("name", &self.name)
    }
}

pub struct ListSportsRequest;

pub struct GetSportRequest {
    pub sport_id: Uuid,
}

pub struct UpdateSportRequest {
    pub sport_id: Uuid,
    pub input: UpdateSportInput,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSportInput {
    pub name: Option<String>,
    pub subscription_price: Option<Price>,
    pub allowed_gender: Option<AllowedGender>,
}

impl Validate for UpdateSportInput {
    fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) => non_blank("name", name),
            None => Ok(()),
        }
    }
}

pub struct DeleteSportRequest {
    pub sport_id: Uuid,
}

command!(CreateSportRequest => Sport, create_sport);
command!(ListSportsRequest => Vec<Sport>, list_sports);
command!(GetSportRequest => Sport, get_sport);
command!(UpdateSportRequest => Sport, update_sport);
command!(DeleteSportRequest => Sport, delete_sport);

async fn create_sport<D>(database: Arc<D>, req: CreateSportRequest) -> Result<Sport, Error>
where
    D: DatabasePort + Send + Sync,
{
    req.validate()?;

    let new = NewSport {
        name: req.name,
        subscription_price: req.subscription_price,
        allowed_gender: req.allowed_gender,
    };
    match database.create_sport(new).await {
        Ok(sport) => {
            info!(sport_id = %sport.id, name = %sport.name, "sport created");
            Ok(sport)
        }
        Err(database::Error::Duplicate(_)) => Err(Error::Conflict(SPORT_NAME_TAKEN.into())),
        Err(err @ (database::Error::NotFound | database::Error::Adapter(_))) => Err(err.into()),
    }
}

/// All sports, ordered by name as the store collates it
async fn list_sports<D>(database: Arc<D>, _req: ListSportsRequest) -> Result<Vec<Sport>, Error>
where
    D: DatabasePort + Send + Sync,
{
    Ok(database.list_sports().await?)
}

async fn get_sport<D>(database: Arc<D>, req: GetSportRequest) -> Result<Sport, Error>
where
    D: DatabasePort + Send + Sync,
{
    database
        .find_sport(req.sport_id)
        .await?
        .ok_or(Error::NotFound(SPORT_NOT_FOUND.into()))
}

async fn update_sport<D>(database: Arc<D>, req: UpdateSportRequest) -> Result<Sport, Error>
where
    D: DatabasePort + Send + Sync,
{
    req.input.validate()?;

    let changes = SportChanges {
        name: req.input.name,
        subscription_price: req.input.subscription_price,
        allowed_gender: req.input.allowed_gender,
    };
    match database.update_sport(req.sport_id, changes).await {
        Ok(sport) => {
            info!(sport_id = %sport.id, "sport updated");
            Ok(sport)
        }
        Err(database::Error::NotFound) => Err(Error::NotFound(SPORT_NOT_FOUND.into())),
        Err(database::Error::Duplicate(_)) => Err(Error::Conflict(SPORT_NAME_TAKEN.into())),
        Err(err @ database::Error::Adapter(_)) => Err(err.into()),
    }
}

async fn delete_sport<D>(database: Arc<D>, req: DeleteSportRequest) -> Result<Sport, Error>
where
    D: DatabasePort + Send + Sync,
{
    match database.delete_sport(req.sport_id).await {
        Ok(sport) => {
            info!(sport_id = %sport.id, "sport deleted");
            Ok(sport)
        }
        Err(database::Error::NotFound) => Err(Error::NotFound(SPORT_NOT_FOUND.into())),
        Err(err @ (database::Error::Duplicate(_) | database::Error::Adapter(_))) => {
            Err(err.into())
        }
    }
}
