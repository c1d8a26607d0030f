//! Catch log and spot bookmarks. Both are public list-plus-create
//! handlers; submissions carry no idempotency key, so a retried POST
//! simply inserts another row.

use std::sync::Arc;

use poem_openapi::{OpenApi, Object, payload::Json};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use validator::Validate;

use crate::entities::{catch, spot};
use crate::error;
use crate::state::AppState;

pub struct LogbookApi {
    pub state: Arc<AppState>,
}

#[derive(Debug, Object, Validate)]
struct CatchRequest {
    #[validate(length(min = 1))]
    date: String,
    #[validate(length(min = 1))]
    time: String,
    #[validate(length(min = 1))]
    location: String,
    #[validate(length(min = 1))]
    species: String,
    #[validate(length(min = 1))]
    size: String,
    #[validate(length(min = 1))]
    method: String,
}

#[derive(Debug, Object)]
pub struct CatchResponse {
    pub id: i32,
    pub date: String,
    pub time: String,
    pub location: String,
    pub species: String,
    pub size: String,
    pub method: String,
}

impl From<catch::Model> for CatchResponse {
    fn from(row: catch::Model) -> Self {
        Self {
            id: row.id,
            date: row.date,
            time: row.time,
            location: row.location,
            species: row.species,
            size: row.size,
            method: row.method,
        }
    }
}

#[derive(Debug, Object, Validate)]
struct SpotRequest {
    #[validate(length(min = 1))]
    name: String,
    #[validate(length(min = 1))]
    date: String,
    #[validate(length(min = 1))]
    longitude: String,
    #[validate(length(min = 1))]
    latitude: String,
    #[validate(length(min = 1))]
    spot_info: String,
}

#[derive(Debug, Object)]
pub struct SpotResponse {
    pub id: i32,
    pub name: String,
    pub date: String,
    pub longitude: String,
    pub latitude: String,
    pub spot_info: String,
}

impl From<spot::Model> for SpotResponse {
    fn from(row: spot::Model) -> Self {
        Self {
            id: row.id,
            name: row.name,
            date: row.date,
            longitude: row.longitude,
            latitude: row.latitude,
            spot_info: row.spot_info,
        }
    }
}

#[OpenApi]
impl LogbookApi {
    #[oai(path = "/catch", method = "get")]
    async fn list_catches(&self) -> poem::Result<Json<Vec<CatchResponse>>> {
        let rows = catch::Entity::find()
            .order_by_asc(catch::Column::Id)
            .all(&self.state.db)
            .await
            .map_err(error::internal)?;
        Ok(Json(rows.into_iter().map(Into::into).collect()))
    }

    /// Logs a catch exactly as submitted.
    #[oai(path = "/catch", method = "post")]
    async fn log_catch(&self, Json(input): Json<CatchRequest>) -> poem::Result<Json<CatchResponse>> {
        input.validate().map_err(|e| error::validation(&e))?;
        let created = catch::ActiveModel {
            date: Set(input.date),
            time: Set(input.time),
            location: Set(input.location),
            species: Set(input.species),
            size: Set(input.size),
            method: Set(input.method),
            ..Default::default()
        }
        .insert(&self.state.db)
        .await
        .map_err(error::internal)?;
        Ok(Json(created.into()))
    }

    #[oai(path = "/spots", method = "get")]
    async fn list_spots(&self) -> poem::Result<Json<Vec<SpotResponse>>> {
        let rows = spot::Entity::find()
            .order_by_asc(spot::Column::Id)
            .all(&self.state.db)
            .await
            .map_err(error::internal)?;
        Ok(Json(rows.into_iter().map(Into::into).collect()))
    }

    #[oai(path = "/spots", method = "post")]
    async fn add_spot(&self, Json(input): Json<SpotRequest>) -> poem::Result<Json<SpotResponse>> {
        input.validate().map_err(|e| error::validation(&e))?;
        let created = spot::ActiveModel {
            name: Set(input.name),
            date: Set(input.date),
            longitude: Set(input.longitude),
            latitude: Set(input.latitude),
            spot_info: Set(input.spot_info),
            ..Default::default()
        }
        .insert(&self.state.db)
        .await
        .map_err(error::internal)?;
        Ok(Json(created.into()))
    }
}
