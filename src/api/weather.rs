//! Weather page: manually recorded observations plus the live
//! aggregated forecast. An upstream failure downgrades the forecast to
//! "unavailable" instead of failing the request.

use std::sync::Arc;

use poem_openapi::{OpenApi, Object, payload::Json};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use tracing::warn;
use validator::Validate;

use crate::entities::weather;
use crate::error;
use crate::state::AppState;
use crate::stormglass::ParameterSeries;

pub struct WeatherApi {
    pub state: Arc<AppState>,
}

#[derive(Debug, Object, Validate)]
struct ObservationRequest {
    #[validate(length(min = 1))]
    date: String,
    #[validate(length(min = 1))]
    longitude: String,
    #[validate(length(min = 1))]
    latitude: String,
    air_temperature: f64,
    water_temperature: f64,
    wind_speed: f64,
    #[validate(length(min = 1))]
    wind_direction: String,
    swell_height: f64,
    swell_period: f64,
    #[validate(length(min = 1))]
    swell_direction: String,
    #[validate(length(min = 1))]
    current_direction: String,
}

#[derive(Debug, Object)]
pub struct ObservationResponse {
    pub id: i32,
    pub date: String,
    pub longitude: String,
    pub latitude: String,
    pub air_temperature: f64,
    pub water_temperature: f64,
    pub wind_speed: f64,
    pub wind_direction: String,
    pub swell_height: f64,
    pub swell_period: f64,
    pub swell_direction: String,
    pub current_direction: String,
}

impl From<weather::Model> for ObservationResponse {
    fn from(row: weather::Model) -> Self {
        Self {
            id: row.id,
            date: row.date,
            longitude: row.longitude,
            latitude: row.latitude,
            air_temperature: row.air_temperature,
            water_temperature: row.water_temperature,
            wind_speed: row.wind_speed,
            wind_direction: row.wind_direction,
            swell_height: row.swell_height,
            swell_period: row.swell_period,
            swell_direction: row.swell_direction,
            current_direction: row.current_direction,
        }
    }
}

#[derive(Debug, Object)]
pub struct ForecastSection {
    /// False when the upstream weather service could not be reached;
    /// hours and series are empty in that case.
    pub available: bool,
    pub hours: Vec<String>,
    pub series: Vec<ParameterSeries>,
}

#[derive(Debug, Object)]
pub struct WeatherPageResponse {
    pub observations: Vec<ObservationResponse>,
    pub forecast: ForecastSection,
}

#[OpenApi]
impl WeatherApi {
    /// Saved observations plus the aggregated 48-hour forecast for the
    /// site's fixed point.
    #[oai(path = "/weather", method = "get")]
    async fn weather_page(&self) -> poem::Result<Json<WeatherPageResponse>> {
        let observations = weather::Entity::find()
            .order_by_asc(weather::Column::Id)
            .all(&self.state.db)
            .await
            .map_err(error::internal)?;

        let forecast = match self.state.weather.forecast().await {
            Ok(forecast) => ForecastSection {
                available: true,
                hours: forecast.hours,
                series: forecast.series,
            },
            Err(err) => {
                warn!("marine weather fetch failed, serving page without forecast: {err}");
                ForecastSection {
                    available: false,
                    hours: Vec::new(),
                    series: Vec::new(),
                }
            }
        };

        Ok(Json(WeatherPageResponse {
            observations: observations.into_iter().map(Into::into).collect(),
            forecast,
        }))
    }

    /// Records a manual weather observation.
    #[oai(path = "/weather", method = "post")]
    async fn record_observation(
        &self,
        Json(input): Json<ObservationRequest>,
    ) -> poem::Result<Json<ObservationResponse>> {
        input.validate().map_err(|e| error::validation(&e))?;
        let created = weather::ActiveModel {
            date: Set(input.date),
            longitude: Set(input.longitude),
            latitude: Set(input.latitude),
            air_temperature: Set(input.air_temperature),
            water_temperature: Set(input.water_temperature),
            wind_speed: Set(input.wind_speed),
            wind_direction: Set(input.wind_direction),
            swell_height: Set(input.swell_height),
            swell_period: Set(input.swell_period),
            swell_direction: Set(input.swell_direction),
            current_direction: Set(input.current_direction),
            ..Default::default()
        }
        .insert(&self.state.db)
        .await
        .map_err(error::internal)?;
        Ok(Json(created.into()))
    }
}
