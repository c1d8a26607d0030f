use sea_orm::entity::prelude::*;

/// A manually recorded weather observation. These rows come from
/// submissions, never from the live forecast fetch.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "weather")]
pub struct Model {
    #[sea_orm(primary_key)]
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
