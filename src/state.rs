use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::stormglass::StormglassClient;

pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub weather: StormglassClient,
}
