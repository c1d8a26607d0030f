pub mod auth;
pub mod blog;
pub mod logbook;
pub mod weather;

use poem_openapi::Object;

#[derive(Debug, Object)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
