use poem::http::StatusCode;

pub fn not_found(what: &str) -> poem::Error {
    poem::Error::from_string(format!("{what} not found"), StatusCode::NOT_FOUND)
}

pub fn conflict(message: impl Into<String>) -> poem::Error {
    poem::Error::from_string(message.into(), StatusCode::CONFLICT)
}

pub fn unauthorized(message: impl Into<String>) -> poem::Error {
    poem::Error::from_string(message.into(), StatusCode::UNAUTHORIZED)
}

pub fn forbidden() -> poem::Error {
    poem::Error::from_string("administrator rights required", StatusCode::FORBIDDEN)
}

/// Collapses field-level validation failures into one message naming the
/// offending fields, in stable order.
pub fn validation(errors: &validator::ValidationErrors) -> poem::Error {
    let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
    fields.sort_unstable();
    poem::Error::from_string(
        format!("invalid or missing fields: {}", fields.join(", ")),
        StatusCode::BAD_REQUEST,
    )
}

pub fn internal(e: impl std::fmt::Display) -> poem::Error {
    poem::Error::from_string(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
}
