use std::sync::Arc;

use poem_openapi::{OpenApi, Object, payload::Json};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use validator::Validate;

use crate::api::MessageResponse;
use crate::auth;
use crate::entities::user;
use crate::error;
use crate::state::AppState;

pub struct AuthApi {
    pub state: Arc<AppState>,
}

#[derive(Debug, Object, Validate)]
struct RegisterRequest {
    #[validate(length(min = 1))]
    email: String,
    #[validate(length(min = 1))]
    password: String,
    #[validate(length(min = 1))]
    name: String,
}

#[derive(Debug, Object, Validate)]
struct LoginRequest {
    #[validate(length(min = 1))]
    email: String,
    #[validate(length(min = 1))]
    password: String,
}

#[derive(Debug, Object)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
}

impl From<&user::Model> for UserResponse {
    fn from(account: &user::Model) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            name: account.name.clone(),
            is_admin: account.is_admin,
        }
    }
}

#[derive(Debug, Object)]
pub struct SessionResponse {
    token_type: String,
    token: String,
    user: UserResponse,
}

fn session_for(secret: &str, account: &user::Model) -> poem::Result<SessionResponse> {
    Ok(SessionResponse {
        token_type: "Bearer".to_string(),
        token: auth::issue_token(secret, account.id)?,
        user: account.into(),
    })
}

#[OpenApi]
impl AuthApi {
    /// Create an account and establish a session. The very first
    /// account on a fresh database becomes the administrator.
    #[oai(path = "/register", method = "post")]
    async fn register(&self, Json(input): Json<RegisterRequest>) -> poem::Result<Json<SessionResponse>> {
        input.validate().map_err(|e| error::validation(&e))?;
        let db = &self.state.db;

        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(&input.email))
            .one(db)
            .await
            .map_err(error::internal)?
            .is_some();
        if taken {
            return Err(error::conflict(
                "an account with that email address already exists",
            ));
        }

        let first_account = user::Entity::find()
            .count(db)
            .await
            .map_err(error::internal)?
            == 0;

        let created = user::ActiveModel {
            email: Set(input.email),
            password_hash: Set(auth::hash_password(&input.password)?),
            name: Set(input.name),
            is_admin: Set(first_account),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(error::internal)?;

        Ok(Json(session_for(&self.state.config.jwt_secret, &created)?))
    }

    /// Log in. Unknown email and wrong password are reported as
    /// distinct messages, matching the site's historical behavior.
    #[oai(path = "/login", method = "post")]
    async fn login(&self, Json(input): Json<LoginRequest>) -> poem::Result<Json<SessionResponse>> {
        input.validate().map_err(|e| error::validation(&e))?;
        let db = &self.state.db;

        let Some(account) = user::Entity::find()
            .filter(user::Column::Email.eq(&input.email))
            .one(db)
            .await
            .map_err(error::internal)?
        else {
            return Err(error::unauthorized("no account with that email address"));
        };

        if !auth::verify_password(&input.password, &account.password_hash) {
            return Err(error::unauthorized("password incorrect"));
        }

        Ok(Json(session_for(&self.state.config.jwt_secret, &account)?))
    }

    /// Sessions are bearer tokens, so logging out is a client-side
    /// token discard; the endpoint succeeds unconditionally.
    #[oai(path = "/logout", method = "get")]
    async fn logout(&self) -> poem::Result<Json<MessageResponse>> {
        Ok(Json(MessageResponse::new("logged out")))
    }
}

#[cfg(test)]
mod tests {
    use poem::http::StatusCode;
    use poem::test::TestClient;
    use sea_orm::{EntityTrait, PaginatorTrait};
    use serde_json::json;

    use crate::entities::user;
    use crate::state::test_support;

    #[tokio::test]
    async fn register_issues_session_and_first_account_is_admin() {
        let state = test_support::state().await;
        let cli = TestClient::new(crate::build_app(state.clone()));

        let resp = cli
            .post("/register")
            .body_json(&json!({
                "email": "skipper@example.com",
                "password": "gone-fishing",
                "name": "Skipper"
            }))
            .send()
            .await;
        resp.assert_status_is_ok();
        let body = resp.json().await;
        let body = body.value().object();
        assert_eq!(body.get("token_type").string(), "Bearer");
        assert!(!body.get("token").string().is_empty());
        assert_eq!(body.get("user").object().get("is_admin").bool(), true);

        let resp = cli
            .post("/register")
            .body_json(&json!({
                "email": "mate@example.com",
                "password": "gone-fishing",
                "name": "Mate"
            }))
            .send()
            .await;
        resp.assert_status_is_ok();
        let body = resp.json().await;
        assert_eq!(
            body.value().object().get("user").object().get("is_admin").bool(),
            false
        );
    }

    #[tokio::test]
    async fn duplicate_email_never_creates_a_second_row() {
        let state = test_support::state().await;
        let cli = TestClient::new(crate::build_app(state.clone()));

        let payload = json!({
            "email": "skipper@example.com",
            "password": "gone-fishing",
            "name": "Skipper"
        });
        cli.post("/register")
            .body_json(&payload)
            .send()
            .await
            .assert_status_is_ok();
        let resp = cli.post("/register").body_json(&payload).send().await;
        resp.assert_status(StatusCode::CONFLICT);

        let rows = user::Entity::find().count(&state.db).await.expect("count");
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn login_failures_are_distinct_and_never_authenticate() {
        let state = test_support::state().await;
        let cli = TestClient::new(crate::build_app(state.clone()));

        cli.post("/register")
            .body_json(&json!({
                "email": "skipper@example.com",
                "password": "gone-fishing",
                "name": "Skipper"
            }))
            .send()
            .await
            .assert_status_is_ok();

        let resp = cli
            .post("/login")
            .body_json(&json!({ "email": "nobody@example.com", "password": "x" }))
            .send()
            .await;
        resp.assert_status(StatusCode::UNAUTHORIZED);
        resp.assert_text("no account with that email address").await;

        let resp = cli
            .post("/login")
            .body_json(&json!({
                "email": "skipper@example.com",
                "password": "wrong-password"
            }))
            .send()
            .await;
        resp.assert_status(StatusCode::UNAUTHORIZED);
        resp.assert_text("password incorrect").await;

        let resp = cli
            .post("/login")
            .body_json(&json!({
                "email": "skipper@example.com",
                "password": "gone-fishing"
            }))
            .send()
            .await;
        resp.assert_status_is_ok();
    }

    #[tokio::test]
    async fn register_rejects_missing_fields() {
        let state = test_support::state().await;
        let cli = TestClient::new(crate::build_app(state));

        let resp = cli
            .post("/register")
            .body_json(&json!({ "email": "", "password": "", "name": "Skipper" }))
            .send()
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logout_always_succeeds() {
        let state = test_support::state().await;
        let cli = TestClient::new(crate::build_app(state));
        cli.get("/logout").send().await.assert_status_is_ok();
    }
}
