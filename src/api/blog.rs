use std::sync::Arc;

use chrono::Local;
use poem_openapi::{
    OpenApi, Object,
    param::{Header, Path},
    payload::{Json, PlainText},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use validator::Validate;

use crate::api::MessageResponse;
use crate::auth;
use crate::entities::{comment, post, user};
use crate::error;
use crate::state::AppState;

/// Readable creation date, e.g. "August 06, 2026".
const DATE_FORMAT: &str = "%B %d, %Y";

pub struct BlogApi {
    pub state: Arc<AppState>,
}

#[derive(Debug, Object, Validate)]
struct PostRequest {
    #[validate(length(min = 1))]
    title: String,
    #[validate(length(min = 1))]
    subtitle: String,
    #[validate(length(min = 1))]
    body: String,
    #[validate(url)]
    img_url: String,
}

#[derive(Debug, Object, Validate)]
struct CommentRequest {
    #[validate(length(min = 1))]
    text: String,
}

#[derive(Debug, Object)]
pub struct PostResponse {
    pub id: i32,
    pub author: String,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
}

impl PostResponse {
    fn from_parts(record: &post::Model, author: Option<&user::Model>) -> Self {
        Self {
            id: record.id,
            author: author.map(|a| a.name.clone()).unwrap_or_default(),
            title: record.title.clone(),
            subtitle: record.subtitle.clone(),
            date: record.date.clone(),
            body: record.body.clone(),
            img_url: record.img_url.clone(),
        }
    }
}

#[derive(Debug, Object)]
pub struct CommentResponse {
    pub id: i32,
    pub author: String,
    pub text: String,
}

#[derive(Debug, Object)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

#[OpenApi]
impl BlogApi {
    #[oai(path = "/", method = "get")]
    async fn index(&self) -> PlainText<&'static str> {
        PlainText("tidelog - tight lines")
    }

    /// All posts, newest first.
    #[oai(path = "/blog", method = "get")]
    async fn list_posts(&self) -> poem::Result<Json<Vec<PostResponse>>> {
        let rows = post::Entity::find()
            .find_also_related(user::Entity)
            .order_by_desc(post::Column::Id)
            .all(&self.state.db)
            .await
            .map_err(error::internal)?;
        Ok(Json(
            rows.iter()
                .map(|(record, author)| PostResponse::from_parts(record, author.as_ref()))
                .collect(),
        ))
    }

    #[oai(path = "/post/:id", method = "get")]
    async fn get_post(&self, Path(id): Path<i32>) -> poem::Result<Json<PostDetailResponse>> {
        let db = &self.state.db;
        let Some((record, author)) = post::Entity::find_by_id(id)
            .find_also_related(user::Entity)
            .one(db)
            .await
            .map_err(error::internal)?
        else {
            return Err(error::not_found("post"));
        };

        let comments = comment::Entity::find()
            .filter(comment::Column::PostId.eq(id))
            .find_also_related(user::Entity)
            .order_by_asc(comment::Column::Id)
            .all(db)
            .await
            .map_err(error::internal)?;

        Ok(Json(PostDetailResponse {
            post: PostResponse::from_parts(&record, author.as_ref()),
            comments: comments
                .iter()
                .map(|(row, commenter)| CommentResponse {
                    id: row.id,
                    author: commenter.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
                    text: row.text.clone(),
                })
                .collect(),
        }))
    }

    /// Comment on a post. Requires a logged-in account; the post itself
    /// is left untouched.
    #[oai(path = "/post/:id", method = "post")]
    async fn add_comment(
        &self,
        Path(id): Path<i32>,
        Header(authorization): Header<Option<String>>,
        Json(input): Json<CommentRequest>,
    ) -> poem::Result<Json<CommentResponse>> {
        let db = &self.state.db;
        let account = auth::authenticate(db, &self.state.config.jwt_secret, authorization.as_deref())
            .await?
            .ok_or_else(|| error::unauthorized("you need to log in or register to comment"))?;
        input.validate().map_err(|e| error::validation(&e))?;

        if post::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(error::internal)?
            .is_none()
        {
            return Err(error::not_found("post"));
        }

        let created = comment::ActiveModel {
            post_id: Set(id),
            author_id: Set(account.id),
            text: Set(input.text),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(error::internal)?;

        Ok(Json(CommentResponse {
            id: created.id,
            author: account.name,
            text: created.text,
        }))
    }

    /// Administrator only. Title must be unique; the creation date is
    /// stamped with today's calendar date.
    #[oai(path = "/new-post", method = "post")]
    async fn create_post(
        &self,
        Header(authorization): Header<Option<String>>,
        Json(input): Json<PostRequest>,
    ) -> poem::Result<Json<PostResponse>> {
        let db = &self.state.db;
        let admin =
            auth::require_admin(db, &self.state.config.jwt_secret, authorization.as_deref()).await?;
        input.validate().map_err(|e| error::validation(&e))?;

        let clash = post::Entity::find()
            .filter(post::Column::Title.eq(&input.title))
            .one(db)
            .await
            .map_err(error::internal)?
            .is_some();
        if clash {
            return Err(error::conflict("a post with that title already exists"));
        }

        let created = post::ActiveModel {
            author_id: Set(admin.id),
            title: Set(input.title),
            subtitle: Set(input.subtitle),
            date: Set(Local::now().format(DATE_FORMAT).to_string()),
            body: Set(input.body),
            img_url: Set(input.img_url),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(error::internal)?;

        Ok(Json(PostResponse::from_parts(&created, Some(&admin))))
    }

    /// The current post, for prefilling the edit form.
    #[oai(path = "/edit-post/:id", method = "get")]
    async fn edit_post_form(
        &self,
        Path(id): Path<i32>,
        Header(authorization): Header<Option<String>>,
    ) -> poem::Result<Json<PostResponse>> {
        let db = &self.state.db;
        auth::require_admin(db, &self.state.config.jwt_secret, authorization.as_deref()).await?;
        let Some((record, author)) = post::Entity::find_by_id(id)
            .find_also_related(user::Entity)
            .one(db)
            .await
            .map_err(error::internal)?
        else {
            return Err(error::not_found("post"));
        };
        Ok(Json(PostResponse::from_parts(&record, author.as_ref())))
    }

    /// Overwrites title, subtitle, image url and body in place; id,
    /// author and date stay as they were.
    #[oai(path = "/edit-post/:id", method = "post")]
    async fn edit_post(
        &self,
        Path(id): Path<i32>,
        Header(authorization): Header<Option<String>>,
        Json(input): Json<PostRequest>,
    ) -> poem::Result<Json<PostResponse>> {
        let db = &self.state.db;
        let admin =
            auth::require_admin(db, &self.state.config.jwt_secret, authorization.as_deref()).await?;
        input.validate().map_err(|e| error::validation(&e))?;

        let found = post::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(error::internal)?;
        let mut record: post::ActiveModel = found.ok_or_else(|| error::not_found("post"))?.into();
        record.title = Set(input.title);
        record.subtitle = Set(input.subtitle);
        record.img_url = Set(input.img_url);
        record.body = Set(input.body);
        let updated = record.update(db).await.map_err(error::internal)?;

        Ok(Json(PostResponse::from_parts(&updated, Some(&admin))))
    }

    /// Removes the post and its comments in one transaction.
    #[oai(path = "/delete/:id", method = "get")]
    async fn delete_post(
        &self,
        Path(id): Path<i32>,
        Header(authorization): Header<Option<String>>,
    ) -> poem::Result<Json<MessageResponse>> {
        let db = &self.state.db;
        auth::require_admin(db, &self.state.config.jwt_secret, authorization.as_deref()).await?;

        if post::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(error::internal)?
            .is_none()
        {
            return Err(error::not_found("post"));
        }

        let txn = db.begin().await.map_err(error::internal)?;
        comment::Entity::delete_many()
            .filter(comment::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(error::internal)?;
        post::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(error::internal)?;
        txn.commit().await.map_err(error::internal)?;

        Ok(Json(MessageResponse::new("post deleted")))
    }
}

#[cfg(test)]
mod tests {
    use poem::Route;
    use poem::http::StatusCode;
    use poem::test::TestClient;
    use sea_orm::{EntityTrait, PaginatorTrait};
    use serde_json::json;

    use crate::entities::comment;
    use crate::state::test_support;

    async fn register(cli: &TestClient<Route>, email: &str, name: &str) -> String {
        let resp = cli
            .post("/register")
            .body_json(&json!({ "email": email, "password": "gone-fishing", "name": name }))
            .send()
            .await;
        resp.assert_status_is_ok();
        let body = resp.json().await;
        let token = body.value().object().get("token").string().to_string();
        token
    }

    async fn create_post(cli: &TestClient<Route>, token: &str, title: &str) -> i32 {
        let resp = cli
            .post("/new-post")
            .header("authorization", format!("Bearer {token}"))
            .body_json(&json!({
                "title": title,
                "subtitle": "A day on the pier",
                "body": "The cod were biting all morning.",
                "img_url": "https://example.com/cod.jpg"
            }))
            .send()
            .await;
        resp.assert_status_is_ok();
        let body = resp.json().await;
        let id = body.value().object().get("id").i64();
        id as i32
    }

    #[tokio::test]
    async fn post_management_is_admin_only() {
        let state = test_support::state().await;
        let cli = TestClient::new(crate::build_app(state.clone()));
        let admin = register(&cli, "admin@example.com", "Admin").await;
        let other = register(&cli, "reader@example.com", "Reader").await;
        let id = create_post(&cli, &admin, "Pier report").await;

        let payload = json!({
            "title": "Hijacked",
            "subtitle": "x",
            "body": "x",
            "img_url": "https://example.com/x.jpg"
        });

        // Anonymous and non-admin callers both get a hard 403.
        cli.post("/new-post")
            .body_json(&payload)
            .send()
            .await
            .assert_status(StatusCode::FORBIDDEN);
        cli.post("/new-post")
            .header("authorization", format!("Bearer {other}"))
            .body_json(&payload)
            .send()
            .await
            .assert_status(StatusCode::FORBIDDEN);
        cli.post(format!("/edit-post/{id}"))
            .header("authorization", format!("Bearer {other}"))
            .body_json(&payload)
            .send()
            .await
            .assert_status(StatusCode::FORBIDDEN);
        cli.get(format!("/delete/{id}"))
            .send()
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected() {
        let state = test_support::state().await;
        let cli = TestClient::new(crate::build_app(state));
        let admin = register(&cli, "admin@example.com", "Admin").await;
        create_post(&cli, &admin, "Pier report").await;

        let resp = cli
            .post("/new-post")
            .header("authorization", format!("Bearer {admin}"))
            .body_json(&json!({
                "title": "Pier report",
                "subtitle": "again",
                "body": "again",
                "img_url": "https://example.com/again.jpg"
            }))
            .send()
            .await;
        resp.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn create_rejects_invalid_image_url() {
        let state = test_support::state().await;
        let cli = TestClient::new(crate::build_app(state));
        let admin = register(&cli, "admin@example.com", "Admin").await;

        let resp = cli
            .post("/new-post")
            .header("authorization", format!("Bearer {admin}"))
            .body_json(&json!({
                "title": "Pier report",
                "subtitle": "x",
                "body": "x",
                "img_url": "not a url"
            }))
            .send()
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blog_lists_newest_first_and_detail_includes_comments() {
        let state = test_support::state().await;
        let cli = TestClient::new(crate::build_app(state));
        let admin = register(&cli, "admin@example.com", "Admin").await;
        let first = create_post(&cli, &admin, "First trip").await;
        let second = create_post(&cli, &admin, "Second trip").await;

        let resp = cli.get("/blog").send().await;
        resp.assert_status_is_ok();
        let body = resp.json().await;
        let posts = body.value().array();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts.get(0).object().get("id").i64() as i32, second);
        assert_eq!(posts.get(1).object().get("id").i64() as i32, first);
        assert_eq!(posts.get(0).object().get("author").string(), "Admin");

        cli.post(format!("/post/{first}"))
            .header("authorization", format!("Bearer {admin}"))
            .body_json(&json!({ "text": "What bait?" }))
            .send()
            .await
            .assert_status_is_ok();

        let resp = cli.get(format!("/post/{first}")).send().await;
        resp.assert_status_is_ok();
        let body = resp.json().await;
        let detail = body.value().object();
        assert_eq!(detail.get("post").object().get("title").string(), "First trip");
        let comments = detail.get("comments").array();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments.get(0).object().get("text").string(), "What bait?");
        assert_eq!(comments.get(0).object().get("author").string(), "Admin");
    }

    #[tokio::test]
    async fn missing_post_is_a_404_everywhere() {
        let state = test_support::state().await;
        let cli = TestClient::new(crate::build_app(state));
        let admin = register(&cli, "admin@example.com", "Admin").await;

        cli.get("/post/99").send().await.assert_status(StatusCode::NOT_FOUND);
        cli.get("/delete/99")
            .header("authorization", format!("Bearer {admin}"))
            .send()
            .await
            .assert_status(StatusCode::NOT_FOUND);
        cli.post("/edit-post/99")
            .header("authorization", format!("Bearer {admin}"))
            .body_json(&json!({
                "title": "t",
                "subtitle": "s",
                "body": "b",
                "img_url": "https://example.com/b.jpg"
            }))
            .send()
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unauthenticated_comment_creates_no_row() {
        let state = test_support::state().await;
        let cli = TestClient::new(crate::build_app(state.clone()));
        let admin = register(&cli, "admin@example.com", "Admin").await;
        let id = create_post(&cli, &admin, "Pier report").await;

        let resp = cli
            .post(format!("/post/{id}"))
            .body_json(&json!({ "text": "drive-by" }))
            .send()
            .await;
        resp.assert_status(StatusCode::UNAUTHORIZED);
        resp.assert_text("you need to log in or register to comment").await;

        let rows = comment::Entity::find().count(&state.db).await.expect("count");
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn edit_preserves_id_author_and_date() {
        let state = test_support::state().await;
        let cli = TestClient::new(crate::build_app(state));
        let admin = register(&cli, "admin@example.com", "Admin").await;
        let id = create_post(&cli, &admin, "Pier report").await;

        let resp = cli.get(format!("/post/{id}")).send().await;
        let body = resp.json().await;
        let before_date = body
            .value()
            .object()
            .get("post")
            .object()
            .get("date")
            .string()
            .to_string();

        let resp = cli
            .post(format!("/edit-post/{id}"))
            .header("authorization", format!("Bearer {admin}"))
            .body_json(&json!({
                "title": "Pier report, revised",
                "subtitle": "Now with pictures",
                "body": "Updated text.",
                "img_url": "https://example.com/cod2.jpg"
            }))
            .send()
            .await;
        resp.assert_status_is_ok();
        let body = resp.json().await;
        let updated = body.value().object();
        assert_eq!(updated.get("id").i64() as i32, id);
        assert_eq!(updated.get("title").string(), "Pier report, revised");
        assert_eq!(updated.get("date").string(), before_date);
        assert_eq!(updated.get("author").string(), "Admin");
    }

    #[tokio::test]
    async fn delete_removes_post_and_its_comments() {
        let state = test_support::state().await;
        let cli = TestClient::new(crate::build_app(state.clone()));
        let admin = register(&cli, "admin@example.com", "Admin").await;
        let id = create_post(&cli, &admin, "Pier report").await;
        cli.post(format!("/post/{id}"))
            .header("authorization", format!("Bearer {admin}"))
            .body_json(&json!({ "text": "nice one" }))
            .send()
            .await
            .assert_status_is_ok();

        cli.get(format!("/delete/{id}"))
            .header("authorization", format!("Bearer {admin}"))
            .send()
            .await
            .assert_status_is_ok();

        cli.get(format!("/post/{id}"))
            .send()
            .await
            .assert_status(StatusCode::NOT_FOUND);
        let rows = comment::Entity::find().count(&state.db).await.expect("count");
        assert_eq!(rows, 0);
    }
}
