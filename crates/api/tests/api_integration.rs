//! API integration tests.
//!
//! Each test drives the full router against a migrated in-memory `SQLite`
//! database and a temporary media directory.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use chrono::{Duration, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use yatube_api::{AppState, app};
use yatube_common::{
    AppError, AppResult, LocalStorage,
    config::{CacheConfig, Config, DatabaseConfig, LoggingConfig, MediaConfig, ServerConfig},
};
use yatube_core::{MemoryPageCache, PageCache};
use yatube_db::{
    entities::{Comment, Post, group, post, user},
    repositories::{GroupRepository, PostRepository, UserRepository},
    test_utils::TestDatabase,
};

const SMALL_GIF: &[u8] = b"\x47\x49\x46\x38\x39\x61\x02\x00\
\x01\x00\x80\x00\x00\x00\x00\x00\
\xFF\xFF\xFF\x21\xF9\x04\x00\x00\
\x00\x00\x00\x2C\x00\x00\x00\x00\
\x02\x00\x01\x00\x00\x02\x02\x0C\
\x0A\x00\x3B";

const BOUNDARY: &str = "yatube-test-boundary";

struct TestApp {
    app: Router,
    db: Arc<DatabaseConnection>,
    media: TempDir,
}

fn create_test_config(media: &TempDir) -> Config {
    Config {
        server: ServerConfig::default(),
        database: DatabaseConfig::new("sqlite::memory:"),
        cache: CacheConfig::default(),
        media: MediaConfig {
            root: media.path().to_path_buf(),
            url: "/media".to_string(),
        },
        logging: LoggingConfig::default(),
    }
}

async fn setup() -> TestApp {
    setup_with_cache(Arc::new(MemoryPageCache::new())).await
}

async fn setup_with_cache(page_cache: Arc<dyn PageCache>) -> TestApp {
    let db = Arc::new(TestDatabase::in_memory().await.unwrap().into_connection());
    let media = tempfile::tempdir().unwrap();
    let config = create_test_config(&media);

    let storage = Arc::new(LocalStorage::new(
        config.media.root.clone(),
        config.media.url.clone(),
    ));
    let state = AppState::new(
        db.clone(),
        storage,
        page_cache,
        &config,
    );

    TestApp {
        app: app(state),
        db,
        media,
    }
}

impl TestApp {
    async fn create_user(&self, username: &str) -> user::Model {
        self.create_user_with(username, false).await
    }

    async fn create_user_with(&self, username: &str, is_staff: bool) -> user::Model {
        UserRepository::new(self.db.clone())
            .create(user::ActiveModel {
                username: Set(username.to_string()),
                first_name: Set("Test".to_string()),
                last_name: Set("User".to_string()),
                email: Set(String::new()),
                password_hash: Set("unused".to_string()),
                token: Set(Some(format!("token-{username}"))),
                is_staff: Set(is_staff),
                date_joined: Set(Utc::now().into()),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    async fn create_group(&self, slug: &str) -> group::Model {
        GroupRepository::new(self.db.clone())
            .create(group::ActiveModel {
                title: Set(format!("Group {slug}")),
                slug: Set(slug.to_string()),
                description: Set("Test description".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    /// Create `count` posts, each one second newer than the last.
    async fn create_posts(
        &self,
        author: &user::Model,
        group: Option<&group::Model>,
        count: i64,
    ) -> Vec<post::Model> {
        let repo = PostRepository::new(self.db.clone());
        let base = Utc::now() - Duration::hours(1);
        let mut posts = Vec::new();
        for i in 0..count {
            let post = repo
                .create(post::ActiveModel {
                    text: Set(format!("Test post {i}")),
                    pub_date: Set((base + Duration::seconds(i)).into()),
                    author_id: Set(author.id),
                    group_id: Set(group.map(|g| g.id)),
                    image: Set(None),
                    ..Default::default()
                })
                .await
                .unwrap();
            posts.push(post);
        }
        posts
    }

    async fn get(&self, uri: &str, user: Option<&user::Model>) -> Response<Body> {
        let mut req = Request::builder().uri(uri).method("GET");
        if let Some(user) = user {
            req = req.header(header::COOKIE, session(user));
        }
        self.app
            .clone()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(&self, uri: &str, user: Option<&user::Model>, body: &str) -> Response<Body> {
        let mut req = Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(user) = user {
            req = req.header(header::COOKIE, session(user));
        }
        self.app
            .clone()
            .oneshot(req.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    async fn post_multipart(
        &self,
        uri: &str,
        user: &user::Model,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
    ) -> Response<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, data)) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/gif\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .uri(uri)
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::COOKIE, session(user))
            .body(Body::from(body))
            .unwrap();
        self.app.clone().oneshot(req).await.unwrap()
    }

    async fn post_json(&self, uri: &str, user: Option<&user::Model>, body: &str) -> Response<Body> {
        let mut req = Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(user) = user {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token(user)));
        }
        self.app
            .clone()
            .oneshot(req.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    /// Render a page and return `(template, context)`.
    async fn page(&self, uri: &str, user: Option<&user::Model>) -> (String, Value) {
        let response = self.get(uri, user).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        let doc = body_json(response).await;
        (
            doc["template"].as_str().unwrap().to_string(),
            doc["context"].clone(),
        )
    }

    async fn post_count(&self) -> u64 {
        Post::find().count(self.db.as_ref()).await.unwrap()
    }
}

fn token(user: &user::Model) -> String {
    user.token.clone().unwrap()
}

fn session(user: &user::Model) -> String {
    format!("sessionid={}", token(user))
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

fn texts(page_obj: &Value) -> Vec<String> {
    page_obj["object_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["text"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_pages_use_expected_templates() {
    let t = setup().await;
    let author = t.create_user("auth").await;
    let group = t.create_group("test-slug").await;
    let post = &t.create_posts(&author, Some(&group), 1).await[0];

    let cases = [
        ("/".to_string(), "posts/index.html"),
        ("/group/test-slug/".to_string(), "posts/group_list.html"),
        ("/profile/auth/".to_string(), "posts/profile.html"),
        (format!("/posts/{}/", post.id), "posts/post_detail.html"),
        (format!("/posts/{}/edit/", post.id), "posts/create_post.html"),
        ("/posts/create/".to_string(), "posts/create_post.html"),
        ("/follow/".to_string(), "posts/follow.html"),
        ("/about/author/".to_string(), "about/author.html"),
        ("/about/tech/".to_string(), "about/tech.html"),
        ("/auth/login/".to_string(), "users/login.html"),
        ("/auth/signup/".to_string(), "users/signup.html"),
    ];

    for (uri, template) in cases {
        let (used, context) = t.page(&uri, Some(&author)).await;
        assert_eq!(used, template, "{uri}");
        assert!(context["year"].is_number(), "{uri}");
    }
}

#[tokio::test]
async fn test_unknown_page_is_not_found() {
    let t = setup().await;

    let response = t.get("/unexisting_page/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = t.get("/posts/9999/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = t.get("/group/missing/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = t.get("/profile/ghost/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anonymous_is_redirected_to_login() {
    let t = setup().await;
    let author = t.create_user("auth").await;
    let post = &t.create_posts(&author, None, 1).await[0];
    let id = post.id;

    for uri in [
        "/posts/create/".to_string(),
        format!("/posts/{id}/edit/"),
        format!("/posts/{id}/comment/"),
        "/follow/".to_string(),
        "/profile/auth/follow/".to_string(),
    ] {
        let response = t.get(&uri, None).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{uri}");
        assert_eq!(location(&response), format!("/auth/login/?next={uri}"));
    }

    let response = t
        .post_form(&format!("/posts/{id}/comment/"), None, "text=Sneaky")
        .await;
    assert_eq!(location(&response), format!("/auth/login/?next=/posts/{id}/comment/"));
    assert_eq!(Comment::find().count(t.db.as_ref()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_non_author_edit_redirects_without_changes() {
    let t = setup().await;
    let author = t.create_user("auth").await;
    let other = t.create_user("other").await;
    let post = t.create_posts(&author, None, 1).await.remove(0);

    let response = t.get(&format!("/posts/{}/edit/", post.id), Some(&other)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/posts/{}/", post.id));

    let response = t
        .post_form(&format!("/posts/{}/edit/", post.id), Some(&other), "text=Hijacked")
        .await;
    assert_eq!(location(&response), format!("/posts/{}/", post.id));

    let unchanged = Post::find_by_id(post.id)
        .one(t.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged, post);
}

#[tokio::test]
async fn test_feeds_paginate_by_ten() {
    let t = setup().await;
    let author = t.create_user("auth").await;
    let group = t.create_group("test-slug").await;
    t.create_posts(&author, Some(&group), 13).await;
    t.create_posts(&author, None, 4).await;

    for (uri, first, second) in [
        ("/", 10, 7),
        ("/group/test-slug/", 10, 3),
        ("/profile/auth/", 10, 7),
    ] {
        let (_, context) = t.page(uri, None).await;
        assert_eq!(texts(&context["page_obj"]).len(), first, "{uri}");
        assert_eq!(context["page_obj"]["num_pages"], 2);

        let (_, context) = t.page(&format!("{uri}?page=2"), None).await;
        assert_eq!(texts(&context["page_obj"]).len(), second, "{uri}?page=2");
        assert_eq!(context["page_obj"]["has_next"], false);
    }

    // Past the end is the last page, garbage is the first
    let (_, context) = t.page("/group/test-slug/?page=99", None).await;
    assert_eq!(context["page_obj"]["number"], 2);
    let (_, context) = t.page("/group/test-slug/?page=abc", None).await;
    assert_eq!(context["page_obj"]["number"], 1);
}

#[tokio::test]
async fn test_feeds_are_newest_first() {
    let t = setup().await;
    let author = t.create_user("auth").await;
    t.create_posts(&author, None, 3).await;

    let (_, context) = t.page("/profile/auth/", None).await;
    assert_eq!(
        texts(&context["page_obj"]),
        ["Test post 2", "Test post 1", "Test post 0"]
    );
}

#[tokio::test]
async fn test_page_contexts() {
    let t = setup().await;
    let author = t.create_user("auth").await;
    let group = t.create_group("test-slug").await;
    let post = t.create_posts(&author, Some(&group), 1).await.remove(0);

    let (_, context) = t.page("/", None).await;
    let first = &context["page_obj"]["object_list"][0];
    assert_eq!(first["text"], post.text);
    assert_eq!(first["author"]["username"], "auth");
    assert_eq!(first["group"]["slug"], "test-slug");

    let (_, context) = t.page("/group/test-slug/", None).await;
    assert_eq!(context["group"]["title"], "Group test-slug");
    assert_eq!(context["group"]["description"], "Test description");

    let (_, context) = t.page("/profile/auth/", None).await;
    assert_eq!(context["author"]["username"], "auth");
    assert_eq!(context["full_name"], "Test User");
    assert_eq!(context["posts_count"], 1);
    assert_eq!(context["following"], false);

    let (_, context) = t.page(&format!("/posts/{}/", post.id), None).await;
    assert_eq!(context["post"]["id"], post.id);
    assert_eq!(context["posts_count"], 1);
    assert_eq!(context["form"]["text"], "");
    assert!(context["comments"].as_array().unwrap().is_empty());

    let (_, context) = t.page(&format!("/posts/{}/edit/", post.id), Some(&author)).await;
    assert_eq!(context["is_edit"], true);
    assert_eq!(context["form"]["text"], post.text);
    assert_eq!(context["form"]["group"], group.id.to_string());
}

#[tokio::test]
async fn test_post_in_group_stays_out_of_other_groups() {
    let t = setup().await;
    let author = t.create_user("auth").await;
    let group = t.create_group("test-slug").await;
    t.create_group("other-slug").await;

    let response = t
        .post_form(
            "/posts/create/",
            Some(&author),
            &format!("text=Grouped+post&group={}", group.id),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/profile/auth/");

    let (_, context) = t.page("/group/test-slug/", None).await;
    assert_eq!(texts(&context["page_obj"]), ["Grouped post"]);

    let (_, context) = t.page("/group/other-slug/", None).await;
    assert!(texts(&context["page_obj"]).is_empty());
}

#[tokio::test]
async fn test_create_post_with_image() {
    let t = setup().await;
    let author = t.create_user("auth").await;

    let response = t
        .post_multipart(
            "/posts/create/",
            &author,
            &[("text", "Post with picture"), ("group", "")],
            Some(("small.gif", SMALL_GIF)),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/profile/auth/");

    let post = Post::find().one(t.db.as_ref()).await.unwrap().unwrap();
    assert_eq!(post.text, "Post with picture");
    assert_eq!(post.author_id, author.id);
    assert_eq!(post.group_id, None);
    assert_eq!(post.image.as_deref(), Some("posts/small.gif"));
    assert!(t.media.path().join("posts/small.gif").exists());

    let (_, context) = t.page(&format!("/posts/{}/", post.id), None).await;
    assert_eq!(context["post"]["image_url"], "/media/posts/small.gif");

    let served = t.get("/media/posts/small.gif", None).await;
    assert_eq!(served.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_post_form_is_redisplayed() {
    let t = setup().await;
    let author = t.create_user("auth").await;

    let response = t
        .post_multipart(
            "/posts/create/",
            &author,
            &[("text", "  "), ("group", "9999")],
            Some(("fake.gif", b"not an image".as_slice())),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = body_json(response).await;
    assert_eq!(doc["template"], "posts/create_post.html");
    let errors = &doc["context"]["errors"];
    assert_eq!(errors["text"][0], "This field is required.");
    assert!(errors["group"][0].as_str().unwrap().starts_with("Select a valid choice."));
    assert!(errors["image"][0].as_str().unwrap().starts_with("Upload a valid image."));
    assert_eq!(t.post_count().await, 0);
}

#[tokio::test]
async fn test_author_edit_keeps_author_and_date() {
    let t = setup().await;
    let author = t.create_user("auth").await;
    let group = t.create_group("test-slug").await;
    let post = t.create_posts(&author, Some(&group), 1).await.remove(0);

    let response = t
        .post_form(&format!("/posts/{}/edit/", post.id), Some(&author), "text=Edited+text")
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/posts/{}/", post.id));

    let edited = Post::find_by_id(post.id)
        .one(t.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(edited.text, "Edited text");
    assert_eq!(edited.author_id, post.author_id);
    assert_eq!(edited.pub_date, post.pub_date);
    assert_eq!(edited.group_id, None);
    assert_eq!(t.post_count().await, 1);
}

#[tokio::test]
async fn test_comments_shown_oldest_first() {
    let t = setup().await;
    let author = t.create_user("auth").await;
    let reader = t.create_user("reader").await;
    let post = t.create_posts(&author, None, 1).await.remove(0);
    let uri = format!("/posts/{}/comment/", post.id);

    for text in ["text=First", "text=Second", "text=+++"] {
        let response = t.post_form(&uri, Some(&reader), text).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), format!("/posts/{}/", post.id));
    }

    let (_, context) = t.page(&format!("/posts/{}/", post.id), None).await;
    let comments: Vec<&str> = context["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["text"].as_str().unwrap())
        .collect();
    assert_eq!(comments, ["First", "Second"]);
    assert_eq!(context["comments"][0]["author"]["username"], "reader");
}

#[tokio::test]
async fn test_follow_then_unfollow() {
    let t = setup().await;
    let author = t.create_user("auth").await;
    let reader = t.create_user("reader").await;
    let stranger = t.create_user("stranger").await;
    t.create_posts(&author, None, 2).await;

    let response = t.get("/profile/auth/follow/", Some(&reader)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/profile/auth/");

    // Repeating the follow and following yourself change nothing
    t.get("/profile/auth/follow/", Some(&reader)).await;
    t.get("/profile/reader/follow/", Some(&reader)).await;

    let (_, context) = t.page("/profile/auth/", Some(&reader)).await;
    assert_eq!(context["following"], true);

    let (_, context) = t.page("/follow/", Some(&reader)).await;
    assert_eq!(texts(&context["page_obj"]).len(), 2);

    let (_, context) = t.page("/follow/", Some(&stranger)).await;
    assert!(texts(&context["page_obj"]).is_empty());

    let response = t.get("/profile/auth/unfollow/", Some(&reader)).await;
    assert_eq!(location(&response), "/profile/auth/");

    let (_, context) = t.page("/profile/auth/", Some(&reader)).await;
    assert_eq!(context["following"], false);

    // Unfollowing again is a no-op
    let response = t.get("/profile/auth/unfollow/", Some(&reader)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_index_is_cached_until_cleared() {
    let t = setup().await;
    let author = t.create_user("auth").await;
    let admin = t.create_user_with("admin", true).await;

    let before = body_json(t.get("/", None).await).await;
    assert!(texts(&before["context"]["page_obj"]).is_empty());

    let response = t
        .post_form("/posts/create/", Some(&author), "text=Fresh+post")
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let cached = body_json(t.get("/", None).await).await;
    assert_eq!(cached, before);

    let response = t.post_json("/admin/cache/clear/", Some(&admin), "{}").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let after = body_json(t.get("/", None).await).await;
    assert_eq!(texts(&after["context"]["page_obj"]), ["Fresh post"]);
}

#[tokio::test]
async fn test_index_cache_ignores_unrelated_query_parameters() {
    let t = setup().await;
    let author = t.create_user("auth").await;

    let before = body_json(t.get("/", None).await).await;
    t.post_form("/posts/create/", Some(&author), "text=Fresh+post")
        .await;

    // Same page, so the same cache entry
    let junk = body_json(t.get("/?utm_source=mail&page=1", None).await).await;
    assert_eq!(junk, before);
    let garbage = body_json(t.get("/?page=abc", None).await).await;
    assert_eq!(garbage, before);
}

/// A cache whose backend is down.
struct UnavailablePageCache;

#[async_trait::async_trait]
impl PageCache for UnavailablePageCache {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::Cache("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _body: &str, _ttl: std::time::Duration) -> AppResult<()> {
        Err(AppError::Cache("connection refused".to_string()))
    }

    async fn clear(&self) -> AppResult<()> {
        Err(AppError::Cache("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_index_renders_when_cache_is_unavailable() {
    let t = setup_with_cache(Arc::new(UnavailablePageCache)).await;
    let author = t.create_user("auth").await;
    t.create_posts(&author, None, 2).await;

    let (template, context) = t.page("/", None).await;
    assert_eq!(template, "posts/index.html");
    assert_eq!(texts(&context["page_obj"]).len(), 2);
}

#[tokio::test]
async fn test_admin_creates_groups() {
    let t = setup().await;
    let admin = t.create_user_with("admin", true).await;
    let user = t.create_user("user").await;
    let body = format!(r#"{{"title": "{}"}}"#, "Group".repeat(15));

    let response = t.post_json("/admin/groups/", None, &body).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let response = t.post_json("/admin/groups/", Some(&user), &body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = t.post_json("/admin/groups/", Some(&admin), &body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let group = body_json(response).await;
    assert_eq!(group["slug"], "group".repeat(10));

    let response = t.post_json("/admin/groups/", Some(&admin), &body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = t
        .post_json(
            "/admin/groups/",
            Some(&admin),
            r#"{"title": "Explicit", "slug": "chosen"}"#,
        )
        .await;
    let group = body_json(response).await;
    assert_eq!(group["slug"], "chosen");
}

#[tokio::test]
async fn test_signup_login_logout() {
    let t = setup().await;

    let response = t
        .post_form(
            "/auth/signup/",
            None,
            "username=newbie&password=long-enough-pw&first_name=New&last_name=Bie",
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("sessionid="));

    let response = t
        .post_form(
            "/auth/login/",
            None,
            "username=newbie&password=wrong&next=/follow/",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert_eq!(doc["template"], "users/login.html");
    assert!(doc["context"]["errors"]["__all__"].is_array());

    let response = t
        .post_form(
            "/auth/login/",
            None,
            "username=newbie&password=long-enough-pw&next=/follow/",
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/follow/");

    let user = UserRepository::new(t.db.clone())
        .get_by_username("newbie")
        .await
        .unwrap();
    assert_eq!(user.full_name(), "New Bie");
    let (_, context) = t.page("/follow/", Some(&user)).await;
    assert!(context["page_obj"].is_object());

    let (template, _) = t.page("/auth/logout/", Some(&user)).await;
    assert_eq!(template, "users/logged_out.html");

    // The old session no longer authenticates
    let response = t.get("/follow/", Some(&user)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_duplicate_signup_is_rejected() {
    let t = setup().await;
    t.create_user("taken").await;

    let response = t
        .post_form("/auth/signup/", None, "username=taken&password=long-enough-pw")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert_eq!(
        doc["context"]["errors"]["username"][0],
        "A user with that username already exists."
    );
}
