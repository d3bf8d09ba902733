//! Shared fixtures for integration tests.
//!
//! `TestHost` owns a scratch directory with a seeded comment database and
//! an uploads area, and drives the admin router in-process.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, header};
use commentctl::app::App;
use commentctl::config::Config;
use commentctl::security::NonceAction;
use commentctl::store::{CommentService, SqliteStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "test-admin-token-0123456789";

/// Post #7 has 3 approved, 2 pending and 1 spam comment; post #8 (a page)
/// has one trashed comment; comment 9 points at a post that does not exist.
pub const SEED_SQL: &str = "
    INSERT INTO wp_posts (ID, post_title, post_type, comment_count) VALUES
        (7, 'Hello world', 'post', 42),
        (8, 'About', 'page', 0);
    INSERT INTO wp_comments (comment_ID, comment_post_ID, comment_author, comment_content, comment_approved) VALUES
        (1, 7, 'ann', 'first', '1'),
        (2, 7, 'bob', 'second', '1'),
        (3, 7, 'cid', 'third', '1'),
        (4, 7, 'dee', 'waiting', '0'),
        (5, 7, 'eve', 'waiting too', '0'),
        (6, 7, 'bot', 'buy now', 'spam'),
        (7, 8, 'old', 'binned', 'trash'),
        (9, 404, 'orphan', 'lost', '1');
    INSERT INTO wp_commentmeta (meta_id, comment_id, meta_key, meta_value) VALUES
        (1, 1, 'rating', '5'),
        (2, 6, 'akismet_result', 'true'),
        (3, 6, 'akismet_history', 'caught');
";

pub struct TestHost {
    pub dir: TempDir,
    pub app: App,
    pub sqlite: SqliteStore,
    router: Router,
}

impl TestHost {
    /// Seeded host.
    pub async fn start() -> Self {
        Self::with_seed(SEED_SQL).await
    }

    pub async fn with_seed(seed: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let db_path = dir.path().join("comments.db");
        let sqlite = SqliteStore::open(&db_path, "wp_").expect("open db");
        let store = CommentService::custom(sqlite.clone());
        store.ensure_schema().await.expect("schema");
        if !seed.trim().is_empty() {
            sqlite.execute_batch(seed).expect("seed");
        }

        let config = Self::config(dir.path());
        let app = App::new(store, &config).expect("app");
        let router = commentctl::http::router(app.clone());

        Self {
            dir,
            app,
            sqlite,
            router,
        }
    }

    pub fn config(root: &Path) -> Config {
        let mut config = Config::default();
        config.database.path = Some(root.join("comments.db"));
        config.backup.uploads_dir = Some(root.join("uploads"));
        config.server.public_url = Some("http://admin.test".into());
        config.auth.admin_token = Some(ADMIN_TOKEN.into());
        config.auth.nonce_secret = Some("test-nonce-secret".into());
        config
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.app.backup_dir().to_path_buf()
    }

    pub fn nonce(&self, action: NonceAction) -> String {
        self.app.nonces.issue(action)
    }

    pub fn comment_count(&self, post_id: i64) -> i64 {
        self.scalar(&format!(
            "SELECT comment_count FROM wp_posts WHERE ID = {post_id}"
        ))
    }

    pub fn scalar(&self, sql: &str) -> i64 {
        let conn = rusqlite::Connection::open(self.dir.path().join("comments.db")).expect("open");
        conn.query_row(sql, [], |r| r.get(0)).expect("scalar")
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.expect("router")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::get(uri)
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.send(
            Request::post(uri)
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }
}

/// Waits for the delivery task to settle `path` one way or the other.
pub async fn wait_for_removal(path: &Path) -> bool {
    for _ in 0..100 {
        if !path.exists() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    false
}

pub async fn body_bytes(resp: Response<Body>) -> Vec<u8> {
    to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(resp).await).expect("json body")
}
