//! HTTP endpoint integration tests.
//!
//! Drives the admin router in-process:
//! - `/health` - liveness
//! - `/admin/comments` - statistics page
//! - `/admin/comments/purge` - bulk delete
//! - `/admin/comments/backup` and `/download` - backup lifecycle

#[path = "common.rs"]
mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use commentctl::security::NonceAction;
use common::{ADMIN_TOKEN, TestHost, body_bytes, body_json, wait_for_removal};
use std::time::Duration;
use serde_json::json;

// =============================================================================
// Health and Authorization
// =============================================================================

#[tokio::test]
async fn test_health_needs_no_token() {
    let host = TestHost::start().await;
    let resp = host
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "ok");
}

#[tokio::test]
async fn test_admin_routes_reject_missing_token() {
    let host = TestHost::start().await;
    let resp = host
        .send(Request::get("/admin/comments").body(Body::empty()).unwrap())
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["code"], "unauthorized");
}

#[tokio::test]
async fn test_admin_routes_reject_wrong_token() {
    let host = TestHost::start().await;
    let resp = host
        .send(
            Request::post("/admin/comments/purge")
                .header(header::AUTHORIZATION, "Bearer not-the-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status":"all","nonce":""}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(host.scalar("SELECT COUNT(*) FROM wp_comments"), 8);
}

#[tokio::test]
async fn test_bearer_scheme_is_case_insensitive() {
    let host = TestHost::start().await;
    let resp = host
        .send(
            Request::get("/admin/comments")
                .header(header::AUTHORIZATION, format!("bearer {ADMIN_TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// =============================================================================
// Statistics Page
// =============================================================================

#[tokio::test]
async fn test_admin_page_shows_grouped_counts() {
    let host = TestHost::start().await;
    let resp = host.get("/admin/comments").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_json(resp).await;

    let stats = page["stats"].as_array().unwrap();
    let labels: Vec<_> = stats.iter().map(|r| r["post_type"].as_str().unwrap()).collect();
    assert_eq!(labels, ["No post type", "page", "post"]);

    let post = &stats[2];
    assert_eq!(post["approved"], 3);
    assert_eq!(post["pending"], 2);
    assert_eq!(post["spam"], 1);
    assert_eq!(post["trash"], 0);
    assert_eq!(post["total"], 6);

    assert_eq!(page["totals"]["total"], 8);
    assert_eq!(page["controls"].as_array().unwrap().len(), 5);
    assert!(page.get("notice").is_none());
    assert_eq!(page["nonces"]["delete_comments"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_admin_page_with_no_comments() {
    let host = TestHost::with_seed("").await;
    let page = body_json(host.get("/admin/comments").await).await;
    assert_eq!(page["stats"], json!([]));
    assert_eq!(page["totals"]["total"], 0);
}

// =============================================================================
// Bulk Delete
// =============================================================================

#[tokio::test]
async fn test_purge_requires_valid_nonce() {
    let host = TestHost::start().await;
    let backup_nonce = host.nonce(NonceAction::CommentsBackup);

    let resp = host
        .post_json(
            "/admin/comments/purge",
            json!({"status": "spam", "nonce": backup_nonce}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["message"], "Security check failed");
    assert_eq!(
        host.scalar("SELECT COUNT(*) FROM wp_comments WHERE comment_approved = 'spam'"),
        1
    );
}

#[tokio::test]
async fn test_purge_spam_then_approved_recounts_posts() {
    let host = TestHost::start().await;

    let resp = host
        .post_json(
            "/admin/comments/purge",
            json!({"status": "spam", "nonce": host.nonce(NonceAction::DeleteComments)}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_json(resp).await;
    assert_eq!(page["notice"]["kind"], "success");
    assert_eq!(
        page["notice"]["message"],
        "All spam comments have been deleted successfully!"
    );
    assert_eq!(host.comment_count(7), 3);
    assert_eq!(
        host.scalar("SELECT COUNT(*) FROM wp_commentmeta WHERE comment_id = 6"),
        0
    );
    assert_eq!(host.scalar("SELECT COUNT(*) FROM wp_commentmeta"), 1);

    let resp = host
        .post_json(
            "/admin/comments/purge",
            json!({"status": "approved", "nonce": host.nonce(NonceAction::DeleteComments)}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(host.comment_count(7), 0);
    assert_eq!(host.scalar("SELECT COUNT(*) FROM wp_comments"), 3);
}

#[tokio::test]
async fn test_purge_trash_message() {
    let host = TestHost::start().await;
    let page = body_json(
        host.post_json(
            "/admin/comments/purge",
            json!({"status": "delete_trash", "nonce": host.nonce(NonceAction::DeleteComments)}),
        )
        .await,
    )
    .await;
    assert_eq!(
        page["notice"]["message"],
        "All trashed comments have been deleted successfully!"
    );
    assert_eq!(host.scalar("SELECT COUNT(*) FROM wp_comments WHERE comment_approved = 'trash'"), 0);
}

#[tokio::test]
async fn test_purge_all_clears_comments_and_meta() {
    let host = TestHost::start().await;
    let resp = host
        .post_json(
            "/admin/comments/purge",
            json!({"status": "all", "nonce": host.nonce(NonceAction::DeleteComments)}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_json(resp).await;
    assert_eq!(
        page["notice"]["message"],
        "All comments have been deleted successfully!"
    );
    assert_eq!(page["stats"], json!([]));
    assert_eq!(host.scalar("SELECT COUNT(*) FROM wp_comments"), 0);
    assert_eq!(host.scalar("SELECT COUNT(*) FROM wp_commentmeta"), 0);
    assert_eq!(host.scalar("SELECT SUM(comment_count) FROM wp_posts"), 0);
}

#[tokio::test]
async fn test_purge_unknown_status_renders_error_notice() {
    let host = TestHost::start().await;
    let resp = host
        .post_json(
            "/admin/comments/purge",
            json!({"status": "everything", "nonce": host.nonce(NonceAction::DeleteComments)}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let page = body_json(resp).await;
    assert_eq!(page["notice"]["kind"], "error");
    assert_eq!(page["stats"].as_array().unwrap().len(), 3);
    assert_eq!(host.scalar("SELECT COUNT(*) FROM wp_comments"), 8);
}

// =============================================================================
// Backup Lifecycle
// =============================================================================

fn path_of(download_url: &str) -> &str {
    download_url
        .strip_prefix("http://admin.test")
        .expect("download url uses public_url")
}

#[tokio::test]
async fn test_backup_then_download_once() {
    let host = TestHost::start().await;

    let resp = host
        .post_json(
            "/admin/comments/backup",
            json!({"nonce": host.nonce(NonceAction::CommentsBackup)}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created = body_json(resp).await;
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["message"], "Backup created successfully");

    let file = created["data"]["file"].as_str().unwrap().to_string();
    assert!(file.starts_with("comments-backup-") && file.ends_with(".zip"));
    let artifact = host.backup_dir().join(&file);
    let on_disk = std::fs::read(&artifact).unwrap();
    assert!(host.backup_dir().join("index.html").exists());

    let url = created["data"]["download_url"].as_str().unwrap().to_string();
    let resp = host.get(path_of(&url)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "application/octet-stream");
    assert_eq!(
        headers[header::CONTENT_LENGTH],
        on_disk.len().to_string().as_str()
    );
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"{file}\"").as_str()
    );
    assert!(
        headers[header::CACHE_CONTROL]
            .to_str()
            .unwrap()
            .contains("no-cache")
    );

    let body = body_bytes(resp).await;
    assert_eq!(body, on_disk);
    assert!(
        wait_for_removal(&artifact).await,
        "artifact removed after full download"
    );

    let again = host.get(path_of(&url)).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(again).await["message"],
        "File not found or not readable."
    );
}

#[tokio::test]
async fn test_backup_requires_backup_nonce() {
    let host = TestHost::start().await;
    let resp = host
        .post_json(
            "/admin/comments/backup",
            json!({"nonce": host.nonce(NonceAction::DeleteComments)}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(!host.backup_dir().exists());
}

#[tokio::test]
async fn test_backup_failure_envelope() {
    let host = TestHost::start().await;
    host.sqlite.execute_batch("DROP TABLE wp_commentmeta;").unwrap();

    let resp = host
        .post_json(
            "/admin/comments/backup",
            json!({"nonce": host.nonce(NonceAction::CommentsBackup)}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["message"], "Backup failed: Database error");
    assert!(!host.backup_dir().exists());
}

#[tokio::test]
async fn test_download_rejects_bad_nonce_and_keeps_file() {
    let host = TestHost::start().await;
    let artifact = host.app.generator.generate().await.unwrap();

    let uri = format!(
        "/admin/comments/backup/download?file={}&nonce={}",
        artifact.file,
        host.nonce(NonceAction::CommentsBackup)
    );
    let resp = host.get(&uri).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(artifact.path.exists());
}

#[tokio::test]
async fn test_download_traversal_never_escapes_backup_dir() {
    let host = TestHost::start().await;
    std::fs::create_dir_all(host.backup_dir()).unwrap();
    let db = host.dir.path().join("comments.db");
    assert!(db.exists());

    let uri = format!(
        "/admin/comments/backup/download?file=..%2F..%2Fcomments.db&nonce={}",
        host.nonce(NonceAction::DownloadBackup)
    );
    let resp = host.get(&uri).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(db.exists());
}

#[tokio::test]
async fn test_download_missing_file_is_not_found() {
    let host = TestHost::start().await;
    let uri = format!(
        "/admin/comments/backup/download?file=comments-backup-2000-01-01-00-00-00.zip&nonce={}",
        host.nonce(NonceAction::DownloadBackup)
    );
    let resp = host.get(&uri).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["code"], "not_found");
}

#[tokio::test]
async fn test_unread_download_keeps_artifact() {
    let host = TestHost::start().await;
    let artifact = host.app.generator.generate().await.unwrap();
    let size = std::fs::metadata(&artifact.path).unwrap().len();
    assert!(size < 8192, "fits in a single chunk");

    let resp = host.get(path_of(&host.app.download_url(&artifact.file))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(artifact.path.exists(), "nothing read yet");

    drop(resp);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(artifact.path.exists(), "client went away before the body");

    // A retry still gets the whole archive.
    let original = std::fs::read(&artifact.path).unwrap();
    let resp = host.get(path_of(&host.app.download_url(&artifact.file))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, original);
    assert!(wait_for_removal(&artifact.path).await);
}

#[tokio::test]
async fn test_download_refuses_placeholder_and_intermediates() {
    let host = TestHost::start().await;
    host.app.generator.generate().await.unwrap();
    let placeholder = host.backup_dir().join("index.html");
    let json = host.backup_dir().join("comments-backup-2000-01-01-00-00-00.json");
    std::fs::write(&json, b"{}").unwrap();

    for name in ["index.html", "comments-backup-2000-01-01-00-00-00.json"] {
        let resp = host.get(path_of(&host.app.download_url(name))).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{name}");
    }
    assert!(placeholder.exists());
    assert!(json.exists());
}
