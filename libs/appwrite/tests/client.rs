//! Integration tests for the HTTP client
//!
//! A small axum server stands in for the hosted backend so the tests can
//! check headers, the session cookie, query encoding and error mapping.

use std::sync::{Arc, Mutex};

use appwrite::{
    AppwriteClient, Backend, FileAsset, ImageGravity, PreviewOptions, Query, Url,
    storage::CHUNK_SIZE,
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use common::{AppwriteConfig, BackendError};
use serde_json::{Value, json};
use tokio::net::TcpListener;

const PROJECT: &str = "stub-project";
const SESSION_COOKIE: &str = "a_session_stub-project=secret-token";

fn error(status: StatusCode, message: &str, kind: &str) -> Response {
    (
        status,
        Json(json!({
            "message": message,
            "code": status.as_u16(),
            "type": kind,
        })),
    )
        .into_response()
}

fn account_json() -> Value {
    json!({
        "$id": "acc1",
        "$createdAt": "2024-05-01T10:00:00.000+00:00",
        "$updatedAt": "2024-05-01T10:00:00.000+00:00",
        "name": "jane",
        "email": "jane@example.com",
        "status": true,
        "emailVerification": false
    })
}

async fn create_session(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers.get("x-appwrite-project").and_then(|v| v.to_str().ok()) != Some(PROJECT) {
        return error(StatusCode::BAD_REQUEST, "Missing project", "project_unknown");
    }
    if body["password"] != "password123" {
        return error(
            StatusCode::UNAUTHORIZED,
            "Invalid credentials. Please check the email and password.",
            "user_invalid_credentials",
        );
    }

    (
        StatusCode::CREATED,
        [(header::SET_COOKIE, format!("{}; Path=/; HttpOnly", SESSION_COOKIE))],
        Json(json!({
            "$id": "sess1",
            "$createdAt": "2024-05-01T10:00:00.000+00:00",
            "userId": "acc1",
            "expire": "2025-05-01T10:00:00.000+00:00",
            "provider": "email",
            "current": true
        })),
    )
        .into_response()
}

async fn get_account(headers: HeaderMap) -> Response {
    let has_session = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|cookie| cookie.contains(SESSION_COOKIE));

    if has_session {
        Json(account_json()).into_response()
    } else {
        error(
            StatusCode::UNAUTHORIZED,
            "User (role: guests) missing scope (account)",
            "general_unauthorized_scope",
        )
    }
}

async fn create_account(Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@example.com" {
        return error(
            StatusCode::CONFLICT,
            "A user with the same id, email, or phone already exists in this project.",
            "user_already_exists",
        );
    }
    (StatusCode::CREATED, Json(account_json())).into_response()
}

async fn list_documents(
    Path((database, collection)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Response {
    if collection != "videos" {
        return error(
            StatusCode::NOT_FOUND,
            "Collection with the requested ID could not be found.",
            "collection_not_found",
        );
    }

    Json(json!({
        "total": 1,
        "documents": [{
            "$id": "post1",
            "$collectionId": collection,
            "$databaseId": database,
            "$createdAt": "2024-05-01T10:00:00.000+00:00",
            "$updatedAt": "2024-05-01T10:00:00.000+00:00",
            "$permissions": [],
            "title": "Sunset",
            "echo": query.unwrap_or_default()
        }]
    }))
    .into_response()
}

async fn delete_file(Path((_bucket, file)): Path<(String, String)>) -> Response {
    if file == "missing" {
        return error(
            StatusCode::NOT_FOUND,
            "The requested file could not be found.",
            "storage_file_not_found",
        );
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn create_file(headers: HeaderMap) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("multipart/form-data") {
        return error(StatusCode::BAD_REQUEST, "Expected multipart", "storage_invalid_file");
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "$id": "file1",
            "bucketId": "media",
            "$createdAt": "2024-05-01T10:00:00.000+00:00",
            "name": "thumb.png",
            "mimeType": "image/png",
            "sizeOriginal": 3,
            "chunksTotal": 1,
            "chunksUploaded": 1
        })),
    )
        .into_response()
}

async fn server_error() -> Response {
    error(
        StatusCode::SERVICE_UNAVAILABLE,
        "Server is under maintenance",
        "general_server_error",
    )
}

async fn spawn_stub() -> AppwriteClient {
    let app = Router::new()
        .route("/v1/account", get(get_account).post(create_account))
        .route("/v1/account/sessions/email", post(create_session))
        .route("/v1/account/sessions/current", delete(server_error))
        .route(
            "/v1/databases/:database/collections/:collection/documents",
            get(list_documents),
        )
        .route("/v1/storage/buckets/:bucket/files", post(create_file))
        .route("/v1/storage/buckets/:bucket/files/:file", delete(delete_file));

    client_for(app).await
}

async fn client_for(app: Router) -> AppwriteClient {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let address = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub server failed");
    });

    let config = AppwriteConfig {
        endpoint: format!("http://{}/v1", address),
        platform: "com.jsm.aora".to_string(),
        project_id: PROJECT.to_string(),
        database_id: "db".to_string(),
        user_collection_id: "users".to_string(),
        video_collection_id: "videos".to_string(),
        storage_id: "media".to_string(),
        timeout_secs: 5,
    };
    AppwriteClient::new(&config).expect("Failed to build client")
}

#[tokio::test]
async fn test_session_cookie_is_reused() {
    let client = spawn_stub().await;

    let err = client.get_account().await.unwrap_err();
    assert!(err.is_unauthorized());

    let session = client
        .create_email_password_session("jane@example.com", "password123")
        .await
        .expect("Failed to sign in");
    assert_eq!(session.user_id, "acc1");
    assert!(session.current);

    let account = client.get_account().await.expect("Failed to get account");
    assert_eq!(account.id, "acc1");
    assert_eq!(account.name, "jane");
}

#[tokio::test]
async fn test_error_bodies_map_to_kinds() {
    let client = spawn_stub().await;

    match client
        .create_email_password_session("jane@example.com", "wrong")
        .await
    {
        Err(BackendError::Unauthorized(message)) => {
            assert!(message.starts_with("Invalid credentials"))
        }
        other => panic!("unexpected result: {other:?}"),
    }

    assert!(matches!(
        client
            .create_account("u1", "taken@example.com", "password123", "jane")
            .await,
        Err(BackendError::Conflict(_))
    ));

    assert!(matches!(
        client.list_documents("db", "missing", &[]).await,
        Err(BackendError::NotFound(_))
    ));

    match client.delete_session("current").await {
        Err(BackendError::Server { code, message }) => {
            assert_eq!(code, 503);
            assert_eq!(message, "Server is under maintenance");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_queries_are_sent_as_json_params() {
    let client = spawn_stub().await;

    let list = client
        .list_documents(
            "db",
            "videos",
            &[Query::order_desc("$createdAt"), Query::limit(7)],
        )
        .await
        .expect("Failed to list documents");

    assert_eq!(list.total, 1);
    let document = &list.documents[0];
    assert_eq!(document.id, "post1");
    assert_eq!(document.data["title"], "Sunset");

    let echo = document.data["echo"].as_str().expect("No echoed query");
    let decoded: Vec<(String, String)> = Url::parse(&format!("http://x/?{}", echo))
        .expect("Bad echoed query")
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        decoded,
        vec![
            (
                "queries[]".to_string(),
                r#"{"method":"orderDesc","attribute":"$createdAt"}"#.to_string()
            ),
            (
                "queries[]".to_string(),
                r#"{"method":"limit","values":[7]}"#.to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_upload_and_delete_file() {
    let client = spawn_stub().await;

    let file = FileAsset::new("thumb.png", "image/png", vec![1, 2, 3]);
    let stored = client
        .create_file("media", "file1", &file)
        .await
        .expect("Failed to upload");
    assert_eq!(stored.id, "file1");
    assert_eq!(stored.size_original, 3);

    client
        .delete_file("media", "file1")
        .await
        .expect("Failed to delete");
    assert!(matches!(
        client.delete_file("media", "missing").await,
        Err(BackendError::NotFound(_))
    ));
}

/// `Content-Range` and `x-appwrite-id` of every chunk received
type ChunkLog = Arc<Mutex<Vec<(String, Option<String>)>>>;

async fn record_chunk(State(log): State<ChunkLog>, headers: HeaderMap, _body: Bytes) -> Response {
    let header_text = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let range = header_text("content-range").unwrap_or_default();
    let upload_id = header_text("x-appwrite-id");

    let uploaded = {
        let mut log = log.lock().expect("Chunk log poisoned");
        log.push((range, upload_id));
        log.len()
    };

    (
        StatusCode::CREATED,
        Json(json!({
            "$id": "srv-file",
            "bucketId": "media",
            "$createdAt": "2024-05-01T10:00:00.000+00:00",
            "name": "clip.mp4",
            "mimeType": "video/mp4",
            "sizeOriginal": 2 * CHUNK_SIZE + 10,
            "chunksTotal": 3,
            "chunksUploaded": uploaded
        })),
    )
        .into_response()
}

#[tokio::test]
async fn test_large_file_is_uploaded_in_chunks() {
    let log = ChunkLog::default();
    let app = Router::new()
        .route("/v1/storage/buckets/:bucket/files", post(record_chunk))
        .layer(DefaultBodyLimit::disable())
        .with_state(log.clone());
    let client = client_for(app).await;

    let file = FileAsset::new("clip.mp4", "video/mp4", vec![7; 2 * CHUNK_SIZE + 10]);
    let stored = client
        .create_file("media", "client-id", &file)
        .await
        .expect("Failed to upload");

    assert_eq!(stored.id, "srv-file");
    assert_eq!(stored.chunks_uploaded, 3);

    let chunks = log.lock().expect("Chunk log poisoned").clone();
    assert_eq!(
        chunks,
        vec![
            ("bytes 0-5242879/10485770".to_string(), None),
            (
                "bytes 5242880-10485759/10485770".to_string(),
                Some("srv-file".to_string())
            ),
            (
                "bytes 10485760-10485769/10485770".to_string(),
                Some("srv-file".to_string())
            ),
        ]
    );
}

#[tokio::test]
async fn test_url_builders_do_not_hit_the_network() {
    let client = spawn_stub().await;

    let view = client.get_file_view("media", "file1").expect("No view URL");
    assert!(view.path().ends_with("/storage/buckets/media/files/file1/view"));
    assert_eq!(view.query(), Some("project=stub-project"));

    let preview = client
        .get_file_preview(
            "media",
            "file1",
            &PreviewOptions {
                width: Some(2000),
                height: Some(2000),
                gravity: Some(ImageGravity::Top),
                quality: Some(100),
            },
        )
        .expect("No preview URL");
    assert_eq!(
        preview.query(),
        Some("width=2000&height=2000&gravity=top&quality=100&project=stub-project")
    );

    let avatar = client.get_initials("Jane Doe").expect("No avatar URL");
    assert_eq!(avatar.query(), Some("name=Jane+Doe&project=stub-project"));
}
