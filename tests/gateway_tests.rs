/*!
 * Integration tests for the gateway dispatcher
 */

use ferry::{
    core::WritePolicy,
    error::TransferError,
    functions::{FunctionName, GatewayEvent, TransferService},
    protocol::http::RemoteFetcher,
    protocol::s3::{BackendFlavor, MemoryObjectStore, ObjectStore, S3Error},
};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

fn gateway_with(store: &MemoryObjectStore, location: &str) -> TransferService {
    TransferService::new(
        Arc::new(store.clone()),
        RemoteFetcher::new().unwrap(),
        WritePolicy::for_flavor(store.flavor(), None),
        location,
    )
}

fn event(function_type: &str, data: &str) -> GatewayEvent {
    GatewayEvent {
        function_type: function_type.to_string(),
        data: data.to_string(),
    }
}

#[tokio::test]
async fn test_unknown_function_touches_nothing() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let store = MemoryObjectStore::new("files", "us-east-1", BackendFlavor::Compatible);
    let service = gateway_with(&store, "us-east-1");

    let err = service
        .gateway(event("transcode", &format!("{}/a.png", server.url())))
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::UnknownFunction(ref name) if name == "transcode"));
    assert_eq!(err.to_string(), "function type \"transcode\" is invalid");
    assert_eq!(store.call_count(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_creates_missing_bucket_at_configured_location() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/img/photo.jpg")
        .with_status(200)
        .with_body(b"\xFF\xD8\xFF\xE0\x00\x10JFIF")
        .create_async()
        .await;

    let store = MemoryObjectStore::without_bucket("files", "eu-central-1", BackendFlavor::Compatible);
    let service = gateway_with(&store, "eu-central-1");

    let response = service
        .gateway(event("upload", &format!("{}/img/photo.jpg", server.url())))
        .await
        .unwrap();

    assert_eq!(response.message, "written bytes: 10");
    assert!(response.data.is_empty());
    assert_eq!(store.created_locations(), vec!["eu-central-1".to_string()]);
    assert_eq!(store.puts()[0].content_type, "image/jpeg");
    assert!(store.bucket_exists().await.unwrap());
}

#[tokio::test]
async fn test_upload_checks_bucket_every_time() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/a.txt")
        .with_status(200)
        .with_body("abc")
        .expect(2)
        .create_async()
        .await;

    let store = MemoryObjectStore::new("files", "us-east-1", BackendFlavor::Compatible);
    let service = gateway_with(&store, "us-east-1");
    let url = format!("{}/a.txt", server.url());

    service.gateway(event("upload", &url)).await.unwrap();
    service.gateway(event("upload", &url)).await.unwrap();

    // HeadBucket + PutObject per upload, no CreateBucket
    assert_eq!(store.call_count(), 4);
    assert!(store.created_locations().is_empty());
}

#[tokio::test]
async fn test_upload_with_invalid_url_skips_bucket_check() {
    let store = MemoryObjectStore::without_bucket("files", "us-east-1", BackendFlavor::Aws);
    let service = gateway_with(&store, "us-east-1");

    let err = service
        .gateway(event("upload", "definitely not a url"))
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::InvalidRequest(_)));
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn test_bucket_check_failure_is_backend_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let store = MemoryObjectStore::new("files", "us-east-1", BackendFlavor::Aws);
    store.fail_with(S3Error::AccessDenied("expired token".to_string()));
    let service = gateway_with(&store, "us-east-1");

    let err = service
        .gateway(event("upload", &format!("{}/a.txt", server.url())))
        .await
        .unwrap_err();

    assert_eq!(err.category().to_string(), "BackendError");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_download_returns_bytes() {
    let store = MemoryObjectStore::new("files", "us-east-1", BackendFlavor::Compatible);
    store.insert("hello.txt", &b"hello"[..], "text/plain");
    let service = gateway_with(&store, "us-east-1");

    let response = service.gateway(event("download", "hello.txt")).await.unwrap();

    assert_eq!(response.message, "read bytes: 5");
    assert_eq!(response.data.as_ref(), b"hello");
}

#[tokio::test]
async fn test_download_missing_is_not_found() {
    let store = MemoryObjectStore::new("files", "us-east-1", BackendFlavor::Compatible);
    let service = gateway_with(&store, "us-east-1");

    let err = service
        .gateway(event("download", "missing.bin"))
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::NotFound { .. }));
}

#[tokio::test]
async fn test_invoke_gateway_json() {
    let store = MemoryObjectStore::new("files", "us-east-1", BackendFlavor::Compatible);
    store.insert("abc.bin", &b"abc"[..], "application/octet-stream");
    let service = gateway_with(&store, "us-east-1");

    let response = service
        .invoke(
            FunctionName::Gateway,
            json!({ "functionType": "download", "data": "abc.bin" }),
        )
        .await
        .unwrap();

    assert_eq!(response, json!({ "message": "read bytes: 3", "data": "YWJj" }));
}
