//! Integration tests for the REST-backed store and query client

use nomatch_core::{ArtifactStore, BigQueryClient, GcsArtifactStore, QueryExecutor};
use wiremock::matchers::{body_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_gcs_store_save_and_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/storage/v1/b/test-bucket/o"))
        .and(query_param("uploadType", "media"))
        .and(query_param("name", "report.csv"))
        .and(body_string("a,b\n1,2\n"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/test-bucket/o"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"items":[{"name":"report.csv"},{"name":"older.csv"}]}"#,
        ))
        .mount(&server)
        .await;

    let store = GcsArtifactStore::new("test-bucket").with_endpoint(server.uri());

    store
        .save("report.csv", b"a,b\n1,2\n", "text/csv")
        .await
        .unwrap();

    let names = store.list().await.unwrap();
    assert_eq!(names, vec!["report.csv", "older.csv"]);
}

#[tokio::test]
async fn test_gcs_store_load_and_missing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/test-bucket/o/report.csv"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a,b\n1,2\n"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/test-bucket/o/missing.csv"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = GcsArtifactStore::new("test-bucket").with_endpoint(server.uri());

    let data = store.load("report.csv", None).await.unwrap();
    assert_eq!(data, b"a,b\n1,2\n");

    let missing = store.load("missing.csv", None).await;
    assert!(matches!(
        missing,
        Err(nomatch_core::Error::ArtifactNotFound(_))
    ));
}

#[tokio::test]
async fn test_bigquery_client_parses_rows() {
    let server = MockServer::start().await;

    let body = r#"{
        "jobComplete": true,
        "schema": {"fields": [{"name": "Convo_ID"}, {"name": "no_match_count"}]},
        "rows": [
            {"f": [{"v": "abc123"}, {"v": "4"}]},
            {"f": [{"v": "def456"}, {"v": null}]}
        ]
    }"#;

    Mock::given(method("POST"))
        .and(path("/projects/demo-project/queries"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "application/json"),
        )
        .mount(&server)
        .await;

    let client = BigQueryClient::new("us-central1").with_endpoint(server.uri());
    let rows = client
        .execute("demo-project", "SELECT 1")
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("Convo_ID").unwrap(), "abc123");
    assert_eq!(rows[0].get("no_match_count").unwrap(), "4");
    assert_eq!(rows[1].get("no_match_count").unwrap(), "");
}

#[tokio::test]
async fn test_bigquery_client_reports_http_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/projects/demo-project/queries"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = BigQueryClient::new("us-central1").with_endpoint(server.uri());
    let result = client.execute("demo-project", "SELECT 1").await;

    assert!(matches!(result, Err(nomatch_core::Error::Query(_))));
}
