//! Portainer client tests against a mock server

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use blaze::app::options::PortainerOptions;
use blaze::errors::CatalogError;
use blaze::http::client::HttpClient;
use blaze::models::stack::StackEnvVar;
use blaze::reconcile::catalog::StackUpdater;

use crate::support::stack;

const TOKEN: &str = "ptr_token";

fn client(server: &MockServer) -> HttpClient {
    HttpClient::new(&PortainerOptions {
        // trailing slash must not produce `//api`
        base_url: format!("{}/", server.uri()),
        api_key: SecretString::from(TOKEN.to_string()),
        insecure: false,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_list_stacks_sends_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stacks"))
        .and(header("x-api-key", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"Id": 1, "Name": "web", "EndpointId": 2, "Env": [{"name": "TZ", "value": "UTC"}]},
            {"Id": 7, "Name": "api", "EndpointId": 3, "Env": null, "Status": 1}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let stacks = client(&server).get_stacks().await.unwrap();
    assert_eq!(stacks.len(), 2);
    assert_eq!((stacks[0].id, stacks[0].endpoint_id), (1, 2));
    assert_eq!(
        stacks[0].env,
        Some(vec![StackEnvVar {
            name: "TZ".to_string(),
            value: "UTC".to_string(),
        }])
    );
    assert_eq!(stacks[1].name, "api");
    assert!(stacks[1].env.is_none());
}

#[tokio::test]
async fn test_empty_stack_list() {
    for body in [json!([]), json!(null)] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stacks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let err = client(&server).get_stacks().await.unwrap_err();
        assert_eq!(err, CatalogError::NoStacksFound, "{body}");
    }
}

#[tokio::test]
async fn test_stack_file_content_is_returned_verbatim() {
    let document = "version: \"3.8\"\nservices:\n  web:\n    image: ghcr.io/acme/web:latest  # pinned\n";
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stacks/7/file"))
        .and(header("x-api-key", TOKEN))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "StackFileContent": document })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let content = client(&server).get_stack_file(7).await.unwrap();
    assert_eq!(content, document);
}

#[tokio::test]
async fn test_missing_stack_file_content() {
    for body in [
        json!({}),
        json!({ "StackFileContent": "" }),
        json!({ "StackFileContent": null }),
        json!(null),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stacks/7/file"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let err = client(&server).get_stack_file(7).await.unwrap_err();
        assert_eq!(err, CatalogError::NoDocumentFound { stack_id: 7 }, "{body}");
    }
}

#[tokio::test]
async fn test_update_stack_request() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/stacks/1"))
        .and(query_param("endpointId", "2"))
        .and(header("x-api-key", TOKEN))
        .and(body_json(json!({
            "stackFileContent": "services: {}\n",
            "env": [{"name": "TZ", "value": "UTC"}],
            "prune": true,
            "pullImage": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let mut web = stack(1, "web");
    web.endpoint_id = 2;
    web.env = Some(vec![StackEnvVar {
        name: "TZ".to_string(),
        value: "UTC".to_string(),
    }]);

    client(&server)
        .redeploy(&web, "services: {}\n")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_error_status_is_upstream_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stacks"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token ptr_token"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/stacks/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("compose up failed: /data/compose/1"))
        .mount(&server)
        .await;

    let client = client(&server);

    let err = client.get_stacks().await.unwrap_err();
    assert_eq!(
        err,
        CatalogError::UpstreamUnavailable("401 Unauthorized".to_string())
    );

    // the upstream body stays in the logs, not in the error
    let err = client.update_stack(&stack(1, "web"), "services: {}\n").await.unwrap_err();
    let reason = match err {
        CatalogError::UpstreamUnavailable(reason) => reason,
        other => panic!("unexpected error {other:?}"),
    };
    assert!(reason.starts_with("500"), "{reason}");
    assert!(!reason.contains("/data/compose"), "{reason}");
}

#[tokio::test]
async fn test_undecodable_body_is_upstream_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stacks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client(&server).get_stacks().await.unwrap_err();
    assert!(matches!(err, CatalogError::UpstreamUnavailable(_)), "{err:?}");
}
