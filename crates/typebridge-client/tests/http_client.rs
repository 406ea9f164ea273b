use serde_json::json;
use typebridge_client::{query, DynGraphqlClient, HttpClient, QueryError};
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

async fn mock_server(template: ResponseTemplate) -> MockServer {
    let mock_server = MockServer::builder().start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(template)
        .mount(&mock_server)
        .await;

    mock_server
}

fn client(server: &MockServer) -> DynGraphqlClient {
    HttpClient::new(format!("{}/query", server.uri()))
        .with_token("secret")
        .into_dyn()
}

#[tokio::test]
async fn sends_the_query_with_basic_auth() {
    let mock_server = MockServer::builder().start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("authorization", "Basic c2VjcmV0Og=="))
        .and(body_json(json!({"query": "query{container{id}}"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"container": {"id": "ctr-1"}}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let id: String = query()
        .select("container")
        .select("id")
        .execute(&client(&mock_server))
        .await
        .unwrap();

    assert_eq!(id, "ctr-1");
}

#[tokio::test]
async fn exec_errors_keep_their_output() {
    let response = json!({
        "data": null,
        "errors": [{
            "message": "process \"false\" did not complete successfully: exit code: 1",
            "extensions": {"_type": "EXEC_ERROR", "exitCode": 1, "cmd": ["false"], "stdout": "", "stderr": "boom"}
        }]
    });
    let mock_server = mock_server(ResponseTemplate::new(200).set_body_json(response)).await;

    let error = query()
        .select("container")
        .select("sync")
        .execute::<String>(&client(&mock_server))
        .await
        .unwrap_err();

    let exec = error.as_remote_exec().unwrap();
    assert_eq!(exec.exit_code, 1);
    assert_eq!(exec.stderr, "boom");
}

#[tokio::test]
async fn graphql_errors_on_bad_request_are_parsed() {
    let response = json!({"errors": [{"message": "Cannot query field \"nope\" on type \"Query\"."}]});
    let mock_server = mock_server(ResponseTemplate::new(400).set_body_json(response)).await;

    let error = query()
        .select("nope")
        .execute::<String>(&client(&mock_server))
        .await
        .unwrap_err();

    insta::assert_snapshot!(error, @r###"remote API returned errors: Cannot query field "nope" on type "Query"."###);
}

#[tokio::test]
async fn server_errors_are_reported_with_their_status() {
    let mock_server = mock_server(ResponseTemplate::new(502).set_body_string("bad gateway")).await;

    let error = query()
        .select("nope")
        .execute::<String>(&client(&mock_server))
        .await
        .unwrap_err();

    assert!(matches!(error, QueryError::Status { status: 502, .. }));
}
