use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use trellis_util::{Client, Error, OperationKind, Procedure, ProcedureInput, http::StatusCode};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

async fn only_request(server: &MockServer) -> wiremock::Request {
    let mut requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    requests.remove(0)
}

#[tokio::test]
async fn test_query_without_query_part_has_no_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/42"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "age": 30 })))
        .mount(&server)
        .await;

    let client = Client::new(server.uri()).unwrap();
    let procedure = Procedure::from_call_path(&["users", "42", "get", "query"]).unwrap();
    let output = client
        .query::<Value, Value, Value>(&procedure, &ProcedureInput::empty())
        .await
        .unwrap();

    assert!(output.is_success());
    assert_eq!(output.data, Some(json!({ "age": 30 })));
    assert_eq!(output.error, None);

    let request = only_request(&server).await;
    assert_eq!(request.url.query(), None);
    assert!(!request.url.as_str().contains('?'));
}

#[tokio::test]
async fn test_mutation_sends_data_as_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "name": "Ada" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .mount(&server)
        .await;

    let client = Client::new(server.uri()).unwrap();
    let procedure = Procedure::from_call_path(&["users", "post", "mutation"]).unwrap();
    let output = client
        .mutate::<Value, _, Value>(&procedure, &ProcedureInput::with_data(json!({ "name": "Ada" })))
        .await
        .unwrap();

    assert_eq!(output.response.status, StatusCode::CREATED);
    assert_eq!(output.data, Some(json!({ "id": 1 })));

    let request = only_request(&server).await;
    assert_eq!(request.url.query(), None);
}

#[tokio::test]
async fn test_get_omits_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pets"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = Client::new(server.uri()).unwrap();
    let input =
        ProcedureInput::with_data(json!({ "ignored": true })).and_query(json!({ "limit": 10 }));
    let output = client
        .query::<Vec<Value>, _, _>(&Procedure::query(["pets"]), &input)
        .await
        .unwrap();
    assert_eq!(output.data, Some(vec![]));

    let request = only_request(&server).await;
    assert!(request.body.is_empty());
}

#[tokio::test]
async fn test_query_arrays_repeat_keys() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = Client::new(server.uri()).unwrap();
    let input = ProcedureInput::with_query(json!({ "tag": ["a", "b"], "cursor": null }));
    client
        .query::<Value, _, _>(&Procedure::query(["pets"]), &input)
        .await
        .unwrap();

    let request = only_request(&server).await;
    assert_eq!(request.url.query(), Some("tag=a&tag=b"));
}

#[tokio::test]
async fn test_base_url_path_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = Client::new(format!("{}/api/v1/", server.uri())).unwrap();
    let output = client
        .query::<Value, Value, Value>(&Procedure::query(["pets"]), &ProcedureInput::empty())
        .await
        .unwrap();
    assert!(output.is_success());
}

#[tokio::test]
async fn test_error_status_returns_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/7"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "not found" })))
        .mount(&server)
        .await;

    let client = Client::new(server.uri()).unwrap();
    let output = client
        .query::<Value, Value, Value>(&Procedure::query(["users", "7"]), &ProcedureInput::empty())
        .await
        .unwrap();

    assert!(!output.is_success());
    assert_eq!(output.response.status, StatusCode::NOT_FOUND);
    assert_eq!(output.data, None);
    assert_eq!(output.error, Some(json!({ "message": "not found" })));
}

#[tokio::test]
async fn test_error_status_with_text_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/users/7"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let client = Client::new(server.uri()).unwrap();
    let procedure = Procedure::from_call_path(&["users", "7", "delete", "mutation"]).unwrap();
    let output = client
        .mutate::<Value, Value, Value>(&procedure, &ProcedureInput::empty())
        .await
        .unwrap();
    assert_eq!(output.error, Some(json!("oops")));
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/users/7"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = Client::new(server.uri()).unwrap();
    let procedure = Procedure::from_call_path(&["users", "7", "delete", "mutation"]).unwrap();
    let output = client
        .mutate::<Option<Value>, Value, Value>(&procedure, &ProcedureInput::empty())
        .await
        .unwrap();
    assert_eq!(output.data, Some(None));
}

#[tokio::test]
async fn test_malformed_success_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let client = Client::new(server.uri()).unwrap();
    let result = client
        .query::<Value, Value, Value>(&Procedure::query(["pets"]), &ProcedureInput::empty())
        .await;
    assert!(matches!(result, Err(Error::Json(_))));
}

#[tokio::test]
async fn test_default_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pets"))
        .and(header("authorization", "Bearer decafbad"))
        .and(header("user-agent", "trellis-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = Client::new(server.uri())
        .unwrap()
        .with_sensitive_header("authorization", "Bearer decafbad")
        .unwrap()
        .with_user_agent("trellis-test")
        .unwrap();
    let output = client
        .query::<Value, Value, Value>(&Procedure::query(["pets"]), &ProcedureInput::empty())
        .await
        .unwrap();
    assert!(output.is_success());
}

#[tokio::test]
async fn test_kind_mismatch_is_rejected() {
    let client = Client::new("http://localhost:1").unwrap();
    let result = client
        .mutate::<Value, Value, Value>(&Procedure::query(["pets"]), &ProcedureInput::empty())
        .await;
    assert!(matches!(
        result,
        Err(Error::KindMismatch {
            expected: OperationKind::Mutation,
            actual: OperationKind::Query,
        })
    ));
}

#[test]
fn test_bad_header_name() {
    let result = Client::new("https://api.example.com")
        .unwrap()
        .with_header("bad header", "value");
    assert!(matches!(result, Err(Error::BadHeaderName(_))));
}
