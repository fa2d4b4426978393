mod common;

use std::sync::Arc;
use std::time::Duration;

use common::init_logging;
use harvester_engine::{
    CancellationToken, ClientSettings, FailureKind, QueryExecutor, ReqwestClient, RetryPolicy,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn executor_for(base: &str, settings: ClientSettings, max_attempts: u32) -> QueryExecutor {
    let client = ReqwestClient::new(settings).expect("client");
    QueryExecutor::new(
        Arc::new(client),
        Arc::from("v1"),
        Url::parse(&format!("{base}/v1/autocomplete")).unwrap(),
        RetryPolicy {
            base_pause: Duration::ZERO,
            max_attempts,
        },
        CancellationToken::new(),
    )
}

#[tokio::test]
async fn returns_suggestions_for_prefix() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/autocomplete"))
        .and(query_param("query", "ab"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "version": "v1", "results": ["abc", "abd"] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let executor = executor_for(&server.uri(), ClientSettings::default(), 3);
    let suggestions = executor.execute("ab").await.expect("lookup ok");

    assert_eq!(suggestions, vec!["abc", "abd"]);
    assert_eq!(executor.metric().get(), 1);
}

#[tokio::test]
async fn missing_results_field_means_no_suggestions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/autocomplete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let executor = executor_for(&server.uri(), ClientSettings::default(), 3);
    assert!(executor.execute("zz").await.unwrap().is_empty());
}

#[tokio::test]
async fn persistent_rate_limiting_uses_every_attempt() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/autocomplete"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&server)
        .await;

    let executor = executor_for(&server.uri(), ClientSettings::default(), 3);
    let err = executor.execute("a").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::RetriesExhausted { attempts: 4 });
    assert_eq!(executor.metric().get(), 4);
}

#[tokio::test]
async fn recovers_after_transient_rate_limiting() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/autocomplete"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/autocomplete"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": ["ok"] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let executor = executor_for(&server.uri(), ClientSettings::default(), 3);
    let suggestions = executor.execute("o").await.unwrap();

    assert_eq!(suggestions, vec!["ok"]);
    assert_eq!(executor.metric().get(), 3);
}

#[tokio::test]
async fn other_http_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/autocomplete"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let executor = executor_for(&server.uri(), ClientSettings::default(), 3);
    let err = executor.execute("q").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert_eq!(executor.metric().get(), 1);
}

#[tokio::test]
async fn malformed_body_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/autocomplete"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let executor = executor_for(&server.uri(), ClientSettings::default(), 3);
    let err = executor.execute("m").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedBody);
}

#[tokio::test]
async fn slow_response_times_out_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/autocomplete"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(serde_json::json!({ "results": ["late"] })),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    };
    let executor = executor_for(&server.uri(), settings, 3);
    let err = executor.execute("s").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::Timeout);
    assert_eq!(executor.metric().get(), 1);
}

#[tokio::test]
async fn cancelled_executor_issues_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let executor = QueryExecutor::new(
        Arc::new(ReqwestClient::new(ClientSettings::default()).unwrap()),
        Arc::from("v1"),
        Url::parse(&format!("{}/v1/autocomplete", server.uri())).unwrap(),
        RetryPolicy {
            base_pause: Duration::ZERO,
            max_attempts: 3,
        },
        cancel,
    );

    let err = executor.execute("a").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Cancelled);
    assert_eq!(executor.metric().get(), 0);
}

#[tokio::test]
async fn oversized_body_with_content_length_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/autocomplete"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"results":["a"]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let settings = ClientSettings {
        max_bytes: 10,
        ..ClientSettings::default()
    };
    let executor = executor_for(&server.uri(), settings, 3);
    let err = executor.execute("a").await.unwrap_err();

    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: 17
        }
    );
}

#[tokio::test]
async fn oversized_chunked_body_is_rejected_while_streaming() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await.unwrap();
        let response = "HTTP/1.1 200 OK\r\n\
            Content-Type: application/json\r\n\
            Transfer-Encoding: chunked\r\n\r\n\
            8\r\n{\"result\r\n\
            8\r\ns\": [\"a\"\r\n\
            2\r\n]}\r\n\
            0\r\n\r\n";
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();
    });

    let settings = ClientSettings {
        max_bytes: 10,
        ..ClientSettings::default()
    };
    let executor = executor_for(&format!("http://{addr}"), settings, 3);
    let err = executor.execute("a").await.unwrap_err();

    assert!(matches!(
        err.kind,
        FailureKind::TooLarge { max_bytes: 10, actual } if actual > 10
    ));
    assert_eq!(executor.metric().get(), 1);
}
