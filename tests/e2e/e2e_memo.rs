use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use kakao_memo::{
    AccessToken, Client, MemoSender, RestErrorKind, SendError, SenderConfig, TemplateObject,
    decode_form,
};
use tokio::net::TcpListener;
use tokio::time::sleep;

#[derive(Debug, Clone)]
struct Captured {
    authorization: Option<String>,
    content_type: Option<String>,
    body: Bytes,
}

#[derive(Clone, Default)]
struct AppState {
    captured: Arc<Mutex<Vec<Captured>>>,
}

#[tokio::test]
async fn e2e_memo_reaches_server_with_form_body() {
    let server = TestServer::start().await;
    let sender = sender_for(server.url("/v2/api/talk/memo/default/send"), None);

    let mut out = Vec::new();
    let response = sender
        .send_and_report(&TemplateObject::default(), &mut out)
        .await
        .expect("local server should answer");

    assert_eq!(response.status(), 200);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Status Code: 200\nResponse: {\"result_code\":0}\n"
    );

    let captured = server.captured();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].authorization.as_deref(), Some("Bearer e2e-token"));
    assert_eq!(
        captured[0].content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
        decode_form(&captured[0].body).unwrap(),
        TemplateObject::default()
    );
}

#[tokio::test]
async fn e2e_rejected_token_is_reported() {
    let server = TestServer::start().await;
    let sender = sender_for(server.url("/unauthorized"), None);

    let mut out = Vec::new();
    let response = sender
        .send_and_report(&TemplateObject::default(), &mut out)
        .await
        .expect("401 is a response, not a failure");

    assert_eq!(response.status(), 401);
    assert!(String::from_utf8(out).unwrap().starts_with("Status Code: 401\n"));
}

#[tokio::test]
async fn e2e_connection_refused_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let sender = sender_for(format!("http://{addr}/send"), None);
    let err = sender
        .send(&TemplateObject::default())
        .await
        .expect_err("closed port should fail");
    match err {
        SendError::Transport(err) => assert_eq!(err.kind(), RestErrorKind::Connect),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn e2e_configured_timeout_triggers() {
    let server = TestServer::start().await;
    let sender = sender_for(server.url("/slow"), Some(Duration::from_millis(200)));

    let err = sender
        .send(&TemplateObject::default())
        .await
        .expect_err("timeout should trigger");
    match err {
        SendError::Transport(err) => assert_eq!(err.kind(), RestErrorKind::Timeout),
        other => panic!("unexpected error: {other:?}"),
    }
}

fn sender_for(endpoint: String, timeout: Option<Duration>) -> MemoSender {
    let mut config = SenderConfig::new(AccessToken::new("e2e-token").expect("token"));
    config.endpoint = endpoint;
    config.timeout = timeout;
    MemoSender::new(Client::new(), config)
}

struct TestServer {
    base_url: String,
    state: AppState,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let state = AppState::default();
        let app = Router::new()
            .route("/v2/api/talk/memo/default/send", post(memo_handler))
            .route("/unauthorized", post(unauthorized_handler))
            .route("/slow", post(slow_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{}", addr);

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url,
            state,
            task,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn captured(&self) -> Vec<Captured> {
        self.state.captured.lock().expect("captured lock").clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn header_text(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn memo_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    state.captured.lock().expect("captured lock").push(Captured {
        authorization: header_text(&headers, header::AUTHORIZATION),
        content_type: header_text(&headers, header::CONTENT_TYPE),
        body,
    });
    (StatusCode::OK, r#"{"result_code":0}"#)
}

async fn unauthorized_handler() -> (StatusCode, &'static str) {
    (
        StatusCode::UNAUTHORIZED,
        r#"{"msg":"this access token does not exist","code":-401}"#,
    )
}

async fn slow_handler() -> (StatusCode, &'static str) {
    sleep(Duration::from_millis(2500)).await;
    (StatusCode::OK, "late")
}
