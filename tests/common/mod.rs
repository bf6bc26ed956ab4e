#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web};
use async_trait::async_trait;
use serde_json::{json, Value};
use teamforge::auth::SESSION_COOKIE;
use teamforge::notify::{Notification, Notifier};
use teamforge::repository::InMemoryRepository;
use teamforge::services::ServiceSettings;
use teamforge::{AppError, AppState, Ports};

/// Keeps every notification instead of mailing it.
#[derive(Default)]
pub struct Outbox {
    sent: Mutex<Vec<Notification>>,
}

impl Outbox {
    /// Verification code from the most recent message sent to `receiver`.
    pub fn code_for(&self, receiver: &str) -> String {
        let sent = self.sent.lock().unwrap();
        let message = sent
            .iter()
            .rev()
            .find(|n| n.receiver == receiver)
            .map(|n| n.message.clone())
            .expect("no notification for receiver");
        message
            .rsplit("code=")
            .next()
            .expect("message carries a code")
            .to_string()
    }
}

#[async_trait]
impl Notifier for Outbox {
    async fn send(&self, notification: &Notification) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

pub fn test_state() -> (web::Data<AppState>, Arc<Outbox>) {
    let outbox = Arc::new(Outbox::default());
    let state = AppState::new(
        Ports::shared(Arc::new(InMemoryRepository::new())),
        outbox.clone(),
        ServiceSettings {
            request_timeout: Duration::from_secs(5),
            session_ttl: Duration::from_secs(24 * 3600),
            bcrypt_cost: 4,
            public_base_url: "http://localhost:8080".to_string(),
        },
    );
    (web::Data::new(state), outbox)
}

pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub cookie: Cookie<'static>,
}

pub async fn body_json<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
}

/// Registers, verifies and signs in `name` with email `{name}@example.com`.
pub async fn signed_in_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    outbox: &Outbox,
    name: &str,
) -> TestUser {
    let email = format!("{}@example.com", name.to_lowercase());
    let password = "secret123";

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(&json!({ "name": name, "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status().as_u16(), 201, "registration of {} failed", name);
    let id = body_json(resp).await["id"].as_i64().expect("user id");

    let req = test::TestRequest::get()
        .uri(&format!("/users/verify?code={}", outbox.code_for(&email)))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status().as_u16(), 200, "verification of {} failed", name);

    let req = test::TestRequest::post()
        .uri("/signin")
        .set_json(&json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status().as_u16(), 204, "sign in of {} failed", name);
    let cookie = session_cookie(&resp).expect("session cookie set");

    TestUser { id, email, cookie }
}
