//! Outbound notifications.
//!
//! Registration only builds the [`Notification`]; delivery goes through a [`Notifier`].
//! [`HttpMailer`] posts it to the mail service, [`LogMailer`] writes it to the log for
//! local development.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Payload understood by the mail service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub subject: String,
    pub receiver: String,
    pub message: String,
}

impl Notification {
    /// Builds the email-verification message with a link embedding `code`.
    pub fn verification(receiver: &str, public_base_url: &str, code: &str) -> Self {
        Self {
            subject: "Verification".to_string(),
            receiver: receiver.to_string(),
            message: format!(
                "Your verification link is: {}",
                verification_link(public_base_url, code)
            ),
        }
    }
}

pub fn verification_link(public_base_url: &str, code: &str) -> String {
    format!(
        "{}/users/verify?code={}",
        public_base_url.trim_end_matches('/'),
        code
    )
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), AppError>;
}

pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMailer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(&self, notification: &Notification) -> Result<(), AppError> {
        self.client
            .post(&self.endpoint)
            .json(notification)
            .send()
            .await?
            .error_for_status()?;
        log::info!("{} notification sent", notification.subject);
        Ok(())
    }
}

pub struct LogMailer;

#[async_trait]
impl Notifier for LogMailer {
    async fn send(&self, notification: &Notification) -> Result<(), AppError> {
        log::info!(
            "[mail] to={} subject={} message={}",
            notification.receiver,
            notification.subject,
            notification.message
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{web, App, HttpResponse, HttpServer};
    use pretty_assertions::assert_eq;
    use std::net::TcpListener;
    use std::sync::Mutex;

    type Inbox = web::Data<Mutex<Vec<Notification>>>;

    async fn record(inbox: Inbox, body: web::Json<Notification>) -> HttpResponse {
        inbox.lock().unwrap().push(body.into_inner());
        HttpResponse::Ok().finish()
    }

    async fn reject() -> HttpResponse {
        HttpResponse::InternalServerError().finish()
    }

    #[test]
    fn test_verification_message() {
        let notification =
            Notification::verification("alice@example.com", "http://localhost:8080/", "abc-123");

        assert_eq!(notification.subject, "Verification");
        assert_eq!(notification.receiver, "alice@example.com");
        assert_eq!(
            notification.message,
            "Your verification link is: http://localhost:8080/users/verify?code=abc-123"
        );
    }

    #[actix_rt::test]
    async fn test_http_mailer_delivers_and_reports_failures() {
        let inbox: Inbox = web::Data::new(Mutex::new(Vec::new()));
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        let server_inbox = inbox.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(server_inbox.clone())
                .route("/mail", web::post().to(record))
                .route("/broken", web::post().to(reject))
        })
        .workers(1)
        .listen(listener)
        .expect("Failed to listen")
        .run();
        let handle = server.handle();
        actix_rt::spawn(server);

        let notification =
            Notification::verification("bob@example.com", "http://localhost:8080", "code-1");

        HttpMailer::new(format!("http://127.0.0.1:{}/mail", port))
            .send(&notification)
            .await
            .unwrap();
        assert_eq!(inbox.lock().unwrap().clone(), vec![notification.clone()]);

        let err = HttpMailer::new(format!("http://127.0.0.1:{}/broken", port))
            .send(&notification)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));

        handle.stop(true).await;
    }
}
