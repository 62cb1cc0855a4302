//! EmailJS REST transport

use std::time::Duration;

use folio_services::contact::{EmailRequest, EmailTransport, TransportError};
use folio_services::settings::ContactSettings;
use serde::Serialize;

const SEND_PATH: &str = "/api/v1.0/email/send";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct SendBody<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Serialize)]
struct TemplateParams<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

/// Sends templated mail through the EmailJS HTTP API.
#[derive(Debug, Clone)]
pub struct EmailJsTransport {
    endpoint: String,
    http: reqwest::Client,
}

impl EmailJsTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    pub fn with_client(endpoint: impl Into<String>, http: reqwest::Client) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { endpoint, http }
    }

    pub fn from_settings(settings: &ContactSettings) -> Self {
        Self::new(settings.endpoint.as_str())
    }

    pub fn send_url(&self) -> String {
        format!("{}{SEND_PATH}", self.endpoint)
    }
}

impl EmailTransport for EmailJsTransport {
    async fn send(&self, request: EmailRequest<'_>) -> Result<(), TransportError> {
        let body = SendBody {
            service_id: request.service_id,
            template_id: request.template_id,
            user_id: request.public_key,
            template_params: TemplateParams {
                name: &request.message.name,
                email: &request.message.email,
                message: &request.message.message,
            },
        };

        let response = self
            .http
            .post(self.send_url())
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        tracing::debug!(template = request.template_id, %status, "email accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use folio_services::contact::{AutoReply, ContactError, ContactMessage, ContactRelay};
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn message() -> ContactMessage {
        ContactMessage::new("Ada", "ada@example.com", "Hello there")
    }

    fn settings(endpoint: String) -> ContactSettings {
        ContactSettings {
            endpoint,
            service_id: Some("service_1".into()),
            receiver_template_id: Some("receiver_1".into()),
            auto_reply_template_id: Some("auto_1".into()),
            public_key: Some("pk_1".into()),
        }
    }

    #[tokio::test]
    async fn posts_the_emailjs_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1.0/email/send"))
            .and(body_json(json!({
                "service_id": "service_1",
                "template_id": "receiver_1",
                "user_id": "pk_1",
                "template_params": {
                    "name": "Ada",
                    "email": "ada@example.com",
                    "message": "Hello there"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = EmailJsTransport::new(format!("{}/", server.uri()));
        let msg = message();
        let request = EmailRequest {
            service_id: "service_1",
            template_id: "receiver_1",
            public_key: "pk_1",
            message: &msg,
        };
        transport.send(request).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("The user ID is invalid"))
            .mount(&server)
            .await;

        let transport = EmailJsTransport::new(server.uri());
        let msg = message();
        let err = transport
            .send(EmailRequest {
                service_id: "s",
                template_id: "t",
                public_key: "bad",
                message: &msg,
            })
            .await
            .unwrap_err();
        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "The user ID is invalid");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn relay_tolerates_auto_reply_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "template_id": "receiver_1" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "template_id": "auto_1" })))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let settings = settings(server.uri());
        let relay = ContactRelay::new(settings.clone(), EmailJsTransport::from_settings(&settings));
        let delivery = relay.send_message(&message()).await.unwrap();
        assert!(matches!(delivery.auto_reply, AutoReply::Failed(_)));
    }

    #[tokio::test]
    async fn relay_reports_primary_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(412))
            .expect(1)
            .mount(&server)
            .await;

        let settings = settings(server.uri());
        let relay = ContactRelay::new(settings.clone(), EmailJsTransport::from_settings(&settings));
        let err = relay.send_message(&message()).await.unwrap_err();
        assert!(matches!(err, ContactError::Delivery(TransportError::Status { status: 412, .. })));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        // nothing listens on port 9 of localhost in the test environment
        let transport = EmailJsTransport::new("http://127.0.0.1:9");
        let msg = message();
        let err = transport
            .send(EmailRequest {
                service_id: "s",
                template_id: "t",
                public_key: "k",
                message: &msg,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }
}
