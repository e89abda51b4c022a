use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use queuedesk_shared::QueueError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Queue(err) => match err {
                QueueError::NotFound(_) => StatusCode::NOT_FOUND,
                QueueError::AlreadyAssigned(_) => StatusCode::CONFLICT,
                QueueError::InvalidType(_) => StatusCode::UNPROCESSABLE_ENTITY,
                QueueError::BadRequest(_) => StatusCode::BAD_REQUEST,
                QueueError::CorruptQueueNumber { .. } | QueueError::StoreFailure(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, code) = match &self {
            // Store internals go to the log, never to the client.
            ServerError::Queue(err @ QueueError::StoreFailure(_)) => {
                tracing::error!(error = %err, "Request failed in the store");
                ("Store failure".to_string(), err.code())
            }
            ServerError::Queue(err) => (err.to_string(), err.code()),
            ServerError::Forbidden(_) => (self.to_string(), "FORBIDDEN"),
        };

        let body = serde_json::json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (QueueError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (QueueError::AlreadyAssigned("A-003".into()), StatusCode::CONFLICT),
            (QueueError::InvalidType("General".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (QueueError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                QueueError::CorruptQueueNumber {
                    prefix: "A-".into(),
                    value: "A-x".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (QueueError::StoreFailure("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ServerError::from(err).into_response().status(), status);
        }
        assert_eq!(
            ServerError::Forbidden("nope".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn store_failure_is_logged_but_not_exposed() {
        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let response = tracing::subscriber::with_default(subscriber, || {
            ServerError::from(QueueError::StoreFailure("disk I/O error".into())).into_response()
        });
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Store failure");
        assert_eq!(body["code"], "STORE_FAILURE");

        let logged = logs.text();
        assert!(logged.contains("ERROR"), "{logged}");
        assert!(logged.contains("disk I/O error"), "{logged}");
    }
}
