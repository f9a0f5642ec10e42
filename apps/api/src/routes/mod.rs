pub mod health;
pub mod page;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::session::handlers as sessions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(page::index_handler))
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/document",
            post(sessions::handle_upload_document),
        )
        // Analysis buttons
        .route("/api/v1/sessions/:id/analyze", post(analysis::handle_analyze))
        .route(
            "/api/v1/sessions/:id/skill-gap",
            post(analysis::handle_skill_gap),
        )
        .route(
            "/api/v1/sessions/:id/interview-prep",
            post(analysis::handle_interview_prep),
        )
        // Chat
        .route(
            "/api/v1/sessions/:id/chat",
            get(analysis::handle_chat_transcript).post(analysis::handle_chat_send),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::analysis::prompts::{
        ATS_MATCH_PROMPT, CHAT_UPLOAD_REQUIRED_MESSAGE, UPLOAD_REQUIRED_MESSAGE,
    };
    use crate::llm_client::Part;
    use crate::testing::{test_state, StubGenerator, StubRasterizer, TEST_SESSION_TTL};

    const BOUNDARY: &str = "X-RESUME-BOUNDARY";
    const JD: &str = "Senior Backend Engineer, Go, distributed systems";

    struct Harness {
        app: Router,
        generator: Arc<StubGenerator>,
    }

    impl Harness {
        fn new(reply: &str) -> Self {
            let generator = Arc::new(StubGenerator::replying(reply));
            let state = test_state(generator.clone(), Arc::new(StubRasterizer::default()));
            Self {
                app: build_router(state),
                generator,
            }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, body)
        }

        async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.send(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
        }

        async fn create_session(&self) -> String {
            let (status, body) = self
                .send(Request::post("/api/v1/sessions").body(Body::empty()).unwrap())
                .await;
            assert_eq!(status, StatusCode::CREATED);
            body["session_id"].as_str().unwrap().to_string()
        }

        async fn upload(&self, session_id: &str, file_name: &str, bytes: &[u8]) -> (StatusCode, Value) {
            let mut body = Vec::new();
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

            self.send(
                Request::post(format!("/api/v1/sessions/{session_id}/document"))
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
        }
    }

    #[tokio::test]
    async fn test_health() {
        let harness = Harness::new("unused");
        let (status, body) = harness
            .send(Request::get("/health").body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn test_index_page_is_served() {
        let harness = Harness::new("unused");
        let response = harness
            .app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&html).contains("ATS Tracking System"));
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let harness = Harness::new("unused");
        let (status, body) = harness
            .post_json(
                "/api/v1/sessions/00000000-0000-0000-0000-000000000000/analyze",
                json!({"job_description": JD}),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_buttons_without_upload_ask_for_file() {
        let harness = Harness::new("unused");
        let id = harness.create_session().await;

        for path in ["analyze", "skill-gap", "interview-prep"] {
            let (status, body) = harness
                .post_json(
                    &format!("/api/v1/sessions/{id}/{path}"),
                    json!({"job_description": JD}),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["outcome"], "upload_required");
            assert_eq!(body["text"], UPLOAD_REQUIRED_MESSAGE);
        }

        assert_eq!(harness.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_then_analyse_end_to_end() {
        let harness = Harness::new("Percentage match: 64%");
        let id = harness.create_session().await;

        let (status, body) = harness.upload(&id, "resume.pdf", b"%PDF-1.4\n%%EOF").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Resume Uploaded Successfully");
        assert_eq!(body["file_name"], "resume.pdf");

        let (status, body) = harness
            .post_json(
                &format!("/api/v1/sessions/{id}/analyze"),
                json!({"job_description": JD}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "analyze");
        assert_eq!(body["outcome"], "response");
        assert_eq!(body["heading"], "The response is:");
        assert_eq!(body["text"], "Percentage match: 64%");

        let calls = harness.generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].parts.len(), 3);
        assert_eq!(calls[0].parts[0], Part::text(JD));
        assert!(matches!(calls[0].parts[1], Part::Image { .. }));
        assert_eq!(calls[0].parts[2], Part::text(ATS_MATCH_PROMPT));
    }

    #[tokio::test]
    async fn test_non_pdf_upload_rejected() {
        let harness = Harness::new("unused");
        let id = harness.create_session().await;

        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\nContent-Type: text/plain\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
            )
            .as_bytes(),
        );
        let (status, body) = harness
            .send(
                Request::post(format!("/api/v1/sessions/{id}/document"))
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_chat_flow() {
        let harness = Harness::new("Focus on Go concurrency.");
        let id = harness.create_session().await;

        // Before upload: one local notice, no model call.
        let (status, body) = harness
            .post_json(&format!("/api/v1/sessions/{id}/chat"), json!({"message": "Hi"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], CHAT_UPLOAD_REQUIRED_MESSAGE);
        assert_eq!(body["from_model"], false);
        assert_eq!(body["history_length"], 1);

        harness.upload(&id, "resume.pdf", b"%PDF-1.4\n%%EOF").await;

        let (status, body) = harness
            .post_json(
                &format!("/api/v1/sessions/{id}/chat"),
                json!({"message": "What should I study?"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "Focus on Go concurrency.");
        assert_eq!(body["history_length"], 4);
        assert_eq!(
            body["transcript"],
            json!([
                format!("Bot: {CHAT_UPLOAD_REQUIRED_MESSAGE}"),
                "You: What should I study?",
                "Bot: Focus on Go concurrency."
            ])
        );

        let (_, transcript) = harness
            .send(
                Request::get(format!("/api/v1/sessions/{id}/chat"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(transcript["history_length"], 4);
        assert_eq!(harness.generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_session_summary_and_delete() {
        let harness = Harness::new("unused");
        let id = harness.create_session().await;
        harness.upload(&id, "cv.pdf", b"%PDF-1.7 body").await;

        let (status, body) = harness
            .send(
                Request::get(format!("/api/v1/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_document"], true);
        assert_eq!(body["document_name"], "cv.pdf");
        assert_eq!(body["history_length"], 0);

        let (status, _) = harness
            .send(
                Request::delete(format!("/api/v1/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = harness
            .send(
                Request::get(format!("/api/v1/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_oversized_upload_names_the_limit() {
        let harness = Harness::new("unused");
        let id = harness.create_session().await;

        let mut pdf = b"%PDF-1.4\n".to_vec();
        pdf.resize(2 * 1024 * 1024, b'0');
        let (status, body) = harness.upload(&id, "huge.pdf", &pdf).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains(&(1024 * 1024).to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_is_not_found() {
        let harness = Harness::new("unused");
        let id = harness.create_session().await;
        harness.upload(&id, "resume.pdf", b"%PDF-1.4\n%%EOF").await;

        tokio::time::advance(TEST_SESSION_TTL + Duration::from_secs(1)).await;

        let (status, body) = harness
            .post_json(
                &format!("/api/v1/sessions/{id}/analyze"),
                json!({"job_description": JD}),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(harness.generator.call_count(), 0);
    }
}
