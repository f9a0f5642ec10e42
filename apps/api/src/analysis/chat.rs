//! Chat loop: free-text questions about the uploaded résumé.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::analysis::assemble_parts;
use crate::analysis::prompts::{CHAT_CONTINUATION_PROMPT, CHAT_UPLOAD_REQUIRED_MESSAGE};
use crate::document::{pdf_to_image_parts, PageRasterizer};
use crate::errors::AppError;
use crate::llm_client::Generator;
use crate::session::{ChatMessage, Session};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatOutcome {
    pub reply: String,
    /// False when the reply was synthesised locally instead of by the model.
    pub from_model: bool,
}

/// Handles one "Send" press.
///
/// With an upload the history grows by three entries: the user message, the
/// model reply, and the image that was sent. Without one it grows by a single
/// locally written notice and the model is not called. A blank message with
/// an upload is rejected before anything is appended.
pub async fn send_chat(
    session: &mut Session,
    message: &str,
    generator: &dyn Generator,
    rasterizer: Arc<dyn PageRasterizer>,
) -> Result<ChatOutcome, AppError> {
    let Some(document) = session.document.as_ref().map(|d| d.bytes.clone()) else {
        session.push_message(ChatMessage::model(CHAT_UPLOAD_REQUIRED_MESSAGE));
        return Ok(ChatOutcome {
            reply: CHAT_UPLOAD_REQUIRED_MESSAGE.to_string(),
            from_model: false,
        });
    };

    // The one send with an upload that adds nothing to the history.
    if message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    // Rendered before touching the history so a bad PDF leaves it unchanged.
    let images = pdf_to_image_parts(Some(document), rasterizer).await?;

    session.push_message(ChatMessage::user(message));
    let history = session.history_turns();
    let parts = assemble_parts(message, images.first(), CHAT_CONTINUATION_PROMPT);
    let reply = generator.generate(&history, &parts).await?;

    session.push_message(ChatMessage::model(reply.clone()));
    session.push_message(ChatMessage::image(images));

    info!(
        "Session {}: chat turn complete, history length {}",
        session.id,
        session.chat_history().len()
    );

    Ok(ChatOutcome {
        reply,
        from_model: true,
    })
}
