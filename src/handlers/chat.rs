use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::{ChatRequest, ChatResponse, HistoryEntry};
use crate::services::{image, keywords, prompt, search};
use crate::state::AppState;

pub async fn send_message(
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let chat_req = read_chat_form(payload).await?;
    let response = answer(&state, chat_req).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn answer(state: &AppState, chat_req: ChatRequest) -> Result<ChatResponse, AppError> {
    let keywords = keywords::extract_keywords(&chat_req.message);
    let materials = if keywords.is_empty() {
        Vec::new()
    } else {
        search::find_materials(state.search.as_ref(), &keywords).await
    };
    info!(
        %keywords,
        materials = materials.len(),
        history = chat_req.conversation_history.len(),
        has_image = chat_req.image.is_some(),
        "handling chat message"
    );

    let prompt = prompt::build_prompt(&chat_req.message, &materials, &chat_req.conversation_history);

    let prepared = match chat_req.image {
        Some(bytes) => Some(
            web::block(move || image::prepare_image(&bytes))
                .await
                .map_err(|e| AppError::Internal(format!("Image processing was interrupted: {}", e)))??,
        ),
        None => None,
    };

    let response = state.llm.generate(&prompt, prepared.as_ref()).await?;
    Ok(ChatResponse::new(response, materials))
}

/// Malformed history is treated as no history.
pub fn parse_history(raw: &str) -> Vec<HistoryEntry> {
    match serde_json::from_str::<Vec<HistoryEntry>>(raw) {
        Ok(history) => history,
        Err(err) => {
            warn!(error = %err, "ignoring malformed conversation_history");
            Vec::new()
        }
    }
}

async fn read_field(field: &mut Field) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read form field: {}", e)))?
    {
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn read_chat_form(mut payload: Multipart) -> Result<ChatRequest, AppError> {
    let mut message: Option<String> = None;
    let mut history_raw = String::from("[]");
    let mut image: Option<Vec<u8>> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart form: {}", e)))?
    {
        let name = field.name().to_string();
        let data = read_field(&mut field).await?;

        if name == "message" {
            message = Some(String::from_utf8_lossy(&data).into_owned());
        } else if name == "conversation_history" {
            history_raw = String::from_utf8_lossy(&data).into_owned();
        } else if name == "image" {
            if !data.is_empty() {
                image = Some(data);
            }
        }
    }

    let message = message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::Unprocessable("Field 'message' is required".to_string()))?;

    Ok(ChatRequest {
        message,
        conversation_history: parse_history(&history_raw),
        image,
    })
}
