use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde_json::json;
use tera::Context;

use crate::web::models::{ChatBody, ChatReply};
use crate::AppState;

pub const GREETING: &str = "Hello! 👋 I’m your AI assistant. How can I help you today?";

// Index page handler
pub async fn index(data: web::Data<AppState>) -> impl Responder {
    let mut context = Context::new();
    context.insert("greeting", GREETING);
    match data.tera.render("index.html", &context) {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(e) => {
            error!("Template error: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Chat endpoint. Upstream status failures come back as `200 {reply}` with the
/// error text embedded; transport and shape failures get a 502 in the same shape.
pub async fn chat(data: web::Data<AppState>, req: web::Json<ChatBody>) -> impl Responder {
    let ChatBody { message, model } = req.into_inner();
    info!(
        "Chat request ({} chars, model: {})",
        message.chars().count(),
        model.as_deref().unwrap_or("default")
    );

    match data.relay.relay(&message, model.as_deref()).await {
        Ok(response) => HttpResponse::Ok().json(ChatReply {
            reply: response.into_reply(),
        }),
        Err(e) => {
            error!("Relay error: {}", e);
            HttpResponse::BadGateway().json(ChatReply {
                reply: e.to_string(),
            })
        }
    }
}
