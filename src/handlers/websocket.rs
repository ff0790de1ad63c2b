/// WebSocket handler for the live chat view.
/// Streams conversation snapshots, sent messages, replies, and typing state
/// to the client, and accepts messages to send.

use crate::chat_view::{ChatEvent, ChatRuntime, ChatView};
use crate::handlers::rest::error_response;
use crate::store::ChatStore;
use actix::prelude::*;
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;

/// Frames a client may send
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    Send { content: String },
}

/// WebSocket actor for one open chat view
pub struct ChatSocket {
    pub view: Arc<Mutex<ChatView>>,
    pub friend_id: String,
    events: Option<UnboundedReceiver<ChatEvent>>,
}

impl ChatSocket {
    pub fn new(view: ChatView, events: UnboundedReceiver<ChatEvent>) -> Self {
        let friend_id = view.friend().id.clone();
        ChatSocket {
            view: Arc::new(Mutex::new(view)),
            friend_id,
            events: Some(events),
        }
    }
}

impl Actor for ChatSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        log::info!("Chat socket opened with {}", self.friend_id);

        if let Some(mut rx) = self.events.take() {
            let addr = ctx.address();
            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    match serde_json::to_string(&event) {
                        Ok(text) => addr.do_send(OutgoingFrame(text)),
                        Err(e) => log::error!("Failed to encode chat event: {}", e),
                    }
                }
            });
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        log::info!("Chat socket closed with {}", self.friend_id);
        let view = self.view.clone();
        actix::spawn(async move {
            view.lock().await.close();
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChatSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<ClientFrame>(&text) {
                Ok(ClientFrame::Send { content }) => {
                    let view = self.view.clone();
                    actix::spawn(async move {
                        if let Err(e) = view.lock().await.send(&content).await {
                            log::warn!("Failed to send chat message: {}", e);
                        }
                    });
                }
                Err(e) => {
                    log::error!("Failed to parse WebSocket message: {}", e);
                    ctx.text(
                        json!({
                            "error": "Invalid message format"
                        })
                        .to_string(),
                    );
                }
            },
            Ok(ws::Message::Ping(bytes)) => ctx.pong(&bytes),
            Ok(ws::Message::Close(_)) => {
                ctx.stop();
            }
            Err(e) => {
                log::error!("WebSocket error: {}", e);
                ctx.stop();
            }
            _ => {}
        }
    }
}

#[derive(Message)]
#[rtype(result = "()")]
struct OutgoingFrame(String);

impl Handler<OutgoingFrame> for ChatSocket {
    type Result = ();

    fn handle(&mut self, msg: OutgoingFrame, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

/// GET /ws/chat/{user_id}
///
/// Opens the chat view before the upgrade so an unknown friend is a plain 404.
pub async fn ws_chat(
    req: HttpRequest,
    stream: web::Payload,
    user_id: web::Path<String>,
    store: web::Data<ChatStore>,
    runtime: web::Data<ChatRuntime>,
) -> actix_web::Result<HttpResponse> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    let view = match ChatView::open(
        store.into_inner(),
        runtime.get_ref().clone(),
        &user_id,
        tx,
    )
    .await
    {
        Ok(view) => view,
        Err(e) => return Ok(error_response(&e)),
    };

    ws::start(ChatSocket::new(view, rx), &req, stream)
}
