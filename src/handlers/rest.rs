/// REST API handlers for HTTP endpoints.
/// Handles authentication, directory search, friendships, and conversations.

use crate::chat_view::{schedule_auto_reply, ChatRuntime};
use crate::error::StoreError;
use crate::store::models::*;
use crate::store::ChatStore;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;

/// Map a store failure to a JSON error response
pub fn error_response(err: &StoreError) -> HttpResponse {
    let status = match err {
        StoreError::NotAuthenticated | StoreError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        StoreError::UserExists | StoreError::AlreadyFriends | StoreError::RequestAlreadySent => {
            StatusCode::CONFLICT
        }
        StoreError::UserNotFound(_) | StoreError::RequestNotFound => StatusCode::NOT_FOUND,
        StoreError::CannotBefriendSelf => StatusCode::BAD_REQUEST,
        StoreError::Session(_) | StoreError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if err.is_client_error() {
        log::warn!("Request rejected: {}", err);
        HttpResponse::build(status).json(json!({ "error": err.to_string() }))
    } else {
        log::error!("Store failure: {}", err);
        HttpResponse::build(status).json(json!({ "error": "Internal server error" }))
    }
}

/// POST /auth/login
pub async fn login(
    store: web::Data<ChatStore>,
    req: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    match store.login(&req.email, &req.password).await {
        Ok(user) => Ok(HttpResponse::Ok().json(user)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// POST /auth/register
pub async fn register(
    store: web::Data<ChatStore>,
    req: web::Json<RegisterRequest>,
) -> ActixResult<HttpResponse> {
    match store.register(&req.username, &req.email, &req.password).await {
        Ok(user) => Ok(HttpResponse::Created().json(user)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// POST /auth/logout
pub async fn logout(store: web::Data<ChatStore>) -> ActixResult<HttpResponse> {
    match store.logout().await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(error_response(&e)),
    }
}

/// GET /auth/me
pub async fn current_user(store: web::Data<ChatStore>) -> ActixResult<HttpResponse> {
    match store.current_user().await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(user)),
        Ok(None) => Ok(error_response(&StoreError::NotAuthenticated)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// GET /users/search?q=
pub async fn search_users(
    store: web::Data<ChatStore>,
    query: web::Query<SearchQuery>,
) -> ActixResult<HttpResponse> {
    match store.search_users(&query.q).await {
        Ok(users) => Ok(HttpResponse::Ok().json(users)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// GET /users/{id}
pub async fn get_user(
    store: web::Data<ChatStore>,
    user_id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match store.get_user_by_id(&user_id).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(user)),
        Ok(None) => Ok(error_response(&StoreError::UserNotFound(user_id.into_inner()))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// GET /friends
pub async fn get_friends(store: web::Data<ChatStore>) -> ActixResult<HttpResponse> {
    match store.get_friends().await {
        Ok(friends) => Ok(HttpResponse::Ok().json(friends)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// GET /friends/requests
pub async fn get_friend_requests(store: web::Data<ChatStore>) -> ActixResult<HttpResponse> {
    match store.get_friend_requests().await {
        Ok(requests) => Ok(HttpResponse::Ok().json(requests)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// POST /friends/requests
pub async fn send_friend_request(
    store: web::Data<ChatStore>,
    req: web::Json<SendFriendRequestBody>,
) -> ActixResult<HttpResponse> {
    match store.send_friend_request(&req.user_id).await {
        Ok(request) => Ok(HttpResponse::Created().json(request)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// POST /friends/requests/{id}/accept
pub async fn accept_friend_request(
    store: web::Data<ChatStore>,
    request_id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match store.accept_friend_request(&request_id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(error_response(&e)),
    }
}

/// GET /conversations/{user_id}/messages
pub async fn get_messages(
    store: web::Data<ChatStore>,
    user_id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match store.get_messages(&user_id).await {
        Ok(messages) => Ok(HttpResponse::Ok().json(messages)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// POST /conversations/{user_id}/messages
///
/// Also schedules the simulated reply when auto-reply is on.
pub async fn send_message(
    store: web::Data<ChatStore>,
    runtime: web::Data<ChatRuntime>,
    user_id: web::Path<String>,
    req: web::Json<SendMessageBody>,
) -> ActixResult<HttpResponse> {
    match store.send_message(&user_id, &req.content).await {
        Ok(message) => {
            if runtime.settings.auto_reply {
                schedule_auto_reply(
                    store.clone().into_inner(),
                    runtime.scheduler.as_ref(),
                    &message.receiver_id,
                    &message.sender_id,
                    runtime.settings.reply_delay,
                    None,
                );
            }
            Ok(HttpResponse::Created().json(message))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

/// Health check endpoint
/// GET /health
pub async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok"
    })))
}
