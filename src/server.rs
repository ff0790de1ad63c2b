/// HTTP server factory and configuration.
/// Provides reusable functions to create and configure the HTTP server
/// for use in both the main binary and tests.

use crate::chat_view::{ChatRuntime, ChatSettings};
use crate::handlers::{
    accept_friend_request, current_user, get_friend_requests, get_friends, get_messages, get_user,
    health, login, logout, register, search_users, send_friend_request, send_message, ws_chat,
};
use crate::scheduler::TokioScheduler;
use crate::store::ChatStore;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;

/// Register every route on an app or test service
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg
        // REST endpoints
        .route("/health", web::get().to(health))
        .route("/auth/login", web::post().to(login))
        .route("/auth/register", web::post().to(register))
        .route("/auth/logout", web::post().to(logout))
        .route("/auth/me", web::get().to(current_user))
        .route("/users/search", web::get().to(search_users))
        .route("/users/{id}", web::get().to(get_user))
        .route("/friends", web::get().to(get_friends))
        .route("/friends/requests", web::get().to(get_friend_requests))
        .route("/friends/requests", web::post().to(send_friend_request))
        .route(
            "/friends/requests/{id}/accept",
            web::post().to(accept_friend_request),
        )
        .route(
            "/conversations/{user_id}/messages",
            web::get().to(get_messages),
        )
        .route(
            "/conversations/{user_id}/messages",
            web::post().to(send_message),
        )
        // WebSocket endpoint
        .route("/ws/chat/{user_id}", web::get().to(ws_chat));
}

/// Create a configured HTTP server
///
/// Takes the shared store, the chat runtime, and a bind address, then returns
/// a fully configured `Server` ready to be awaited.
///
/// # Example
/// ```ignore
/// let store = web::Data::new(ChatStore::new(session, Latency::enabled(), Arc::new(SystemClock)));
/// let runtime = web::Data::new(ChatRuntime::new(Arc::new(TokioScheduler), ChatSettings::default()));
/// let server = server::create_http_server(store, runtime, "127.0.0.1:4000")?;
/// server.await?;
/// ```
pub fn create_http_server(
    store: web::Data<ChatStore>,
    runtime: web::Data<ChatRuntime>,
    bind_addr: &str,
) -> std::io::Result<actix_web::dev::Server> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(runtime.clone())
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}

/// Create a test HTTP server with the demo store and tokio timers
///
/// Binds to a random available port.
///
/// # Returns
/// A tuple of (server, bind_address) where bind_address can be used to make requests
pub fn create_test_http_server() -> std::io::Result<(actix_web::dev::Server, String)> {
    let store = web::Data::new(crate::store::create_test_store());
    let runtime = web::Data::new(ChatRuntime::new(
        Arc::new(TokioScheduler),
        ChatSettings::default(),
    ));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(runtime.clone())
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind("127.0.0.1:0")?;

    // Get the actual bind address (including the assigned port)
    let addr_str = server
        .addrs()
        .first()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "No bind address found"))?
        .to_string();

    Ok((server.run(), addr_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use crate::store::create_test_store_with_clock;
    use crate::store::models::{FriendRequest, Message, User, UserView};
    use actix_web::test;
    use std::time::Duration;

    fn test_runtime(scheduler: Arc<ManualScheduler>) -> web::Data<ChatRuntime> {
        web::Data::new(ChatRuntime::new(scheduler, ChatSettings::default()))
    }

    #[actix_web::test]
    async fn test_create_http_server_invalid_address() {
        let store = web::Data::new(crate::store::create_test_store());
        let runtime = test_runtime(Arc::new(ManualScheduler::new()));

        let result = create_http_server(store, runtime, "invalid_address:99999");
        assert!(result.is_err(), "create_http_server should fail with invalid address");
    }

    #[actix_web::test]
    async fn test_create_test_http_server() {
        let (_server, addr) = create_test_http_server().expect("Server creation should succeed");
        assert!(addr.contains("127.0.0.1:"), "Address should contain 127.0.0.1:");
        let port_part = addr.split(':').nth(1).unwrap_or("");
        assert!(!port_part.is_empty(), "Port should be assigned");
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let scheduler = Arc::new(ManualScheduler::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(crate::store::create_test_store()))
                .app_data(test_runtime(scheduler))
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_login_endpoints() {
        let scheduler = Arc::new(ManualScheduler::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(crate::store::create_test_store()))
                .app_data(test_runtime(scheduler))
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(serde_json::json!({
                "email": "ayse@example.com",
                "password": "anything"
            }))
            .to_request();
        let user: User = test::call_and_read_body_json(&app, req).await;
        assert_eq!(user.username, "ayse");

        let req = test::TestRequest::get().uri("/auth/me").to_request();
        let me: User = test::call_and_read_body_json(&app, req).await;
        assert_eq!(me.id, "3");

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(serde_json::json!({
                "email": "nobody@x.com",
                "password": "x"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_register_endpoint() {
        let scheduler = Arc::new(ManualScheduler::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(crate::store::create_test_store()))
                .app_data(test_runtime(scheduler))
                .configure(routes),
        )
        .await;

        let body = serde_json::json!({
            "username": "zeynep",
            "email": "zeynep@example.com",
            "password": "pw"
        });

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);
    }

    #[actix_web::test]
    async fn test_user_lookup_and_search() {
        let scheduler = Arc::new(ManualScheduler::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(crate::store::create_test_store()))
                .app_data(test_runtime(scheduler))
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/users/search?q=MEH").to_request();
        let results: Vec<UserView> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].is_friend);

        let req = test::TestRequest::get().uri("/users/5").to_request();
        let user: User = test::call_and_read_body_json(&app, req).await;
        assert_eq!(user.username, "ali");

        let req = test::TestRequest::get().uri("/users/nonexistent").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_friend_request_endpoints() {
        let scheduler = Arc::new(ManualScheduler::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(crate::store::create_test_store()))
                .app_data(test_runtime(scheduler))
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/friends/requests").to_request();
        let requests: Vec<FriendRequest> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(requests.len(), 2);

        let req = test::TestRequest::post()
            .uri("/friends/requests/1/accept")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 204);

        let req = test::TestRequest::post()
            .uri("/friends/requests/1/accept")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        let req = test::TestRequest::get().uri("/friends").to_request();
        let friends: Vec<User> = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<&str> = friends.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "4"]);

        let req = test::TestRequest::post()
            .uri("/friends/requests")
            .set_json(serde_json::json!({ "userId": "2" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);

        let req = test::TestRequest::post()
            .uri("/friends/requests")
            .set_json(serde_json::json!({ "userId": "1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_message_endpoints_with_auto_reply() {
        let scheduler = Arc::new(ManualScheduler::new());
        let store = web::Data::new(create_test_store_with_clock(scheduler.clone()));
        let app = test::init_service(
            App::new()
                .app_data(store.clone())
                .app_data(test_runtime(scheduler.clone()))
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/conversations/2/messages")
            .to_request();
        let messages: Vec<Message> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(messages.len(), 4);

        let req = test::TestRequest::post()
            .uri("/conversations/2/messages")
            .set_json(serde_json::json!({ "content": "are you free tonight?" }))
            .to_request();
        let sent: Message = test::call_and_read_body_json(&app, req).await;
        assert_eq!(sent.sender_id, "1");
        assert_eq!(sent.receiver_id, "2");

        scheduler.advance(Duration::from_secs(2)).await;

        let req = test::TestRequest::get()
            .uri("/conversations/2/messages")
            .to_request();
        let messages: Vec<Message> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(messages.len(), 6);
        let reply = messages.last().unwrap();
        assert_eq!(reply.sender_id, "2");
        assert_eq!(reply.receiver_id, "1");
    }

    #[actix_web::test]
    async fn test_logout_endpoint() {
        let scheduler = Arc::new(ManualScheduler::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(crate::store::create_test_store()))
                .app_data(test_runtime(scheduler))
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::post().uri("/auth/logout").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 204);
    }

    #[actix_web::test]
    async fn test_ws_chat_unknown_friend_is_404() {
        let scheduler = Arc::new(ManualScheduler::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(crate::store::create_test_store()))
                .app_data(test_runtime(scheduler))
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/ws/chat/99").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }
}
