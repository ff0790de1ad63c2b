/// HTTP handlers module
/// Provides REST and WebSocket endpoints

pub mod rest;
pub mod websocket;

pub use rest::{
    accept_friend_request, current_user, get_friend_requests, get_friends, get_messages, get_user,
    health, login, logout, register, search_users, send_friend_request, send_message,
};
pub use websocket::{ws_chat, ChatSocket};
