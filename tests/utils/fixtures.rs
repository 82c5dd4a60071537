//! Payload builders shaped like the records the persistence layer hands out
#![allow(dead_code)]

use serde_json::{json, Value};

/// A chat participant as it appears in `chat.users`
pub fn user(id: &str) -> Value {
    json!({
        "_id": id,
        "name": format!("user {}", id),
        "email": format!("{}@example.com", id)
    })
}

/// A fully populated message record: sender, content and the chat with its
/// participant list.
pub fn chat_message(sender: &str, participants: &[&str], content: &str) -> Value {
    let users: Vec<Value> = participants.iter().copied().map(user).collect();

    json!({
        "_id": format!("msg-from-{}", sender),
        "sender": { "_id": sender, "name": format!("user {}", sender), "pic": "avatar.png" },
        "content": content,
        "chat": {
            "_id": "chat-1",
            "chatName": "sender",
            "isGroupChat": participants.len() > 2,
            "users": users
        },
        "createdAt": "2024-01-01T00:00:00.000Z"
    })
}
