//! Test fixtures and factory functions for creating test data.

use serde_json::json;
use uuid::Uuid;

/// Generate a unique test email to avoid collisions.
pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, &Uuid::new_v4().to_string()[..8])
}

/// Generate a unique quiz title.
pub fn unique_title(prefix: &str) -> String {
    format!("{} {}", prefix, &Uuid::new_v4().to_string()[..8])
}

/// Create a register request body.
pub fn register_request(email: &str, name: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": "hunter2",
        "name": name,
    })
}

/// Create a login request body.
pub fn login_request(email: &str, password: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": password,
    })
}

/// Create a federated sign-in request body.
pub fn federated_request(provider: &str, subject: &str, name: &str) -> serde_json::Value {
    json!({
        "provider": provider,
        "subject": subject,
        "name": name,
    })
}

/// Create a create-quiz request body.
pub fn create_quiz_request(title: &str) -> serde_json::Value {
    json!({ "title": title })
}

/// Create a details update request body.
pub fn details_request(description: &str, is_public: bool) -> serde_json::Value {
    json!({
        "description": description,
        "is_public": is_public,
    })
}
