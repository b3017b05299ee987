//! HTTP client for the habit stacks API.
//!
//! Configuration is via environment variables:
//! - `HABIT_STACKS_URL` - Base URL (default: `http://127.0.0.1:8001/api`)

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::*;

/// Default URL for a local server.
pub const DEFAULT_URL: &str = "http://127.0.0.1:8001/api";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// HTTP client for the habit stacks API.
#[derive(Debug, Clone)]
pub struct HabitStacksClient {
    base_url: String,
    client: Client,
}

impl HabitStacksClient {
    /// Create client from environment variables.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("HABIT_STACKS_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        Self::new(base_url)
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
    }

    /// Handle response, converting HTTP errors to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
                    Err(ClientError::Validation(body))
                }
                StatusCode::CONFLICT => Err(ClientError::Conflict(body)),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }

    // ============================================================
    // Routines
    // ============================================================

    pub async fn list_routines(&self) -> Result<Vec<Routine>, ClientError> {
        let response = self
            .request(Method::GET, "/predefined-routines")
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Create a new stack seeded with a routine's habits, followed by
    /// `extra_habits`, in a single request.
    ///
    /// Habits are copied by name and order; the new stack's habits get
    /// their own ids.
    pub async fn create_from_routine(
        &self,
        routine_id: &str,
        name: Option<String>,
        extra_habits: Vec<String>,
    ) -> Result<HabitStack, ClientError> {
        let routines = self.list_routines().await?;
        let routine = routines
            .iter()
            .find(|r| r.id == routine_id)
            .ok_or_else(|| ClientError::NotFound(format!("Routine not found: {}", routine_id)))?;

        let input = CreateStackInput::from_routine(routine, name).append_habits(extra_habits);
        self.create_stack(&input).await
    }

    // ============================================================
    // Habit Stacks
    // ============================================================

    pub async fn list_stacks(&self) -> Result<Vec<HabitStack>, ClientError> {
        let response = self.request(Method::GET, "/habit-stacks").send().await?;
        self.handle_response(response).await
    }

    pub async fn create_stack(&self, input: &CreateStackInput) -> Result<HabitStack, ClientError> {
        let response = self
            .request(Method::POST, "/habit-stacks")
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn get_stack(&self, id: &str) -> Result<HabitStack, ClientError> {
        let response = self
            .request(Method::GET, &format!("/habit-stacks/{}", id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn update_stack(
        &self,
        id: &str,
        input: &UpdateStackInput,
    ) -> Result<HabitStack, ClientError> {
        let response = self
            .request(Method::PUT, &format!("/habit-stacks/{}", id))
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn delete_stack(&self, id: &str) -> Result<MessageResponse, ClientError> {
        let response = self
            .request(Method::DELETE, &format!("/habit-stacks/{}", id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Habits
    // ============================================================

    pub async fn add_habit(
        &self,
        stack_id: &str,
        input: &AddHabitInput,
    ) -> Result<HabitStack, ClientError> {
        let response = self
            .request(Method::POST, &format!("/habit-stacks/{}/habits", stack_id))
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn update_habit(
        &self,
        stack_id: &str,
        habit_id: &str,
        input: &UpdateHabitInput,
    ) -> Result<HabitStack, ClientError> {
        let response = self
            .request(
                Method::PUT,
                &format!("/habit-stacks/{}/habits/{}", stack_id, habit_id),
            )
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn remove_habit(
        &self,
        stack_id: &str,
        habit_id: &str,
    ) -> Result<MessageResponse, ClientError> {
        let response = self
            .request(
                Method::DELETE,
                &format!("/habit-stacks/{}/habits/{}", stack_id, habit_id),
            )
            .send()
            .await?;
        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let client = HabitStacksClient::new("http://localhost:8001/api/");
        assert_eq!(client.base_url, "http://localhost:8001/api");
    }
}
