//! REST API Client
//!
//! One method per backend endpoint. Every authorized call funnels through
//! [`ApiClient::execute`], which turns a 401 into a forced logout.

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Animal, Credentials, NewAnimal, NewPlan, NewSessionNote, SessionNote, SignupRequest,
    SignupResponse, Step, StepUpdate, TokenResponse, TrainingPlan, User,
};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

/// Called when an authorized endpoint answers 401
pub type UnauthorizedHook = Rc<dyn Fn()>;

pub struct ApiClient<T: Transport = HttpTransport> {
    transport: T,
    token: Option<String>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            token: None,
            on_unauthorized: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn on_unauthorized(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_unauthorized = Some(Rc::new(hook));
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    // ========================
    // Auth (no bearer, no forced logout)
    // ========================

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<TokenResponse> {
        let body = encode(&Credentials { email, password })?;
        self.fetch(Method::Post, "/auth/login".to_string(), Some(body), false)
            .await
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        organization_name: &str,
    ) -> ApiResult<SignupResponse> {
        let body = encode(&SignupRequest {
            email,
            password,
            organization_name,
        })?;
        self.fetch(Method::Post, "/auth/signup".to_string(), Some(body), false)
            .await
    }

    pub async fn me(&self) -> ApiResult<User> {
        self.fetch(Method::Get, "/auth/me".to_string(), None, true).await
    }

    // ========================
    // Animals
    // ========================

    pub async fn list_animals(&self) -> ApiResult<Vec<Animal>> {
        self.fetch(Method::Get, "/animals/".to_string(), None, true).await
    }

    pub async fn create_animal(&self, animal: &NewAnimal) -> ApiResult<Animal> {
        let body = encode(animal)?;
        self.fetch(Method::Post, "/animals/".to_string(), Some(body), true)
            .await
    }

    pub async fn delete_animal(&self, animal_id: u32) -> ApiResult<()> {
        self.execute(Method::Delete, format!("/animals/{}", animal_id), None, true)
            .await
            .map(|_| ())
    }

    // ========================
    // Plans
    // ========================

    pub async fn list_plans(&self, animal_id: u32) -> ApiResult<Vec<TrainingPlan>> {
        self.fetch(Method::Get, format!("/plans/animal/{}", animal_id), None, true)
            .await
    }

    pub async fn create_plan(&self, animal_id: u32, plan: &NewPlan) -> ApiResult<TrainingPlan> {
        let body = encode(plan)?;
        self.fetch(
            Method::Post,
            format!("/plans/animal/{}", animal_id),
            Some(body),
            true,
        )
        .await
    }

    pub async fn get_plan(&self, plan_id: u32) -> ApiResult<TrainingPlan> {
        self.fetch(Method::Get, format!("/plans/{}", plan_id), None, true)
            .await
    }

    /// Every session note of every step in the plan
    pub async fn plan_notes(&self, plan_id: u32) -> ApiResult<Vec<SessionNote>> {
        self.fetch(Method::Get, format!("/plans/{}/notes", plan_id), None, true)
            .await
    }

    // ========================
    // Steps
    // ========================

    pub async fn update_step(&self, step_id: u32, update: &StepUpdate) -> ApiResult<Step> {
        let body = encode(update)?;
        self.fetch(Method::Put, format!("/steps/{}", step_id), Some(body), true)
            .await
    }

    pub async fn complete_step(&self, step_id: u32) -> ApiResult<()> {
        self.execute(Method::Post, format!("/steps/{}/complete", step_id), None, true)
            .await
            .map(|_| ())
    }

    pub async fn step_notes(&self, step_id: u32) -> ApiResult<Vec<SessionNote>> {
        self.fetch(Method::Get, format!("/steps/{}/notes", step_id), None, true)
            .await
    }

    pub async fn add_step_note(&self, step_id: u32, note: &NewSessionNote) -> ApiResult<SessionNote> {
        let body = encode(note)?;
        self.fetch(Method::Post, format!("/steps/{}/notes", step_id), Some(body), true)
            .await
    }

    // ========================
    // Plumbing
    // ========================

    async fn fetch<R: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        body: Option<Value>,
        authorized: bool,
    ) -> ApiResult<R> {
        let response = self.execute(method, path, body, authorized).await?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn execute(
        &self,
        method: Method,
        path: String,
        body: Option<Value>,
        authorized: bool,
    ) -> ApiResult<ApiResponse> {
        log::debug!("[API] {} {}", method.as_str(), path);
        let request = ApiRequest {
            method,
            path: path.clone(),
            bearer: if authorized { self.token.clone() } else { None },
            body,
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("[API] {} {} failed: {}", method.as_str(), path, e);
                return Err(e);
            }
        };

        if authorized && response.status == 401 {
            log::warn!("[API] {} {} returned 401, ending session", method.as_str(), path);
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
            return Err(ApiError::Unauthorized);
        }
        if !response.is_success() {
            log::warn!("[API] {} {} returned {}", method.as_str(), path, response.status);
            return Err(ApiError::Status(response.status));
        }
        Ok(response)
    }
}

fn encode<B: Serialize>(body: &B) -> ApiResult<Value> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_bearer_only_on_authorized_calls() {
        let mock = MockTransport::new()
            .reply(Method::Post, "/auth/login", 200, r#"{"access_token":"abc","token_type":"bearer"}"#)
            .reply(Method::Get, "/animals/", 200, "[]");
        let client = ApiClient::new(mock.clone()).with_token(Some("abc".into()));

        let token = client.login("a@b.co", "pw").await.unwrap();
        assert_eq!(token.access_token, "abc");
        client.list_animals().await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls[0].bearer, None);
        assert_eq!(calls[0].body, Some(serde_json::json!({"email": "a@b.co", "password": "pw"})));
        assert_eq!(calls[1].bearer.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_401_runs_hook_on_authorized_endpoints() {
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let mock = MockTransport::new()
            .reply(Method::Get, "/animals/", 401, "")
            .reply(Method::Post, "/auth/login", 401, "");
        let client = ApiClient::new(mock)
            .with_token(Some("stale".into()))
            .on_unauthorized(move || counter.set(counter.get() + 1));

        assert_eq!(client.list_animals().await, Err(ApiError::Unauthorized));
        assert_eq!(fired.get(), 1);

        // A rejected login is a plain failure, not a session expiry
        let login = client.login("a@b.co", "wrong").await;
        assert!(matches!(login, Err(ApiError::Status(401))));
        assert_eq!(fired.get(), 1);
    }

    #[tokio::test]
    async fn test_non_success_and_bad_json() {
        let mock = MockTransport::new()
            .reply(Method::Get, "/plans/1", 500, "boom")
            .reply(Method::Get, "/plans/2", 200, "not json");
        let client = ApiClient::new(mock);

        assert_eq!(client.get_plan(1).await, Err(ApiError::Status(500)));
        assert!(matches!(client.get_plan(2).await, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_unscripted_route_is_network_error() {
        let client = ApiClient::new(MockTransport::new());
        assert!(matches!(client.list_animals().await, Err(ApiError::Network(_))));
    }
}
