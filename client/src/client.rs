//! Request builder and response parser for every endpoint of the snack API.

use serde::de::DeserializeOwned;
use shared::{
    Child, CreateChildRequest, CreateChildResponse, ErrorResponse, MessageResponse, SavedSnack,
    SaveSnackRequest, SnackRequest, SnackSuggestion, UpdateChildRequest,
};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Environment variable overriding the API base URL, for deployments where
/// the API is not served from the page origin.
pub const BASE_URL_ENV: &str = "SNACK_API_BASE_URL";

/// Stateless client for the snack API.
///
/// Holds only the base URL. Each operation is a `build_*` method producing
/// an [`HttpRequest`] and a `parse_*` method consuming the corresponding
/// [`HttpResponse`]; the host executes the round-trip in between.
#[derive(Debug, Clone)]
pub struct SnackApiClient {
    base_url: String,
}

impl SnackApiClient {
    /// Client against the given base URL. An empty base URL produces
    /// origin-relative request paths.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client using the `SNACK_API_BASE_URL` override when set, relative
    /// paths otherwise.
    pub fn from_env() -> Self {
        Self::new(&std::env::var(BASE_URL_ENV).unwrap_or_default())
    }

    // --- directory ---

    pub fn build_list_children(&self) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Get, format!("{}/api/children", self.base_url))
    }

    pub fn parse_list_children(&self, response: HttpResponse) -> Result<Vec<Child>, ApiError> {
        check_status(&response, 200)?;
        parse_body(&response.body)
    }

    // --- suggestion flow ---

    pub fn build_request_snack(&self, child_ids: &[i64]) -> Result<HttpRequest, ApiError> {
        let body = encode(&SnackRequest {
            children: child_ids.to_vec(),
        })?;
        Ok(HttpRequest::json(
            HttpMethod::Post,
            format!("{}/get_snack", self.base_url),
            body,
        ))
    }

    /// A 200 response without snack text in it counts as malformed; the
    /// card never renders an empty suggestion.
    pub fn parse_request_snack(&self, response: HttpResponse) -> Result<SnackSuggestion, ApiError> {
        check_status(&response, 200)?;
        let suggestion: SnackSuggestion = parse_body(&response.body)?;
        if suggestion.snack.is_empty() {
            return Err(ApiError::Deserialization(
                "response carried no snack".to_string(),
            ));
        }
        Ok(suggestion)
    }

    pub fn build_save_snack(&self, request: &SaveSnackRequest) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::json(
            HttpMethod::Post,
            format!("{}/save_snack", self.base_url),
            encode(request)?,
        ))
    }

    pub fn parse_save_snack(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, 200)?;
        let message: MessageResponse = parse_body(&response.body)?;
        Ok(message.message)
    }

    // --- saved snacks ---

    pub fn build_list_saved(&self, child_id: i64) -> HttpRequest {
        HttpRequest::bare(
            HttpMethod::Get,
            format!("{}/get_snacks/{child_id}", self.base_url),
        )
    }

    pub fn parse_list_saved(&self, response: HttpResponse) -> Result<Vec<SavedSnack>, ApiError> {
        check_status(&response, 200)?;
        parse_body(&response.body)
    }

    pub fn build_delete_saved(&self, snack_id: i64) -> HttpRequest {
        HttpRequest::bare(
            HttpMethod::Delete,
            format!("{}/delete_snack/{snack_id}", self.base_url),
        )
    }

    pub fn parse_delete_saved(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, 200)?;
        let message: MessageResponse = parse_body(&response.body)?;
        Ok(message.message)
    }

    // --- admin ---

    pub fn build_add_child(&self, request: &CreateChildRequest) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::json(
            HttpMethod::Post,
            format!("{}/api/children", self.base_url),
            encode(request)?,
        ))
    }

    pub fn parse_add_child(&self, response: HttpResponse) -> Result<Child, ApiError> {
        check_status(&response, 201)?;
        let created: CreateChildResponse = parse_body(&response.body)?;
        Ok(created.child)
    }

    pub fn build_update_child(
        &self,
        child_id: i64,
        request: &UpdateChildRequest,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::json(
            HttpMethod::Put,
            format!("{}/api/children/{child_id}", self.base_url),
            encode(request)?,
        ))
    }

    pub fn parse_update_child(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, 200)?;
        let message: MessageResponse = parse_body(&response.body)?;
        Ok(message.message)
    }

    pub fn build_delete_child(&self, child_id: i64) -> HttpRequest {
        HttpRequest::bare(
            HttpMethod::Delete,
            format!("{}/api/children/{child_id}", self.base_url),
        )
    }

    pub fn parse_delete_child(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, 200)?;
        let message: MessageResponse = parse_body(&response.body)?;
        Ok(message.message)
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map a non-success status to an error, pulling the display string out of
/// the server's `{"error": ...}` envelope when one is present.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    let message = serde_json::from_str::<ErrorResponse>(&response.body)
        .map(|envelope| envelope.error)
        .unwrap_or_else(|_| response.body.clone());
    if response.status == 404 {
        return Err(ApiError::NotFound(message));
    }
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}
