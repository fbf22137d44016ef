//! EU VIES REST API client implementing [`VatChecker`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::checker::{CheckVatRequest, VatChecker, VatNumberCheckResult};
use crate::core::CheckerError;

const VIES_URL: &str = "https://ec.europa.eu/taxation_customs/vies/rest-api/check-vat-number";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// VIES API request body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViesRequest<'a> {
    country_code: &'a str,
    vat_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    requester_member_state_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    requester_number: Option<&'a str>,
}

/// VIES API response structure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViesApiResponse {
    valid: Option<bool>,
    country_code: Option<String>,
    vat_number: Option<String>,
    request_identifier: Option<String>,
    user_error: Option<String>,
    // Error fields
    error_wrappers: Option<Vec<ViesErrorWrapper>>,
}

#[derive(Debug, Deserialize)]
struct ViesErrorWrapper {
    error: Option<String>,
    message: Option<String>,
}

/// Blocking VIES client.
///
/// The VIES API has no authentication; it is a free public service.
#[derive(Debug, Clone)]
pub struct ViesClient {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl ViesClient {
    /// Client with a 30 second timeout against the public endpoint.
    pub fn new() -> Result<Self, CheckerError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, CheckerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CheckerError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: VIES_URL.to_string(),
        })
    }

    /// Point the client at another endpoint (e.g. a local mock).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl VatChecker for ViesClient {
    fn check_vat(&self, request: &CheckVatRequest) -> Result<VatNumberCheckResult, CheckerError> {
        let body = ViesRequest {
            country_code: &request.country_code,
            vat_number: &request.vat_number,
            requester_member_state_code: request.requester_country_code.as_deref(),
            requester_number: request.requester_vat_number.as_deref(),
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| CheckerError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| CheckerError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(CheckerError::Service(format!("HTTP {status}: {text}")));
        }

        interpret_response(request, &text)
    }
}

fn interpret_response(
    request: &CheckVatRequest,
    body: &str,
) -> Result<VatNumberCheckResult, CheckerError> {
    let api_resp: ViesApiResponse = serde_json::from_str(body)
        .map_err(|e| CheckerError::Transport(format!("unreadable VIES response: {e}")))?;

    // Check for API-level errors
    if let Some(err) = api_resp.error_wrappers.as_ref().and_then(|w| w.first()) {
        let msg = err
            .message
            .clone()
            .or_else(|| err.error.clone())
            .unwrap_or_else(|| "unknown error".into());
        return Err(CheckerError::Service(msg));
    }

    let valid = match api_resp.valid {
        Some(valid) => valid,
        None => {
            return Err(CheckerError::Service(
                api_resp
                    .user_error
                    .unwrap_or_else(|| "response without validity flag".into()),
            ));
        }
    };

    Ok(VatNumberCheckResult {
        valid,
        country_code: api_resp
            .country_code
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| request.country_code.clone()),
        vat_number: api_resp
            .vat_number
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| request.vat_number.clone()),
        request_identifier: api_resp.request_identifier.filter(|id| !id.is_empty()),
    })
}
