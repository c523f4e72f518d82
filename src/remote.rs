use serde::Serialize;
use serde_json::json;

use crate::config::{FLOW_URL_VAR, LIST_BY_SCHOOL_URL_VAR, PREFILL_URL_VAR, PortalConfig};
use crate::core::consultation::Consultation;
use crate::core::due::as_string;
use crate::core::response::ResponsePayload;
use crate::core::review::ReviewPayload;

/// Everything that can go wrong between the portal and its collaborators.
/// Each failure surfaces as one human-readable line on the active screen.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(&'static str),
    #[error("Please enter both DfE number and login code.")]
    MissingCredentials,
    #[error("Prefill API failed (HTTP {0})")]
    PrefillFailed(reqwest::StatusCode),
    #[error("List-by-school API failed (HTTP {0})")]
    ListFetchFailed(reqwest::StatusCode),
    #[error("HTTP {status}: {body}")]
    SubmitFailed {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{0}")]
    InvalidResponseShape(String),
    #[error("{name} exceeds the 20 MiB attachment limit ({size} bytes)")]
    FileTooLarge { name: String, size: u64 },
    #[error("Failed to read attachment: {0}")]
    FileEncoding(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Envelope POSTed to the flow endpoint; the tag tells the automation which
/// workflow branch to run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionPayload {
    ConsultationResponse(ResponsePayload),
    AnnualReview(ReviewPayload),
}

/// Whatever the flow returned on success. A success response with an
/// unparseable body still acknowledges the submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Acknowledgement {
    pub body: serde_json::Value,
}

impl Acknowledgement {
    fn implicit() -> Self {
        Self {
            body: json!({ "ok": true }),
        }
    }
}

/// HTTP client for the three portal collaborators.
pub struct PortalClient {
    http: reqwest::Client,
    config: PortalConfig,
}

impl PortalClient {
    pub fn new(config: PortalConfig) -> Result<Self, PortalError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, config })
    }

    /// Prefill lookup for token-mode launches. Returns a single-element
    /// list to keep the repository shape uniform with credential mode.
    pub async fn fetch_by_token(
        &self,
        token: &str,
        requested_id: Option<&str>,
    ) -> Result<Vec<Consultation>, PortalError> {
        let base = self
            .config
            .prefill_url
            .as_deref()
            .ok_or(PortalError::MissingConfiguration(PREFILL_URL_VAR))?;

        let mut request = self.http.get(base).query(&[("token", token)]);
        if let Some(id) = requested_id {
            request = request.query(&[("idConsult", id)]);
        }
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(PortalError::PrefillFailed(resp.status()));
        }
        let data: serde_json::Value = resp.json().await.map_err(|e| {
            PortalError::InvalidResponseShape(format!("Failed to parse prefill response: {e}"))
        })?;

        log::info!("Prefill fetch succeeded for token mode");
        Ok(vec![prefill_consultation(&data, requested_id, token)])
    }

    /// List outstanding consultations for a credential pair.
    pub async fn fetch_by_credentials(
        &self,
        dfe: &str,
        code: &str,
    ) -> Result<Vec<Consultation>, PortalError> {
        let dfe = dfe.trim();
        let code = code.trim();
        if dfe.is_empty() || code.is_empty() {
            return Err(PortalError::MissingCredentials);
        }
        let base = self
            .config
            .list_by_school_url
            .as_deref()
            .ok_or(PortalError::MissingConfiguration(LIST_BY_SCHOOL_URL_VAR))?;

        let key = format!("{dfe}/{code}");
        let resp = self.http.get(base).query(&[("key", key)]).send().await?;
        if !resp.status().is_success() {
            return Err(PortalError::ListFetchFailed(resp.status()));
        }
        let body: serde_json::Value = resp.json().await.map_err(|e| {
            PortalError::InvalidResponseShape(format!("Failed to parse login response: {e}"))
        })?;

        match body.as_array() {
            Some(items) => {
                log::info!("Fetched {} outstanding consultations", items.len());
                Ok(map_list(items))
            }
            None => Err(PortalError::InvalidResponseShape(error_envelope_message(
                &body,
            ))),
        }
    }

    /// POST a finalized payload to the flow endpoint.
    pub async fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<Acknowledgement, PortalError> {
        let base = self
            .config
            .flow_url
            .as_deref()
            .ok_or(PortalError::MissingConfiguration(FLOW_URL_VAR))?;

        let resp = self.http.post(base).json(payload).send().await?;
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            let body = if text.is_empty() {
                "No response".to_string()
            } else {
                text
            };
            return Err(PortalError::SubmitFailed { status, body });
        }

        log::info!("Flow submission acknowledged ({status})");
        Ok(match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(body) => Acknowledgement { body },
            Err(_) => Acknowledgement::implicit(),
        })
    }
}

/// Map a prefill response object, deriving the session-local id through the
/// `idConsult → idConsultation → requested id → token` fallback chain.
fn prefill_consultation(
    data: &serde_json::Value,
    requested_id: Option<&str>,
    token: &str,
) -> Consultation {
    let fallback = |name: &str| {
        let v = as_string(data.get(name).unwrap_or(&serde_json::Value::Null));
        if v.is_empty() { None } else { Some(v) }
    };
    let id = fallback("idConsult")
        .or_else(|| fallback("idConsultation"))
        .or_else(|| requested_id.map(str::to_string))
        .unwrap_or_else(|| token.to_string());

    let mut c = Consultation::from_value(data, id);
    if c.id_consult.is_empty() {
        if let Some(requested) = requested_id {
            c.id_consult = requested.to_string();
        }
    }
    c
}

/// Map list elements to consultations with synthesized sequential ids.
fn map_list(items: &[serde_json::Value]) -> Vec<Consultation> {
    items
        .iter()
        .enumerate()
        .map(|(i, v)| Consultation::from_value(v, format!("c{}", i + 1)))
        .collect()
}

/// Best-effort message from a non-array login response.
fn error_envelope_message(body: &serde_json::Value) -> String {
    for key in ["error", "message"] {
        if let Some(text) = body.get(key).and_then(|v| v.as_str()) {
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }
    "Unexpected response from login API.".to_string()
}
