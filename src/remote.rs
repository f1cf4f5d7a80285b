//! HTTP client for the repair service.
//!
//! The service is an opaque JSON endpoint addressed by `action` query
//! parameter. Every call resolves to `{ success, data?, message?/error? }`;
//! a `success: false` payload is an error to callers just like a non-2xx
//! status or an unparsable body, each under its own error kind so the
//! submission pipeline can report them faithfully.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{ClientRecord, DeviceRecord, NewPcInput, PcEntry, RepairRecord};

/// Convert a transport-level error into `AppError::Network`.
fn network_err(e: impl std::fmt::Display) -> AppError {
    AppError::Network(e.to_string())
}

// ============================================================================
// Wire types
// ============================================================================

/// Body of `POST save_repair`.
#[derive(Debug, Clone, Serialize)]
pub struct TicketPayload {
    pub client: ClientRecord,
    pub device: DeviceRecord,
    pub repair: RepairRecord,
    /// Signature as a PNG data URL.
    pub signature: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveRepairData {
    ticket_number: String,
}

/// Flat repair record as returned by `get_repair`; absent columns come back
/// as empty strings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RepairLookup {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_phone: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub client_address: String,
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub device_brand: String,
    #[serde(default)]
    pub device_model: String,
    #[serde(default)]
    pub device_imei: String,
    #[serde(default)]
    pub device_color: String,
    #[serde(default)]
    pub repair_problem: String,
    #[serde(default)]
    pub repair_type: String,
    #[serde(default)]
    pub repair_price: String,
    #[serde(default)]
    pub repair_duration: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionInfo {
    pub message: Option<String>,
    pub server_info: Option<String>,
}

/// Common response envelope for every service action.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    #[serde(default = "none")]
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, rename = "serverInfo")]
    server_info: Option<String>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> ApiEnvelope<T> {
    fn failure_message(&self, fallback: &str) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

// ============================================================================
// RemoteService seam
// ============================================================================

/// The service surface the rest of the app depends on. Production uses
/// `RemoteClient`; tests substitute their own implementation.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Save a finished intake. Returns the service-assigned ticket number.
    async fn save_repair(&self, payload: &TicketPayload) -> Result<String, AppError>;

    /// Look up an existing ticket by number.
    async fn get_repair(&self, ticket_number: &str) -> Result<RepairLookup, AppError>;

    async fn get_pc_list(&self) -> Result<Vec<PcEntry>, AppError>;

    async fn add_pc(&self, input: &NewPcInput) -> Result<(), AppError>;

    async fn test_connection(&self) -> Result<ConnectionInfo, AppError>;
}

// ============================================================================
// RemoteClient
// ============================================================================

/// HTTP client wrapping all repair-service actions.
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    /// Create a client for the given endpoint base URL. The underlying
    /// `reqwest::Client` carries the host-imposed request timeout.
    pub fn new(base_url: String, timeout: std::time::Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");

        Self { http, base_url }
    }

    fn action_url(&self, action: &str) -> String {
        format!("{}?action={}", self.base_url, action)
    }

    /// Send a request and interpret status, body, and envelope. Non-2xx
    /// carries the status code and raw body; an unparsable body is a
    /// `MalformedResponse`.
    async fn send<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<ApiEnvelope<T>, AppError> {
        let resp = req.send().await.map_err(network_err)?;
        let status = resp.status();
        let body = resp.text().await.map_err(network_err)?;

        if !status.is_success() {
            return Err(AppError::Service(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        serde_json::from_str(&body).map_err(|e| AppError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl RemoteService for RemoteClient {
    async fn save_repair(&self, payload: &TicketPayload) -> Result<String, AppError> {
        let req = self.http.post(self.action_url("save_repair")).json(payload);
        let env: ApiEnvelope<SaveRepairData> = self.send(req).await?;
        if !env.success {
            return Err(AppError::Service(env.failure_message("Save failed")));
        }
        env.data
            .map(|d| d.ticket_number)
            .ok_or_else(|| AppError::MalformedResponse("save_repair: missing ticketNumber".into()))
    }

    async fn get_repair(&self, ticket_number: &str) -> Result<RepairLookup, AppError> {
        let req = self
            .http
            .get(self.action_url("get_repair"))
            .query(&[("ticketNumber", ticket_number)]);
        let env: ApiEnvelope<RepairLookup> = self.send(req).await?;
        if !env.success {
            return Err(AppError::Service(env.failure_message("Ticket not found")));
        }
        env.data
            .ok_or_else(|| AppError::MalformedResponse("get_repair: missing data".into()))
    }

    async fn get_pc_list(&self) -> Result<Vec<PcEntry>, AppError> {
        let req = self.http.get(self.action_url("getPCList"));
        let env: ApiEnvelope<Vec<PcEntry>> = self.send(req).await?;
        if !env.success {
            return Err(AppError::Service(env.failure_message("PC list unavailable")));
        }
        Ok(env.data.unwrap_or_default())
    }

    async fn add_pc(&self, input: &NewPcInput) -> Result<(), AppError> {
        let req = self.http.post(self.action_url("addPC")).json(input);
        let env: ApiEnvelope<serde_json::Value> = self.send(req).await?;
        if !env.success {
            return Err(AppError::Service(env.failure_message("Add PC failed")));
        }
        Ok(())
    }

    async fn test_connection(&self) -> Result<ConnectionInfo, AppError> {
        let req = self.http.get(self.action_url("test_connection"));
        let env: ApiEnvelope<serde_json::Value> = self.send(req).await?;
        if !env.success {
            return Err(AppError::Service(env.failure_message("Connection test failed")));
        }
        Ok(ConnectionInfo {
            message: env.message,
            server_info: env.server_info,
        })
    }
}
