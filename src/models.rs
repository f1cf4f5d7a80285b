//! Domain records assembled from the intake form, plus the wire shapes
//! exchanged with the repair service.

use serde::{Deserialize, Serialize};

// ============================================================================
// Intake records
// ============================================================================

/// Client identity, derived from the single full-name field: first token is
/// the first name, the remainder the last name (a lone token is used as both).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub device_type: String,
    pub brand: String,
    pub model: String,
    pub color: String,
    /// IMEI field value, falling back to the serial field when IMEI is empty.
    pub imei_or_serial: String,
    pub condition: String,
    pub accessories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairRecord {
    pub problem_description: String,
    pub repair_type: String,
    pub urgency: String,
    /// Non-numeric input is coerced to 0 at assembly time.
    pub estimated_price: f64,
    pub estimated_duration: String,
    pub notes: String,
}

/// The finalized record of one repair intake. Created only by the submission
/// pipeline once every validation has passed; immutable afterwards except for
/// the diagnostic attached on the error path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub client: ClientRecord,
    pub device: DeviceRecord,
    pub repair: RepairRecord,
    /// Signature as a self-describing data URL (PNG, base64).
    pub signature: String,
    pub ticket_number: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_info: Option<String>,
}

// ============================================================================
// Auto-save snapshot
// ============================================================================

/// Raw, unvalidated form state as the assembler would currently read it.
/// Unlike the records above this keeps the full name and the IMEI/serial
/// fields separate, so a restore is lossless.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub client: SnapshotClient,
    pub device: SnapshotDevice,
    pub repair: SnapshotRepair,
    pub client_number: String,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotClient {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDevice {
    pub device_type: String,
    pub brand: String,
    pub model: String,
    pub color: String,
    pub imei: String,
    pub serial: String,
    pub condition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRepair {
    pub problem: String,
    pub repair_type: String,
    pub urgency: String,
    pub price: String,
    pub duration: String,
    pub accessories: Vec<String>,
    pub notes: String,
}

// ============================================================================
// PC list
// ============================================================================

/// One repair job as returned by the service's `getPCList` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcEntry {
    pub id: i64,
    #[serde(default)]
    pub ticket_number: Option<String>,
    pub client_name: String,
    pub client_phone: String,
    pub device_type: String,
    pub device_brand: String,
    pub device_model: String,
    #[serde(default)]
    pub imei: Option<String>,
    pub problem_description: String,
    pub status: String,
    pub created_at: String,
}

/// Payload for the service's `addPC` action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPcInput {
    pub client_name: String,
    pub client_phone: String,
    pub device_type: String,
    pub device_brand: String,
    pub device_model: String,
    pub imei: Option<String>,
    pub problem_description: String,
}
