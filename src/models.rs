use serde::{Deserialize, Serialize};
use std::fmt;

pub type Id = i64;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Customer {
    pub id: Id,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Vehicle {
    pub id: Id,
    #[serde(default)]
    pub customer_id: Option<Id>,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub insurance_company: Option<String>,
    #[serde(default)]
    pub insurance_policy_number: Option<String>,
    #[serde(default)]
    pub insurance_class: Option<u8>,
    #[serde(default)]
    pub insurance_expiration_date: Option<String>,
}

impl Vehicle {
    /// "2019 Toyota Corolla", skipping whatever is unknown.
    pub fn title(&self) -> String {
        let year = self.year.map(|year| year.to_string());
        [year.as_deref(), self.make.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Service {
    pub id: Id,
    #[serde(default)]
    pub vehicle_id: Option<Id>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub service_date: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SessionType {
    CheckIn,
    CheckOut,
    Damage,
    BeforeService,
    DuringService,
    AfterService,
}

impl SessionType {
    pub const ALL: [SessionType; 6] = [
        SessionType::CheckIn,
        SessionType::CheckOut,
        SessionType::Damage,
        SessionType::BeforeService,
        SessionType::DuringService,
        SessionType::AfterService,
    ];

    /// Wire tag, also the photo `category` a session collects.
    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::CheckIn => "check-in",
            SessionType::CheckOut => "check-out",
            SessionType::Damage => "damage",
            SessionType::BeforeService => "before-service",
            SessionType::DuringService => "during-service",
            SessionType::AfterService => "after-service",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionType::CheckIn => "Check-in",
            SessionType::CheckOut => "Check-out",
            SessionType::Damage => "Damage",
            SessionType::BeforeService => "Before service",
            SessionType::DuringService => "During service",
            SessionType::AfterService => "After service",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const SESSION_CLOSED: &str = "closed";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhotoSession {
    pub id: Id,
    #[serde(default)]
    pub session_name: String,
    pub session_type: SessionType,
    #[serde(default)]
    pub status: String,
    pub vehicle_id: Id,
    #[serde(default)]
    pub customer_id: Option<Id>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub total_photos: u32,
}

impl PhotoSession {
    pub fn is_closed(&self) -> bool {
        self.status == SESSION_CLOSED
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Photo {
    pub id: Id,
    pub vehicle_id: Id,
    #[serde(default)]
    pub session_id: Option<Id>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub angle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Request bodies for create and update. Blank optional fields go out as
/// `null` so an edit can clear them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CustomerInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VehicleInput {
    pub customer_id: Id,
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub insurance_company: Option<String>,
    #[serde(default)]
    pub insurance_policy_number: Option<String>,
    #[serde(default)]
    pub insurance_class: Option<u8>,
    #[serde(default)]
    pub insurance_expiration_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceInput {
    pub vehicle_id: Id,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub service_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPhotoSession {
    pub session_name: String,
    pub session_type: SessionType,
    pub vehicle_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Id>,
}

/// Everything `POST /api/photos` takes besides the file bytes.
#[derive(Debug, Clone, Default)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub session_id: Id,
    pub vehicle_id: Id,
    pub customer_id: Option<Id>,
    pub category: String,
    pub angle: String,
    pub description: String,
    pub created_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
