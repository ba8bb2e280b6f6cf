use crate::models::{CustomerInput, Id, NewPhotoSession, ServiceInput, SessionType, VehicleInput};
use serde::Deserialize;

/// Browser forms post every field as a string, blank when left empty.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CustomerForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl CustomerForm {
    pub fn into_input(self) -> Result<CustomerInput, String> {
        Ok(CustomerInput {
            first_name: required("First name", self.first_name)?,
            last_name: required("Last name", self.last_name)?,
            email: optional(self.email),
            phone: optional(self.phone),
            address: optional(self.address),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct VehicleForm {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub license_plate: String,
    #[serde(default)]
    pub vin: String,
    #[serde(default)]
    pub insurance_company: String,
    #[serde(default)]
    pub insurance_policy_number: String,
    #[serde(default)]
    pub insurance_class: String,
    #[serde(default)]
    pub insurance_expiration_date: String,
}

impl VehicleForm {
    pub fn into_input(self) -> Result<VehicleInput, String> {
        let insurance_class = match optional(self.insurance_class) {
            Some(raw) => match raw.parse::<u8>() {
                Ok(class @ 1..=4) => Some(class),
                _ => return Err("Insurance class must be between 1 and 4".to_string()),
            },
            None => None,
        };
        let year = match optional(self.year) {
            Some(raw) => Some(
                raw.parse::<i32>()
                    .map_err(|_| format!("Year must be a number, got {raw:?}"))?,
            ),
            None => None,
        };

        Ok(VehicleInput {
            customer_id: parse_id("Owner", &self.customer_id)?,
            make: required("Make", self.make)?,
            model: required("Model", self.model)?,
            year,
            license_plate: optional(self.license_plate),
            vin: optional(self.vin),
            insurance_company: optional(self.insurance_company),
            insurance_policy_number: optional(self.insurance_policy_number),
            insurance_class,
            insurance_expiration_date: optional(self.insurance_expiration_date),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServiceForm {
    #[serde(default)]
    pub vehicle_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub service_date: String,
}

impl ServiceForm {
    pub fn into_input(self) -> Result<ServiceInput, String> {
        let raw_price = self.price.trim().trim_start_matches('$').replace(',', "");
        let price = raw_price
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite() && *price >= 0.0)
            .ok_or_else(|| "Price must be a positive amount".to_string())?;

        Ok(ServiceInput {
            vehicle_id: parse_id("Vehicle", &self.vehicle_id)?,
            description: required("Description", self.description)?,
            price,
            status: optional(self.status),
            service_date: optional(self.service_date),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SessionForm {
    #[serde(default)]
    pub session_name: String,
    #[serde(default)]
    pub session_type: String,
    #[serde(default)]
    pub vehicle_id: String,
}

impl SessionForm {
    pub fn into_new_session(self, customer_id: Option<Id>) -> Result<NewPhotoSession, String> {
        let session_type = SessionType::parse(self.session_type.trim())
            .ok_or_else(|| format!("Unknown session type {:?}", self.session_type))?;
        Ok(NewPhotoSession {
            session_name: required("Session name", self.session_name)?,
            session_type,
            vehicle_id: parse_id("Vehicle", &self.vehicle_id)?,
            customer_id,
        })
    }

    pub fn vehicle_id(&self) -> Option<Id> {
        self.vehicle_id.trim().parse().ok()
    }
}

fn required(label: &str, value: String) -> Result<String, String> {
    optional(value).ok_or_else(|| format!("{label} is required"))
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_id(label: &str, value: &str) -> Result<Id, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{label} is required"));
    }
    value
        .parse()
        .map_err(|_| format!("{label} is not a valid id"))
}
