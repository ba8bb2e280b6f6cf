use crate::models::{Customer, Id, Photo, PhotoSession, SessionType, Vehicle};
use crate::progress::matched_photos;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const UNKNOWN_CUSTOMER: &str = "Unknown";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionReport {
    pub session: SessionSummary,
    pub vehicle: VehicleSummary,
    pub customer: CustomerSummary,
    pub photos: Vec<ReportPhoto>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionSummary {
    pub id: Id,
    pub name: String,
    pub session_type: SessionType,
    pub status: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub total_photos: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct VehicleSummary {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub license_plate: Option<String>,
    pub vin: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CustomerSummary {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportPhoto {
    pub id: Id,
    pub angle: Option<String>,
    pub description: Option<String>,
    pub timestamp: Option<String>,
    pub category: String,
}

pub fn build_report(
    session: &PhotoSession,
    photos: &[Photo],
    vehicle: Option<&Vehicle>,
    customer: Option<&Customer>,
) -> SessionReport {
    build_report_at(Utc::now(), session, photos, vehicle, customer)
}

pub fn build_report_at(
    now: DateTime<Utc>,
    session: &PhotoSession,
    photos: &[Photo],
    vehicle: Option<&Vehicle>,
    customer: Option<&Customer>,
) -> SessionReport {
    SessionReport {
        session: SessionSummary {
            id: session.id,
            name: session.session_name.clone(),
            session_type: session.session_type,
            status: session.status.clone(),
            start_time: session.start_time.clone(),
            end_time: session.end_time.clone(),
            total_photos: session.total_photos,
        },
        vehicle: vehicle.map(vehicle_summary).unwrap_or_default(),
        customer: customer_summary(customer),
        photos: matched_photos(session, photos)
            .into_iter()
            .map(|photo| ReportPhoto {
                id: photo.id,
                angle: photo.angle.clone(),
                description: photo.description.clone(),
                timestamp: photo.timestamp.clone(),
                category: photo.category.clone(),
            })
            .collect(),
        generated_at: now,
    }
}

fn vehicle_summary(vehicle: &Vehicle) -> VehicleSummary {
    VehicleSummary {
        make: vehicle.make.clone(),
        model: vehicle.model.clone(),
        year: vehicle.year,
        license_plate: vehicle.license_plate.clone(),
        vin: vehicle.vin.clone(),
    }
}

fn customer_summary(customer: Option<&Customer>) -> CustomerSummary {
    match customer {
        Some(customer) => CustomerSummary {
            name: format!("{} {}", customer.first_name, customer.last_name),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
        },
        None => CustomerSummary {
            name: UNKNOWN_CUSTOMER.to_string(),
            email: None,
            phone: None,
        },
    }
}
