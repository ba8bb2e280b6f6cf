use crate::format::{format_currency, format_date, format_date_time, format_phone};
use crate::models::{Customer, Id, Photo, PhotoSession, Service, SessionType, Vehicle};
use crate::progress::SessionProgress;
use crate::report::SessionReport;
use crate::ui::{
    InputKind, Nav, Notice, badge, card, escape, form, inline_post_button, input_field, layout,
    link, modal, modal_trigger, progress_bar, select_field, spinner, stat_card, table,
    text_field, textarea_field,
};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardCounts {
    pub customers: usize,
    pub vehicles: usize,
    pub services: usize,
    pub open_sessions: usize,
}

pub fn dashboard(
    counts: &DashboardCounts,
    sessions: &[PhotoSession],
    notice: Option<&Notice>,
) -> String {
    let stats = [
        stat_card("Customers", &counts.customers.to_string()),
        stat_card("Vehicles", &counts.vehicles.to_string()),
        stat_card("Services", &counts.services.to_string()),
        stat_card("Open photo sessions", &counts.open_sessions.to_string()),
    ]
    .concat();

    let rows: Vec<Vec<String>> = sessions
        .iter()
        .filter(|session| !session.is_closed())
        .map(|session| {
            vec![
                link(&format!("/sessions/{}", session.id), &session.session_name),
                escape(session.session_type.label()),
                escape(&session.start_time.as_deref().map(format_date_time).unwrap_or_default()),
            ]
        })
        .collect();

    let body = format!(
        "<div class=\"stats\">{stats}</div>{}",
        card(
            "Open sessions",
            &table(&["Session", "Type", "Started"], &rows, "No open photo sessions")
        )
    );
    layout("Dashboard", Nav::Dashboard, notice, &body)
}

pub fn customers(list: &[Customer], notice: Option<&Notice>) -> String {
    let rows: Vec<Vec<String>> = list
        .iter()
        .map(|customer| {
            vec![
                escape(&customer.full_name()),
                escape(customer.email.as_deref().unwrap_or("")),
                escape(&customer.phone.as_deref().map(format_phone).unwrap_or_default()),
                row_actions(&format!("/customers/{}", customer.id), "customer"),
            ]
        })
        .collect();

    let body = card(
        "Customers",
        &format!(
            "<p>{}</p>{}",
            link("/customers/new", "Add customer"),
            table(&["Name", "Email", "Phone", ""], &rows, "No customers yet")
        ),
    );
    layout("Customers", Nav::Customers, notice, &body)
}

pub fn customer_form(existing: Option<&Customer>, notice: Option<&Notice>) -> String {
    let blank = Customer::default();
    let customer = existing.unwrap_or(&blank);
    let fields = [
        text_field("first_name", "First name", &customer.first_name, true),
        text_field("last_name", "Last name", &customer.last_name, true),
        input_field(
            InputKind::Email,
            "email",
            "Email",
            customer.email.as_deref().unwrap_or(""),
            false,
        ),
        input_field(
            InputKind::Tel,
            "phone",
            "Phone",
            customer.phone.as_deref().unwrap_or(""),
            false,
        ),
        textarea_field("address", "Address", customer.address.as_deref().unwrap_or("")),
    ]
    .concat();

    let (title, action) = match existing {
        Some(customer) => ("Edit customer", format!("/customers/{}", customer.id)),
        None => ("New customer", "/customers".to_string()),
    };
    let body = card(title, &form(&action, &fields, "Save customer"));
    layout(title, Nav::Customers, notice, &body)
}

pub fn vehicles(
    list: &[Vehicle],
    owners: &[Customer],
    query: &str,
    notice: Option<&Notice>,
) -> String {
    let names = customer_names(owners);
    let rows: Vec<Vec<String>> = list
        .iter()
        .map(|vehicle| {
            vec![
                escape(&vehicle.title()),
                escape(vehicle.license_plate.as_deref().unwrap_or("")),
                escape(vehicle.vin.as_deref().unwrap_or("")),
                escape(&owner_name(&names, vehicle.customer_id)),
                escape(&insurance_summary(vehicle)),
                row_actions(&format!("/vehicles/{}", vehicle.id), "vehicle"),
            ]
        })
        .collect();

    let search = format!(
        "<form method=\"get\" action=\"/vehicles\"><input type=\"search\" name=\"q\" value=\"{}\" placeholder=\"Search make, plate, VIN…\" data-search=\".table tbody tr\"></form>",
        escape(query)
    );
    let body = card(
        "Vehicles",
        &format!(
            "{search}<p>{}</p>{}",
            link("/vehicles/new", "Add vehicle"),
            table(
                &["Vehicle", "Plate", "VIN", "Owner", "Insurance", ""],
                &rows,
                "No vehicles found"
            )
        ),
    );
    layout("Vehicles", Nav::Vehicles, notice, &body)
}

pub fn vehicle_form(
    existing: Option<&Vehicle>,
    owners: &[Customer],
    notice: Option<&Notice>,
) -> String {
    let blank = Vehicle::default();
    let vehicle = existing.unwrap_or(&blank);
    let owner_options: Vec<(String, String)> = owners
        .iter()
        .map(|customer| (customer.id.to_string(), customer.full_name()))
        .collect();
    let class_options: Vec<(String, String)> = (1..=4)
        .map(|class| (class.to_string(), format!("Class {class}")))
        .collect();
    let owner = vehicle.customer_id.map(|id| id.to_string());
    let class = vehicle.insurance_class.map(|class| class.to_string());
    let year = vehicle.year.map(|year| year.to_string()).unwrap_or_default();

    let fields = [
        select_field("customer_id", "Owner", &owner_options, owner.as_deref(), true),
        text_field("make", "Make", vehicle.make.as_deref().unwrap_or(""), true),
        text_field("model", "Model", vehicle.model.as_deref().unwrap_or(""), true),
        input_field(InputKind::Number, "year", "Year", &year, false),
        text_field(
            "license_plate",
            "License plate",
            vehicle.license_plate.as_deref().unwrap_or(""),
            false,
        ),
        text_field("vin", "VIN", vehicle.vin.as_deref().unwrap_or(""), false),
        text_field(
            "insurance_company",
            "Insurance company",
            vehicle.insurance_company.as_deref().unwrap_or(""),
            false,
        ),
        text_field(
            "insurance_policy_number",
            "Policy number",
            vehicle.insurance_policy_number.as_deref().unwrap_or(""),
            false,
        ),
        select_field(
            "insurance_class",
            "Insurance class",
            &class_options,
            class.as_deref(),
            false,
        ),
        input_field(
            InputKind::Date,
            "insurance_expiration_date",
            "Insurance expires",
            vehicle.insurance_expiration_date.as_deref().unwrap_or(""),
            false,
        ),
    ]
    .concat();

    let (title, action) = match existing {
        Some(vehicle) => ("Edit vehicle", format!("/vehicles/{}", vehicle.id)),
        None => ("New vehicle", "/vehicles".to_string()),
    };
    let content = if owners.is_empty() {
        format!(
            "<p class=\"hint\">Add a customer before adding a vehicle. {}</p>",
            link("/customers/new", "New customer")
        )
    } else {
        form(&action, &fields, "Save vehicle")
    };
    layout(title, Nav::Vehicles, notice, &card(title, &content))
}

pub fn services(list: &[Service], fleet: &[Vehicle], notice: Option<&Notice>) -> String {
    let titles = vehicle_titles(fleet);
    let rows: Vec<Vec<String>> = list
        .iter()
        .map(|service| {
            vec![
                escape(&service.description),
                escape(&vehicle_label(&titles, service.vehicle_id)),
                escape(&format_currency(service.price)),
                escape(service.status.as_deref().unwrap_or("")),
                escape(&service.service_date.as_deref().map(format_date).unwrap_or_default()),
                row_actions(&format!("/services/{}", service.id), "service"),
            ]
        })
        .collect();

    let total: f64 = list.iter().map(|service| service.price).sum();
    let body = format!(
        "<div class=\"stats\">{}{}</div>{}",
        stat_card("Services", &list.len().to_string()),
        stat_card("Billed", &format_currency(total)),
        card(
            "Services",
            &format!(
                "<p>{}</p>{}",
                link("/services/new", "Add service"),
                table(
                    &["Description", "Vehicle", "Price", "Status", "Date", ""],
                    &rows,
                    "No services recorded"
                )
            )
        )
    );
    layout("Services", Nav::Services, notice, &body)
}

pub fn service_form(
    existing: Option<&Service>,
    fleet: &[Vehicle],
    notice: Option<&Notice>,
) -> String {
    let blank = Service::default();
    let service = existing.unwrap_or(&blank);
    let vehicle = service.vehicle_id.map(|id| id.to_string());
    let price = if existing.is_some() {
        format!("{:.2}", service.price)
    } else {
        String::new()
    };

    let fields = [
        select_field(
            "vehicle_id",
            "Vehicle",
            &vehicle_options(fleet),
            vehicle.as_deref(),
            true,
        ),
        text_field("description", "Description", &service.description, true),
        input_field(InputKind::Number, "price", "Price", &price, true),
        text_field("status", "Status", service.status.as_deref().unwrap_or(""), false),
        input_field(
            InputKind::Date,
            "service_date",
            "Date",
            service.service_date.as_deref().unwrap_or(""),
            false,
        ),
    ]
    .concat();

    let (title, action) = match existing {
        Some(service) => ("Edit service", format!("/services/{}", service.id)),
        None => ("New service", "/services".to_string()),
    };
    let body = card(title, &form(&action, &fields, "Save service"));
    layout(title, Nav::Services, notice, &body)
}

pub fn sessions(list: &[PhotoSession], fleet: &[Vehicle], notice: Option<&Notice>) -> String {
    let titles = vehicle_titles(fleet);
    let rows: Vec<Vec<String>> = list
        .iter()
        .map(|session| {
            vec![
                link(&format!("/sessions/{}", session.id), &session.session_name),
                escape(session.session_type.label()),
                escape(&vehicle_label(&titles, Some(session.vehicle_id))),
                status_badge(session),
                escape(&session.total_photos.to_string()),
                escape(&session.start_time.as_deref().map(format_date_time).unwrap_or_default()),
            ]
        })
        .collect();

    let type_options: Vec<(String, String)> = SessionType::ALL
        .iter()
        .map(|kind| (kind.as_str().to_string(), kind.label().to_string()))
        .collect();
    let fields = [
        text_field("session_name", "Session name", "", true),
        select_field("session_type", "Type", &type_options, None, true),
        select_field("vehicle_id", "Vehicle", &vehicle_options(fleet), None, true),
    ]
    .concat();
    let (modal_id, new_session) = modal(
        "New photo session",
        &form("/sessions", &fields, "Start session"),
    );

    let body = format!(
        "{}{new_session}",
        card(
            "Photo sessions",
            &format!(
                "<p>{}</p>{}",
                modal_trigger(&modal_id, "Start a session", "btn"),
                table(
                    &["Session", "Type", "Vehicle", "Status", "Photos", "Started"],
                    &rows,
                    "No photo sessions yet"
                )
            )
        )
    );
    layout("Photo sessions", Nav::Sessions, notice, &body)
}

pub struct SessionView<'a> {
    pub session: &'a PhotoSession,
    pub vehicle: Option<&'a Vehicle>,
    pub progress: &'a SessionProgress,
    pub photos: &'a [&'a Photo],
}

pub fn session_detail(view: &SessionView<'_>, notice: Option<&Notice>) -> String {
    let session = view.session;
    let progress = view.progress;
    let vehicle = view
        .vehicle
        .map(Vehicle::title)
        .unwrap_or_else(|| format!("Vehicle #{}", session.vehicle_id));

    let checklist: String = progress
        .required
        .iter()
        .map(|angle| {
            let tone = if progress.missing.contains(angle) { "missing" } else { "done" };
            badge(angle, tone)
        })
        .collect::<Vec<_>>()
        .join(" ");

    let summary = format!(
        "<div class=\"stats\">{}{}{}</div>{}<p>{checklist}</p>",
        stat_card("Type", session.session_type.label()),
        stat_card("Vehicle", &vehicle),
        stat_card("Photos", &session.total_photos.to_string()),
        progress_bar(progress.percent),
    );

    let rows: Vec<Vec<String>> = view
        .photos
        .iter()
        .map(|photo| {
            vec![
                escape(photo.angle.as_deref().unwrap_or("")),
                escape(photo.description.as_deref().unwrap_or("")),
                escape(&photo.timestamp.as_deref().map(format_date_time).unwrap_or_default()),
            ]
        })
        .collect();

    let capture = if session.is_closed() {
        "<p class=\"hint\">This session is closed.</p>".to_string()
    } else {
        capture_form(session, progress)
    };

    let actions = if session.is_closed() {
        String::new()
    } else {
        inline_post_button(
            &format!("/sessions/{}/close", session.id),
            "Close session",
            Some("Close this photo session?"),
        )
    };

    let body = [
        card(
            &session.session_name,
            &format!(
                "{summary}<p>{} · {}</p>",
                link(&format!("/sessions/{}/report", session.id), "View report"),
                actions
            ),
        ),
        card("Capture", &capture),
        card(
            "Captured photos",
            &table(&["Angle", "Description", "Taken"], &rows, "No photos captured yet"),
        ),
    ]
    .concat();
    layout(&session.session_name, Nav::Sessions, notice, &body)
}

fn capture_form(session: &PhotoSession, progress: &SessionProgress) -> String {
    let next = progress.missing.first().map(String::as_str);
    let angle_options: Vec<(String, String)> = progress
        .required
        .iter()
        .map(|angle| (angle.clone(), angle.clone()))
        .collect();

    format!(
        "<form method=\"post\" action=\"/sessions/{}/photos\" enctype=\"multipart/form-data\" class=\"form\" data-submit-once>\
<label class=\"field\"><span>Photo</span><input type=\"file\" name=\"file\" accept=\"image/*\" capture=\"environment\" required></label>\
{}{}{}\
<div class=\"form-actions\"><button type=\"submit\" class=\"btn\">Upload photo</button>{}</div></form>",
        session.id,
        select_field("angle", "Angle", &angle_options, next, false),
        text_field("custom_angle", "Other angle", "", false),
        textarea_field("description", "Notes", ""),
        spinner("Uploading…"),
    )
}

pub fn report_page(report: &SessionReport, notice: Option<&Notice>) -> String {
    let session = &report.session;
    let vehicle = &report.vehicle;
    let customer = &report.customer;
    let year = vehicle.year.map(|year| year.to_string()).unwrap_or_default();

    let details = table(
        &["Field", "Value"],
        &[
            row("Session", &session.name),
            row("Type", session.session_type.label()),
            row("Status", &session.status),
            row(
                "Started",
                &session.start_time.as_deref().map(format_date_time).unwrap_or_default(),
            ),
            row(
                "Ended",
                &session.end_time.as_deref().map(format_date_time).unwrap_or_default(),
            ),
            row("Photos", &session.total_photos.to_string()),
            row("Customer", &customer.name),
            row("Email", customer.email.as_deref().unwrap_or("")),
            row(
                "Phone",
                &customer.phone.as_deref().map(format_phone).unwrap_or_default(),
            ),
            row("Make", vehicle.make.as_deref().unwrap_or("")),
            row("Model", vehicle.model.as_deref().unwrap_or("")),
            row("Year", &year),
            row("Plate", vehicle.license_plate.as_deref().unwrap_or("")),
            row("VIN", vehicle.vin.as_deref().unwrap_or("")),
        ],
        "",
    );

    let photos: Vec<Vec<String>> = report
        .photos
        .iter()
        .map(|photo| {
            vec![
                escape(&photo.id.to_string()),
                escape(photo.angle.as_deref().unwrap_or("")),
                escape(photo.description.as_deref().unwrap_or("")),
                escape(&photo.timestamp.as_deref().map(format_date_time).unwrap_or_default()),
            ]
        })
        .collect();

    let body = [
        card(&format!("Report: {}", session.name), &details),
        card(
            "Photos",
            &table(&["#", "Angle", "Description", "Taken"], &photos, "No photos in this session"),
        ),
        format!(
            "<p class=\"hint\">Generated {} · {}</p>",
            escape(&report.generated_at.format("%b %-d, %Y %H:%M UTC").to_string()),
            link(&format!("/api/sessions/{}/report", session.id), "JSON")
        ),
    ]
    .concat();
    layout("Session report", Nav::Sessions, notice, &body)
}

fn row(label: &str, value: &str) -> Vec<String> {
    vec![escape(label), escape(value)]
}

fn row_actions(base: &str, noun: &str) -> String {
    format!(
        "{} · {}",
        link(&format!("{base}/edit"), "Edit"),
        inline_post_button(
            &format!("{base}/delete"),
            "Delete",
            Some(&format!("Delete this {noun}?"))
        )
    )
}

fn status_badge(session: &PhotoSession) -> String {
    let tone = if session.is_closed() { "closed" } else { "open" };
    badge(&session.status, tone)
}

fn customer_names(owners: &[Customer]) -> HashMap<Id, String> {
    owners
        .iter()
        .map(|customer| (customer.id, customer.full_name()))
        .collect()
}

fn owner_name(names: &HashMap<Id, String>, customer_id: Option<Id>) -> String {
    customer_id
        .and_then(|id| names.get(&id).cloned())
        .unwrap_or_default()
}

fn vehicle_titles(fleet: &[Vehicle]) -> HashMap<Id, String> {
    fleet
        .iter()
        .map(|vehicle| (vehicle.id, vehicle_option_label(vehicle)))
        .collect()
}

fn vehicle_label(titles: &HashMap<Id, String>, vehicle_id: Option<Id>) -> String {
    match vehicle_id {
        Some(id) => titles
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("Vehicle #{id}")),
        None => String::new(),
    }
}

fn vehicle_options(fleet: &[Vehicle]) -> Vec<(String, String)> {
    fleet
        .iter()
        .map(|vehicle| (vehicle.id.to_string(), vehicle_option_label(vehicle)))
        .collect()
}

fn vehicle_option_label(vehicle: &Vehicle) -> String {
    match vehicle.license_plate.as_deref() {
        Some(plate) if !plate.is_empty() => format!("{} ({plate})", vehicle.title()),
        _ => vehicle.title(),
    }
}

fn insurance_summary(vehicle: &Vehicle) -> String {
    let company = vehicle.insurance_company.as_deref().unwrap_or("");
    match (vehicle.insurance_class, vehicle.insurance_expiration_date.as_deref()) {
        (Some(class), Some(expires)) => {
            format!("{company} · class {class} · until {}", format_date(expires))
        }
        (Some(class), None) => format!("{company} · class {class}"),
        (None, Some(expires)) => format!("{company} · until {}", format_date(expires)),
        (None, None) => company.to_string(),
    }
}
