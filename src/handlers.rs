use crate::config::parse_angles;
use crate::errors::{ApiError, AppError};
use crate::forms::{CustomerForm, ServiceForm, SessionForm, VehicleForm};
use crate::models::{HealthStatus, Id, Photo, PhotoSession, PhotoUpload, Vehicle};
use crate::pages::{self, DashboardCounts, SessionView};
use crate::progress::{SessionProgress, matched_photos, session_progress};
use crate::report::{SessionReport, build_report};
use crate::state::AppState;
use crate::ui::{Notice, NoticeKind, encode_query};
use axum::{
    Form, Json,
    extract::{Multipart, Path, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tracing::{error, info, warn};

#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub notice: Option<String>,
    pub kind: Option<String>,
    pub q: Option<String>,
    pub angles: Option<String>,
}

impl PageQuery {
    fn notice(&self) -> Option<Notice> {
        let message = self.notice.as_deref()?.trim();
        if message.is_empty() {
            return None;
        }
        Some(Notice {
            kind: NoticeKind::parse(self.kind.as_deref().unwrap_or_default()),
            message: message.to_string(),
        })
    }

    fn required_angles(&self, state: &AppState) -> Vec<String> {
        self.angles
            .as_deref()
            .map(parse_angles)
            .filter(|angles| !angles.is_empty())
            .unwrap_or_else(|| state.config.required_angles.clone())
    }
}

pub async fn index(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Html<String> {
    let mut failures = Vec::new();
    let customers = or_empty(state.api.list_customers().await, "customers", &mut failures);
    let vehicles = or_empty(state.api.list_vehicles().await, "vehicles", &mut failures);
    let services = or_empty(state.api.list_services().await, "services", &mut failures);
    let sessions = or_empty(state.api.list_sessions(&[]).await, "photo sessions", &mut failures);

    let counts = DashboardCounts {
        customers: customers.len(),
        vehicles: vehicles.len(),
        services: services.len(),
        open_sessions: sessions.iter().filter(|session| !session.is_closed()).count(),
    };
    let notice = first_failure(failures).or_else(|| query.notice());
    Html(pages::dashboard(&counts, &sessions, notice.as_ref()))
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, AppError> {
    let status = state
        .api
        .health()
        .await
        .map_err(|err| upstream_error("health check failed", err))?;
    Ok(Json(status))
}

pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let mut failures = Vec::new();
    let customers = or_empty(state.api.list_customers().await, "customers", &mut failures);
    let notice = first_failure(failures).or_else(|| query.notice());
    Html(pages::customers(&customers, notice.as_ref()))
}

pub async fn new_customer(Query(query): Query<PageQuery>) -> Html<String> {
    Html(pages::customer_form(None, query.notice().as_ref()))
}

pub async fn edit_customer(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let customer = state
        .api
        .get_customer(id)
        .await
        .map_err(|err| upstream_error("failed to load customer", err))?;
    Ok(Html(pages::customer_form(Some(&customer), query.notice().as_ref())))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Form(form): Form<CustomerForm>,
) -> Redirect {
    let input = match form.into_input() {
        Ok(input) => input,
        Err(message) => return redirect_with("/customers/new", Notice::error(message)),
    };
    match state.api.create_customer(&input).await {
        Ok(customer) => {
            info!("created customer {}", customer.id);
            redirect_with("/customers", Notice::success("Customer saved"))
        }
        Err(err) => failed("/customers/new", "failed to create customer", err),
    }
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Form(form): Form<CustomerForm>,
) -> Redirect {
    let back = format!("/customers/{id}/edit");
    let input = match form.into_input() {
        Ok(input) => input,
        Err(message) => return redirect_with(&back, Notice::error(message)),
    };
    match state.api.update_customer(id, &input).await {
        Ok(_) => redirect_with("/customers", Notice::success("Customer updated")),
        Err(err) => failed(&back, "failed to update customer", err),
    }
}

pub async fn delete_customer(State(state): State<AppState>, Path(id): Path<Id>) -> Redirect {
    match state.api.delete_customer(id).await {
        Ok(()) => redirect_with("/customers", Notice::success("Customer deleted")),
        Err(err) => failed("/customers", "failed to delete customer", err),
    }
}

pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let mut failures = Vec::new();
    let vehicles = or_empty(state.api.list_vehicles().await, "vehicles", &mut failures);
    let customers = or_empty(state.api.list_customers().await, "customers", &mut failures);

    let needle = query.q.as_deref().unwrap_or_default().trim();
    let shown: Vec<Vehicle> = vehicles
        .into_iter()
        .filter(|vehicle| vehicle_matches(vehicle, needle))
        .collect();

    let notice = first_failure(failures).or_else(|| query.notice());
    Html(pages::vehicles(&shown, &customers, needle, notice.as_ref()))
}

pub async fn new_vehicle(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let mut failures = Vec::new();
    let customers = or_empty(state.api.list_customers().await, "customers", &mut failures);
    let notice = first_failure(failures).or_else(|| query.notice());
    Html(pages::vehicle_form(None, &customers, notice.as_ref()))
}

pub async fn edit_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let vehicle = state
        .api
        .get_vehicle(id)
        .await
        .map_err(|err| upstream_error("failed to load vehicle", err))?;
    let mut failures = Vec::new();
    let customers = or_empty(state.api.list_customers().await, "customers", &mut failures);
    let notice = first_failure(failures).or_else(|| query.notice());
    Ok(Html(pages::vehicle_form(
        Some(&vehicle),
        &customers,
        notice.as_ref(),
    )))
}

pub async fn create_vehicle(
    State(state): State<AppState>,
    Form(form): Form<VehicleForm>,
) -> Redirect {
    let input = match form.into_input() {
        Ok(input) => input,
        Err(message) => return redirect_with("/vehicles/new", Notice::error(message)),
    };
    match state.api.create_vehicle(&input).await {
        Ok(vehicle) => {
            info!("created vehicle {}", vehicle.id);
            redirect_with("/vehicles", Notice::success("Vehicle saved"))
        }
        Err(err) => failed("/vehicles/new", "failed to create vehicle", err),
    }
}

pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Form(form): Form<VehicleForm>,
) -> Redirect {
    let back = format!("/vehicles/{id}/edit");
    let input = match form.into_input() {
        Ok(input) => input,
        Err(message) => return redirect_with(&back, Notice::error(message)),
    };
    match state.api.update_vehicle(id, &input).await {
        Ok(_) => redirect_with("/vehicles", Notice::success("Vehicle updated")),
        Err(err) => failed(&back, "failed to update vehicle", err),
    }
}

pub async fn delete_vehicle(State(state): State<AppState>, Path(id): Path<Id>) -> Redirect {
    match state.api.delete_vehicle(id).await {
        Ok(()) => redirect_with("/vehicles", Notice::success("Vehicle deleted")),
        Err(err) => failed("/vehicles", "failed to delete vehicle", err),
    }
}

pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let mut failures = Vec::new();
    let services = or_empty(state.api.list_services().await, "services", &mut failures);
    let vehicles = or_empty(state.api.list_vehicles().await, "vehicles", &mut failures);
    let notice = first_failure(failures).or_else(|| query.notice());
    Html(pages::services(&services, &vehicles, notice.as_ref()))
}

pub async fn new_service(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let mut failures = Vec::new();
    let vehicles = or_empty(state.api.list_vehicles().await, "vehicles", &mut failures);
    let notice = first_failure(failures).or_else(|| query.notice());
    Html(pages::service_form(None, &vehicles, notice.as_ref()))
}

pub async fn edit_service(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let service = state
        .api
        .get_service(id)
        .await
        .map_err(|err| upstream_error("failed to load service", err))?;
    let mut failures = Vec::new();
    let vehicles = or_empty(state.api.list_vehicles().await, "vehicles", &mut failures);
    let notice = first_failure(failures).or_else(|| query.notice());
    Ok(Html(pages::service_form(
        Some(&service),
        &vehicles,
        notice.as_ref(),
    )))
}

pub async fn create_service(
    State(state): State<AppState>,
    Form(form): Form<ServiceForm>,
) -> Redirect {
    let input = match form.into_input() {
        Ok(input) => input,
        Err(message) => return redirect_with("/services/new", Notice::error(message)),
    };
    match state.api.create_service(&input).await {
        Ok(service) => {
            info!("created service {}", service.id);
            redirect_with("/services", Notice::success("Service saved"))
        }
        Err(err) => failed("/services/new", "failed to create service", err),
    }
}

pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Form(form): Form<ServiceForm>,
) -> Redirect {
    let back = format!("/services/{id}/edit");
    let input = match form.into_input() {
        Ok(input) => input,
        Err(message) => return redirect_with(&back, Notice::error(message)),
    };
    match state.api.update_service(id, &input).await {
        Ok(_) => redirect_with("/services", Notice::success("Service updated")),
        Err(err) => failed(&back, "failed to update service", err),
    }
}

pub async fn delete_service(State(state): State<AppState>, Path(id): Path<Id>) -> Redirect {
    match state.api.delete_service(id).await {
        Ok(()) => redirect_with("/services", Notice::success("Service deleted")),
        Err(err) => failed("/services", "failed to delete service", err),
    }
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let mut failures = Vec::new();
    let sessions = or_empty(state.api.list_sessions(&[]).await, "photo sessions", &mut failures);
    let vehicles = or_empty(state.api.list_vehicles().await, "vehicles", &mut failures);
    let notice = first_failure(failures).or_else(|| query.notice());
    Html(pages::sessions(&sessions, &vehicles, notice.as_ref()))
}

pub async fn create_session(
    State(state): State<AppState>,
    Form(form): Form<SessionForm>,
) -> Redirect {
    let customer_id = match form.vehicle_id() {
        Some(vehicle_id) => match state.api.get_vehicle(vehicle_id).await {
            Ok(vehicle) => vehicle.customer_id,
            Err(err) => {
                warn!("could not look up owner of vehicle {vehicle_id}: {err}");
                None
            }
        },
        None => None,
    };

    let new_session = match form.into_new_session(customer_id) {
        Ok(new_session) => new_session,
        Err(message) => return redirect_with("/sessions", Notice::error(message)),
    };
    match state.api.create_session(&new_session).await {
        Ok(session) => {
            info!(
                "started {} session {} for vehicle {}",
                session.session_type, session.id, session.vehicle_id
            );
            redirect_with(
                &format!("/sessions/{}", session.id),
                Notice::success("Session started"),
            )
        }
        Err(err) => failed("/sessions", "failed to create photo session", err),
    }
}

pub async fn show_session(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let session = load_session(&state, id).await?;
    let required = query.required_angles(&state);

    let mut failures = Vec::new();
    let photos = or_empty(session_photos(&state, &session).await, "photos", &mut failures);
    let vehicle = match state.api.get_vehicle(session.vehicle_id).await {
        Ok(vehicle) => Some(vehicle),
        Err(err) => {
            warn!("could not load vehicle {}: {err}", session.vehicle_id);
            None
        }
    };

    let progress = session_progress(&session, &photos, &required);
    let matched = matched_photos(&session, &photos);
    let view = SessionView {
        session: &session,
        vehicle: vehicle.as_ref(),
        progress: &progress,
        photos: &matched,
    };
    let notice = first_failure(failures).or_else(|| query.notice());
    Ok(Html(pages::session_detail(&view, notice.as_ref())))
}

pub async fn session_progress_json(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Query(query): Query<PageQuery>,
) -> Result<Json<SessionProgress>, AppError> {
    let session = load_session(&state, id).await?;
    let photos = session_photos(&state, &session)
        .await
        .map_err(|err| upstream_error("failed to load photos", err))?;
    let required = query.required_angles(&state);
    Ok(Json(session_progress(&session, &photos, &required)))
}

pub async fn upload_photo(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let back = format!("/sessions/{id}");
    let mut upload = PhotoUpload::default();
    let mut picked_angle = String::new();
    let mut custom_angle = String::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.file_name = field.file_name().unwrap_or("photo.jpg").to_string();
                upload.content_type = field.content_type().map(str::to_string);
                upload.bytes = field.bytes().await?.to_vec();
            }
            "angle" => picked_angle = field.text().await?,
            "custom_angle" => custom_angle = field.text().await?,
            "description" => upload.description = field.text().await?,
            _ => {}
        }
    }

    if upload.bytes.is_empty() {
        return Ok(redirect_with(&back, Notice::error("Choose a photo to upload")));
    }

    let session = load_session(&state, id).await?;
    if session.is_closed() {
        return Ok(redirect_with(&back, Notice::error("This session is already closed")));
    }

    upload.session_id = session.id;
    upload.vehicle_id = session.vehicle_id;
    upload.customer_id = session.customer_id;
    upload.category = session.session_type.as_str().to_string();
    upload.angle = if custom_angle.trim().is_empty() {
        picked_angle.trim().to_string()
    } else {
        custom_angle.trim().to_string()
    };
    upload.description = upload.description.trim().to_string();
    upload.created_by = state.config.operator.clone();

    let angle = upload.angle.clone();
    match state.api.upload_photo(upload).await {
        Ok(photo) => {
            info!("stored photo {} ({angle}) for session {id}", photo.id);
            Ok(redirect_with(&back, Notice::success("Photo saved")))
        }
        Err(err) => Ok(failed(&back, "failed to upload photo", err)),
    }
}

pub async fn close_session(State(state): State<AppState>, Path(id): Path<Id>) -> Redirect {
    let back = format!("/sessions/{id}");
    match state.api.close_session(id).await {
        Ok(session) => {
            info!("closed session {} with {} photos", session.id, session.total_photos);
            redirect_with(&back, Notice::success("Session closed"))
        }
        Err(err) => failed(&back, "failed to close photo session", err),
    }
}

pub async fn session_report_json(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<SessionReport>, AppError> {
    Ok(Json(load_report(&state, id).await?))
}

pub async fn session_report_page(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let report = load_report(&state, id).await?;
    Ok(Html(pages::report_page(&report, query.notice().as_ref())))
}

async fn load_session(state: &AppState, id: Id) -> Result<PhotoSession, AppError> {
    state
        .api
        .get_session(id)
        .await
        .map_err(|err| upstream_error("failed to load photo session", err))
}

/// The upstream may or may not honour the filters; matching happens locally
/// either way.
async fn session_photos(state: &AppState, session: &PhotoSession) -> Result<Vec<Photo>, ApiError> {
    let filters = [
        ("vehicle_id".to_string(), session.vehicle_id.to_string()),
        ("category".to_string(), session.session_type.as_str().to_string()),
    ];
    state.api.list_photos(&filters).await
}

async fn load_report(state: &AppState, id: Id) -> Result<SessionReport, AppError> {
    let session = load_session(state, id).await?;
    let photos = session_photos(state, &session)
        .await
        .map_err(|err| upstream_error("failed to load photos", err))?;

    let vehicle = match state.api.get_vehicle(session.vehicle_id).await {
        Ok(vehicle) => Some(vehicle),
        Err(err) => {
            warn!("report without vehicle {}: {err}", session.vehicle_id);
            None
        }
    };

    let customer_id = session
        .customer_id
        .or_else(|| vehicle.as_ref().and_then(|vehicle| vehicle.customer_id));
    let customer = match customer_id {
        Some(customer_id) => match state.api.get_customer(customer_id).await {
            Ok(customer) => Some(customer),
            Err(err) => {
                warn!("report without customer {customer_id}: {err}");
                None
            }
        },
        None => None,
    };

    Ok(build_report(
        &session,
        &photos,
        vehicle.as_ref(),
        customer.as_ref(),
    ))
}

pub fn vehicle_matches(vehicle: &Vehicle, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    [
        vehicle.make.as_deref(),
        vehicle.model.as_deref(),
        vehicle.license_plate.as_deref(),
        vehicle.vin.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|value| value.to_lowercase().contains(&needle))
        || vehicle.year.is_some_and(|year| year.to_string() == needle)
}

fn redirect_with(path: &str, notice: Notice) -> Redirect {
    Redirect::to(&format!(
        "{path}?notice={}&kind={}",
        encode_query(&notice.message),
        notice.kind.as_str()
    ))
}

fn failed(back: &str, context: &str, err: ApiError) -> Redirect {
    error!("{context}: {err}");
    redirect_with(back, Notice::error(err.to_string()))
}

fn upstream_error(context: &str, err: ApiError) -> AppError {
    error!("{context}: {err}");
    err.into()
}

fn or_empty<T>(result: Result<Vec<T>, ApiError>, what: &str, failures: &mut Vec<String>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) => {
            error!("failed to load {what}: {err}");
            failures.push(format!("Could not load {what}: {err}"));
            Vec::new()
        }
    }
}

fn first_failure(failures: Vec<String>) -> Option<Notice> {
    failures.into_iter().next().map(Notice::error)
}
