//! Typed client for the shop's REST API.
//!
//! Every call is a single attempt with no timeout. Non-2xx responses become
//! [`ApiError::Status`] carrying the body's `error` field when there is one.

use crate::errors::ApiError;
use crate::models::{
    Customer, CustomerInput, HealthStatus, Id, NewPhotoSession, Photo, PhotoSession, PhotoUpload,
    Service, ServiceInput, Vehicle, VehicleInput,
};
use reqwest::{Client, Method, RequestBuilder, Response, header, multipart};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json("/api", &[]).await
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
        self.get_json("/api/customers", &[]).await
    }

    pub async fn get_customer(&self, id: Id) -> Result<Customer, ApiError> {
        self.get_json(&format!("/api/customers/{id}"), &[]).await
    }

    pub async fn create_customer(&self, input: &CustomerInput) -> Result<Customer, ApiError> {
        self.send_json(Method::POST, "/api/customers", input).await
    }

    pub async fn update_customer(
        &self,
        id: Id,
        input: &CustomerInput,
    ) -> Result<Customer, ApiError> {
        self.send_json(Method::PUT, &format!("/api/customers/{id}"), input)
            .await
    }

    pub async fn delete_customer(&self, id: Id) -> Result<(), ApiError> {
        self.delete(&format!("/api/customers/{id}")).await
    }

    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, ApiError> {
        self.get_json("/api/vehicles", &[]).await
    }

    pub async fn get_vehicle(&self, id: Id) -> Result<Vehicle, ApiError> {
        self.get_json(&format!("/api/vehicles/{id}"), &[]).await
    }

    pub async fn create_vehicle(&self, input: &VehicleInput) -> Result<Vehicle, ApiError> {
        self.send_json(Method::POST, "/api/vehicles", input).await
    }

    pub async fn update_vehicle(&self, id: Id, input: &VehicleInput) -> Result<Vehicle, ApiError> {
        self.send_json(Method::PUT, &format!("/api/vehicles/{id}"), input)
            .await
    }

    pub async fn delete_vehicle(&self, id: Id) -> Result<(), ApiError> {
        self.delete(&format!("/api/vehicles/{id}")).await
    }

    pub async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        self.get_json("/api/services", &[]).await
    }

    pub async fn get_service(&self, id: Id) -> Result<Service, ApiError> {
        self.get_json(&format!("/api/services/{id}"), &[]).await
    }

    pub async fn create_service(&self, input: &ServiceInput) -> Result<Service, ApiError> {
        self.send_json(Method::POST, "/api/services", input).await
    }

    pub async fn update_service(&self, id: Id, input: &ServiceInput) -> Result<Service, ApiError> {
        self.send_json(Method::PUT, &format!("/api/services/{id}"), input)
            .await
    }

    pub async fn delete_service(&self, id: Id) -> Result<(), ApiError> {
        self.delete(&format!("/api/services/{id}")).await
    }

    pub async fn create_session(
        &self,
        session: &NewPhotoSession,
    ) -> Result<PhotoSession, ApiError> {
        self.send_json(Method::POST, "/api/photo-sessions", session)
            .await
    }

    pub async fn get_session(&self, id: Id) -> Result<PhotoSession, ApiError> {
        self.get_json(&format!("/api/photo-sessions/{id}"), &[]).await
    }

    /// Filters are forwarded as the query string untouched.
    pub async fn list_sessions(
        &self,
        filters: &[(String, String)],
    ) -> Result<Vec<PhotoSession>, ApiError> {
        self.get_json("/api/photo-sessions", filters).await
    }

    /// Closing an already closed session is left to the server to decide.
    pub async fn close_session(&self, id: Id) -> Result<PhotoSession, ApiError> {
        let path = format!("/api/photo-sessions/{id}/close");
        let response = self.execute(self.request(Method::POST, &path)).await?;
        decode(&path, response).await
    }

    pub async fn list_photos(&self, filters: &[(String, String)]) -> Result<Vec<Photo>, ApiError> {
        self.get_json("/api/photos", filters).await
    }

    pub async fn upload_photo(&self, upload: PhotoUpload) -> Result<Photo, ApiError> {
        let mut file = multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type.as_deref() {
            file = file
                .mime_str(content_type)
                .map_err(|err| ApiError::Upload(err.to_string()))?;
        }

        let mut form = multipart::Form::new()
            .part("file", file)
            .text("session_id", upload.session_id.to_string())
            .text("vehicle_id", upload.vehicle_id.to_string())
            .text("category", upload.category)
            .text("angle", upload.angle)
            .text("description", upload.description)
            .text("created_by", upload.created_by);
        if let Some(customer_id) = upload.customer_id {
            form = form.text("customer_id", customer_id.to_string());
        }

        let path = "/api/photos";
        let builder = self
            .http
            .post(self.url(path))
            .header(header::ACCEPT, "application/json")
            .multipart(form);
        let response = self.execute(builder).await?;
        decode(path, response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder.build().map_err(|source| ApiError::Transport {
            url: self.base_url.clone(),
            source,
        })?;
        let url = request.url().to_string();
        debug!("{} {url}", request.method());

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| ApiError::Transport { url, source })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let mut builder = self.request(Method::GET, path);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        let response = self.execute(builder).await?;
        decode(path, response).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.execute(self.request(method, path).json(body)).await?;
        decode(path, response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, ApiError> {
    response.json::<T>().await.map_err(|source| ApiError::Decode {
        url: path.to_string(),
        source,
    })
}
