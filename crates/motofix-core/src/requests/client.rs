//! Requests service client

use super::attachment::Attachment;
use super::types::{NewRequest, RequestStatus, ServiceRequest};
use crate::error::{MotofixError, MotofixResult};
use crate::http::{ApiClient, join_url};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

/// Client for the remote requests microservice
#[derive(Debug, Clone)]
pub struct RequestsClient {
    api: ApiClient,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequestList {
    Bare(Vec<ServiceRequest>),
    Wrapped { requests: Vec<ServiceRequest> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequestEnvelope {
    Wrapped { request: ServiceRequest },
    Bare(ServiceRequest),
}

impl From<RequestEnvelope> for ServiceRequest {
    fn from(envelope: RequestEnvelope) -> Self {
        match envelope {
            RequestEnvelope::Wrapped { request } | RequestEnvelope::Bare(request) => request,
        }
    }
}

#[derive(Serialize)]
struct StatusUpdate {
    status: RequestStatus,
}

#[derive(Deserialize)]
struct ProxyNumber {
    #[serde(alias = "phone", alias = "proxyNumber", alias = "proxy_number")]
    number: String,
}

impl RequestsClient {
    pub fn new(api: ApiClient, base_url: impl Into<String>) -> Self {
        Self {
            api,
            base_url: base_url.into(),
        }
    }

    /// Submit a breakdown request without attachments
    pub async fn create_request(&self, request: &NewRequest) -> MotofixResult<ServiceRequest> {
        request.validate()?;
        let url = join_url(&self.base_url, "/requests");
        let envelope: RequestEnvelope = self
            .api
            .send_json(self.api.request(Method::POST, &url).json(request))
            .await?;
        let created = ServiceRequest::from(envelope);
        tracing::info!(request_id = %created.id, "breakdown request created");
        Ok(created)
    }

    /// Submit a breakdown request with voice, photo or file attachments
    pub async fn create_request_with_attachments(
        &self,
        request: &NewRequest,
        attachments: Vec<Attachment>,
    ) -> MotofixResult<ServiceRequest> {
        request.validate()?;
        if attachments.is_empty() {
            return self.create_request(request).await;
        }

        let count = attachments.len();
        let form = build_form(request, attachments)?;
        let url = join_url(&self.base_url, "/requests/with-media");
        let envelope: RequestEnvelope = self
            .api
            .send_json(self.api.request(Method::POST, &url).multipart(form))
            .await?;
        let created = ServiceRequest::from(envelope);
        tracing::info!(request_id = %created.id, attachments = count, "breakdown request created");
        Ok(created)
    }

    /// List the signed-in user's requests, newest first
    pub async fn list_requests(&self) -> MotofixResult<Vec<ServiceRequest>> {
        let url = join_url(&self.base_url, "/requests");
        let list: RequestList = self
            .api
            .send_json(self.api.request(Method::GET, &url))
            .await?;
        let mut requests = match list {
            RequestList::Bare(requests) | RequestList::Wrapped { requests } => requests,
        };
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    /// Change the status of a request
    pub async fn update_status(
        &self,
        id: &str,
        status: RequestStatus,
    ) -> MotofixResult<ServiceRequest> {
        let url = join_url(&self.base_url, &format!("/requests/{}/status", encode_id(id)?));
        let envelope: RequestEnvelope = self
            .api
            .send_json(
                self.api
                    .request(Method::PATCH, &url)
                    .json(&StatusUpdate { status }),
            )
            .await?;
        Ok(envelope.into())
    }

    /// Masked number for calling the party assigned to a request
    pub async fn call_proxy_number(&self, id: &str) -> MotofixResult<String> {
        let url = join_url(&self.base_url, &format!("/requests/{}/call-number", encode_id(id)?));
        let proxy: ProxyNumber = self
            .api
            .send_json(self.api.request(Method::GET, &url))
            .await?;
        Ok(proxy.number)
    }
}

fn encode_id(id: &str) -> MotofixResult<&str> {
    let id = id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(MotofixError::invalid_field(
            "id",
            format!("'{}' is not a valid request id", id),
        ));
    }
    Ok(id)
}

fn build_form(request: &NewRequest, attachments: Vec<Attachment>) -> MotofixResult<Form> {
    let mut form = Form::new()
        .text("requesterName", request.requester_name.clone())
        .text("phone", request.phone.clone())
        .text("locationText", request.location_text.clone())
        .text("issueText", request.issue_text.clone());
    if let (Some(lat), Some(lon)) = (request.latitude, request.longitude) {
        form = form
            .text("latitude", lat.to_string())
            .text("longitude", lon.to_string());
    }

    for attachment in attachments {
        let field = attachment.kind.form_field();
        let part = Part::bytes(attachment.bytes)
            .file_name(attachment.file_name)
            .mime_str(&attachment.mime_type)
            .map_err(|e| MotofixError::invalid_field(field, e.to_string()))?;
        form = form.part(field, part);
    }
    Ok(form)
}
