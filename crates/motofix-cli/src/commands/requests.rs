//! Breakdown request commands

use super::auth::require_user;
use crate::console::CliConsole;
use chrono::Local;
use motofix_sdk::{
    Attachment, AttachmentKind, Coordinates, MotofixClient, NewRequest, RequestStatus,
    ServiceRequest,
};
use std::path::PathBuf;
use std::time::Duration;

/// Form values collected by `motofix request new`
#[derive(Debug)]
pub struct NewRequestArgs {
    pub name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub issue: String,
    pub position: Option<(f64, f64)>,
    pub voice: Option<PathBuf>,
    pub photos: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

impl NewRequestArgs {
    fn attachment_paths(&self) -> impl Iterator<Item = (AttachmentKind, &PathBuf)> {
        self.voice
            .iter()
            .map(|p| (AttachmentKind::Voice, p))
            .chain(self.photos.iter().map(|p| (AttachmentKind::Photo, p)))
            .chain(self.files.iter().map(|p| (AttachmentKind::File, p)))
    }
}

pub async fn create(
    client: &MotofixClient,
    console: &CliConsole,
    args: NewRequestArgs,
) -> anyhow::Result<()> {
    let user = require_user(client)?;

    let coords = match args.position {
        Some((lat, lon)) => Some(
            Coordinates::new(lat, lon)
                .ok_or_else(|| anyhow::anyhow!("Invalid position {}, {}", lat, lon))?,
        ),
        None => None,
    };

    let location = match (&args.location, coords) {
        (Some(text), _) => text.clone(),
        (None, Some(coords)) => {
            console.info("Looking up your location...");
            let label = client.describe_location(coords).await;
            console.field("Location", &label);
            label
        }
        (None, None) => anyhow::bail!("Give --location or --lat/--lon"),
    };

    let phone = args.phone.clone().unwrap_or_else(|| user.phone.clone());
    let mut request = NewRequest::new(&args.name, phone, location, &args.issue);
    if let Some(coords) = coords {
        request = request.with_position(coords.latitude, coords.longitude);
    }
    request.validate()?;

    let mut attachments = Vec::new();
    for (kind, path) in args.attachment_paths() {
        attachments.push(Attachment::from_path(kind, path).await?);
    }

    let created = client.submit_request(&request, attachments).await?;
    console.success(&format!("Request {} submitted", created.id));
    print_request(console, &created);
    Ok(())
}

pub async fn list(client: &MotofixClient, console: &CliConsole, json: bool) -> anyhow::Result<()> {
    require_user(client)?;
    let requests = client.requests().list_requests().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&requests)?);
        return Ok(());
    }
    if requests.is_empty() {
        console.hint("No requests yet. Report one with `motofix request new`");
        return Ok(());
    }

    console.print_header(&format!("Your requests ({})", requests.len()));
    for request in &requests {
        println!(
            "  {:<10} {:<24} {:<12} {}",
            request.id,
            request.status.label(),
            request.created_at.with_timezone(&Local).format("%d %b %H:%M"),
            request.issue_text
        );
    }
    Ok(())
}

pub async fn set_status(
    client: &MotofixClient,
    console: &CliConsole,
    id: &str,
    status: &str,
) -> anyhow::Result<()> {
    require_user(client)?;
    let status: RequestStatus = status.parse()?;
    let updated = client.requests().update_status(id, status).await?;
    console.success(&format!("Request {} is now {}", updated.id, updated.status.label()));
    Ok(())
}

pub async fn call(client: &MotofixClient, console: &CliConsole, id: &str) -> anyhow::Result<()> {
    require_user(client)?;
    let number = client.requests().call_proxy_number(id).await?;
    console.field("Call", &number);
    Ok(())
}

/// Poll until the request reaches a terminal status
pub async fn watch(
    client: &MotofixClient,
    console: &CliConsole,
    id: &str,
    interval_secs: u64,
) -> anyhow::Result<()> {
    require_user(client)?;
    let interval = Duration::from_secs(interval_secs.max(1));
    let mut last_status = None;

    loop {
        let requests = client.requests().list_requests().await?;
        let request = requests
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| anyhow::anyhow!("No request with id {}", id))?;

        if last_status != Some(request.status) {
            console.field(
                &Local::now().format("%H:%M:%S").to_string(),
                request.status.label(),
            );
            last_status = Some(request.status);
        }
        if request.status.is_terminal() {
            return Ok(());
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                console.info("Stopped watching");
                return Ok(());
            }
        }
    }
}

fn print_request(console: &CliConsole, request: &ServiceRequest) {
    console.field("Status", request.status.label());
    console.field("Name", &request.requester_name);
    console.field("Phone", &request.phone);
    console.field("Location", &request.location_text);
    console.field("Issue", &request.issue_text);
    if !request.attachments.is_empty() {
        console.field("Attachments", &request.attachments.len().to_string());
    }
}
