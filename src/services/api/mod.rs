//! HTTP client for the back-office endpoints used by the dashboard and gantt views.
//!
//! Every path sits under the tenant prefix `/{store}/`. There are no retries:
//! a failed call is reported and left for the user to trigger again.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::course::Course;
use crate::models::record::RecordId;
use crate::models::settings::ServerSettings;

pub const UPDATE_RECORD_PATH: &str = "dashboard/update_record";
pub const CHECK_CHANGE_PATH: &str = "dashboard/check_change";
pub const COURSE_DATA_PATH: &str = "dashboard/get_course_data";
pub const ROOM_NUMBER_PATH: &str = "gantt/api/update_room_number";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a response (connection, timeout, body read).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Server answered `success: false`.
    #[error("{0}")]
    Rejected(String),
    #[error("server returned HTTP {0}")]
    Status(u16),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    fn rejected(error: Option<String>) -> Self {
        ApiError::Rejected(error.unwrap_or_else(|| "Request was rejected".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRecordRequest {
    pub record_id: RecordId,
    pub field: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
struct CheckChangeRequest {
    record_id: RecordId,
}

#[derive(Debug, Clone, Serialize)]
struct RoomNumberRequest<'a> {
    reservation_id: i64,
    room_number: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct AckResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CheckChangeResponse {
    success: bool,
    #[serde(default)]
    is_exit: bool,
    #[serde(default)]
    has_change: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CourseDataResponse {
    success: bool,
    #[serde(default)]
    courses: Vec<Course>,
    #[serde(default)]
    error: Option<String>,
}

/// Server-side change state of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeCheck {
    pub is_exit: bool,
    pub has_change: bool,
}

/// Destination for single-field saves.
pub trait RecordSink: Sync {
    fn update_record(&self, request: &UpdateRecordRequest) -> Result<(), ApiError>;
}

/// Source of course reference data.
#[cfg_attr(test, mockall::automock)]
pub trait CourseSource {
    fn get_course_data(&self) -> Result<Vec<Course>, ApiError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ChangeChecker {
    fn check_change(&self, record_id: RecordId) -> Result<ChangeCheck, ApiError>;
}

pub struct DashboardClient {
    client: Client,
    base_url: String,
    store: String,
}

impl DashboardClient {
    pub fn new(settings: &ServerSettings) -> Result<Self> {
        let mut builder = Client::builder();
        if settings.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(settings.timeout_secs));
        }
        let client = builder
            .build()
            .context("Failed to build dashboard HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim().trim_end_matches('/').to_string(),
            store: settings.store.trim().to_string(),
        })
    }

    /// Full URL for a path below the store prefix.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(&self.store),
            path.trim_start_matches('/')
        )
    }

    fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, ApiError> {
        let url = self.endpoint(path);
        log::debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send()?;
        let status = response.status();
        let text = response.text()?;
        decode_body(status, &text)
    }

    fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let url = self.endpoint(path);
        log::debug!("GET {}", url);
        let response = self.client.get(&url).send()?;
        let status = response.status();
        let text = response.text()?;
        decode_body(status, &text)
    }

    pub fn update_room_number(&self, reservation_id: i64, room_number: &str) -> Result<(), ApiError> {
        let ack: AckResponse = self.post(
            ROOM_NUMBER_PATH,
            &RoomNumberRequest {
                reservation_id,
                room_number,
            },
        )?;
        if !ack.success {
            return Err(ApiError::rejected(ack.error));
        }
        Ok(())
    }
}

impl RecordSink for DashboardClient {
    fn update_record(&self, request: &UpdateRecordRequest) -> Result<(), ApiError> {
        let ack: AckResponse = self.post(UPDATE_RECORD_PATH, request)?;
        if !ack.success {
            return Err(ApiError::rejected(ack.error));
        }
        Ok(())
    }
}

impl CourseSource for DashboardClient {
    fn get_course_data(&self) -> Result<Vec<Course>, ApiError> {
        let response: CourseDataResponse = self.get(COURSE_DATA_PATH)?;
        if !response.success {
            return Err(ApiError::rejected(response.error));
        }
        Ok(response.courses)
    }
}

impl ChangeChecker for DashboardClient {
    fn check_change(&self, record_id: RecordId) -> Result<ChangeCheck, ApiError> {
        let response: CheckChangeResponse =
            self.post(CHECK_CHANGE_PATH, &CheckChangeRequest { record_id })?;
        if !response.success {
            return Err(ApiError::rejected(response.error));
        }
        Ok(ChangeCheck {
            is_exit: response.is_exit,
            has_change: response.has_change,
        })
    }
}

/// Decode a JSON body; error statuses with an undecodable body become `Status`.
fn decode_body<R: DeserializeOwned>(status: StatusCode, body: &str) -> Result<R, ApiError> {
    match serde_json::from_str::<R>(body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(ApiError::Status(status.as_u16())),
        Err(err) => Err(ApiError::InvalidResponse(err.to_string())),
    }
}
