//! Wire payloads for the pollution services.

use serde::{Deserialize, Serialize};

use viewer_common::{GeoBounds, TimeInfo};

/// Bounds service payload.
#[derive(Debug, Deserialize)]
pub(crate) struct BoundsPayload {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl From<BoundsPayload> for GeoBounds {
    fn from(p: BoundsPayload) -> Self {
        GeoBounds::new(p.lat_min, p.lat_max, p.lon_min, p.lon_max)
    }
}

/// Time service payload.
#[derive(Debug, Deserialize)]
pub(crate) struct TimePayload {
    pub time: String,
    pub max_time_index: u32,
}

impl From<TimePayload> for TimeInfo {
    fn from(p: TimePayload) -> Self {
        TimeInfo {
            label: p.time,
            max_time_index: p.max_time_index,
        }
    }
}

/// Dataset-switch request body.
#[derive(Debug, Serialize)]
pub(crate) struct SwitchRequest<'a> {
    pub dataset: &'a str,
}

/// Upload service payload.
#[derive(Debug, Deserialize)]
pub(crate) struct UploadPayload {
    pub ok: bool,
    #[serde(default)]
    pub dataset: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Login request body.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub login: &'a str,
    pub password: &'a str,
}

/// An authenticated session as reported by the auth service.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub name: String,
    pub role: String,
}

/// User creation request for the user CRUD passthrough.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub login: String,
    pub password: String,
    pub role: String,
}

/// A user record as listed by the user service.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub name: String,
    pub login: String,
    pub role: String,
}
