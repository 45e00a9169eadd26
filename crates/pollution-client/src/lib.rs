//! HTTP client for the pollution data services.
//!
//! Exposes [`PollutionService`], the async seam the synchronizer core
//! consumes, and [`PollutionClient`], its reqwest implementation covering
//! every collaborator endpoint: axis metadata, raster images, dataset
//! management, uploads, and the auth/user passthrough.

mod auth;
mod client;
mod service;
mod types;
mod upload;

pub use client::{ClientConfig, PollutionClient};
pub use service::PollutionService;
pub use types::{NewUser, Session, UserRecord};
