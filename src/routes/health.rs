use std::time::Instant;

use actix_web::{get, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::Serialize;

lazy_static! {
    static ref STARTED: Instant = Instant::now();
}

/// Liveness report. Does not touch the store or the cache.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    pub fn now() -> Self {
        Self {
            status: "ok",
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            uptime_secs: STARTED.elapsed().as_secs(),
            timestamp: Utc::now(),
        }
    }
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthReport::now())
}
