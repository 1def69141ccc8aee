use std::env;

use chrono::{FixedOffset, NaiveDateTime, Offset, Utc};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub email_api_url: String,
    pub email_api_key: String,
    pub email_from: String,
    pub business_name: String,
    /// Offset of the business location from UTC. Booking dates and times are
    /// stored in this local time and "today" is computed against it.
    pub business_utc_offset_minutes: i32,
    pub retention_days: i64,
    pub sweep_interval_minutes: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "salonbook.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            email_api_url: env::var("EMAIL_API_URL")
                .unwrap_or_else(|_| "https://api.resend.com/emails".to_string()),
            email_api_key: env::var("EMAIL_API_KEY").unwrap_or_default(),
            email_from: env::var("EMAIL_FROM").unwrap_or_default(),
            business_name: env::var("BUSINESS_NAME").unwrap_or_default(),
            business_utc_offset_minutes: env::var("BUSINESS_UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            retention_days: env::var("RETENTION_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|d: &i64| *d >= 0)
                .unwrap_or(crate::services::lifecycle::DEFAULT_RETENTION_DAYS),
            sweep_interval_minutes: env::var("SWEEP_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
        }
    }

    pub fn business_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.business_utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| {
            tracing::warn!(
                offset = self.business_utc_offset_minutes,
                "business UTC offset out of range, using UTC"
            );
            Utc.fix()
        })
    }

    /// Current wall-clock time at the business location.
    pub fn business_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.business_offset()).naive_local()
    }
}
