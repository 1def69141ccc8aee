use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Business-wide settings. The setup flag lives here, server-side, and gates
/// the admin mutation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub business_name: String,
    pub setup_complete: bool,
    pub setup_completed_at: Option<NaiveDateTime>,
}
