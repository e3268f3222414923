use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Totales del sitio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteStats {
    pub trigs: i64,
    pub logs: i64,
    pub photos: i64,
    pub users: i64,
    pub generated_at: DateTime<Utc>,
}
