use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every quiz owns exactly this many photos.
pub const PHOTOS_PER_QUIZ: usize = 5;

/// A latitude/longitude pair. Travels on the wire as `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl From<[f64; 2]> for Location {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<Location> for [f64; 2] {
    fn from(loc: Location) -> Self {
        [loc.lat, loc.lon]
    }
}

/// Which attribution scheme a deployment runs with. Never both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributionMode {
    /// Quizzes are owned by user accounts; every call carries a session token.
    Authenticated,
    /// Quizzes carry a free-text creator name; no accounts, no ownership checks.
    Anonymous,
}

impl std::str::FromStr for AttributionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "authenticated" | "auth" => Ok(Self::Authenticated),
            "anonymous" | "anon" => Ok(Self::Anonymous),
            other => Err(format!("unknown attribution mode '{other}'")),
        }
    }
}

/// Quiz listing entry, without photo detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoView {
    pub id: i64,
    pub image: String,
    pub location: Location,
}
