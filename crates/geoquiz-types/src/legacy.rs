use serde::{Deserialize, Serialize};

/// One entry of a game in the legacy `photos.json` document.
///
/// The document itself is an array of games, each an array of these entries.
/// It is only ever read, once, by the importer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyPhoto {
    pub image: String,
    pub location: Vec<f64>,
}
