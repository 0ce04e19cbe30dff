use serde::{Deserialize, Serialize};

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Location of the incident as far as it is known
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    /// Full address, from geocoding or from the analysis output
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Raw candidate text or a nearby landmark
    #[serde(default)]
    pub landmark: Option<String>,
    /// True only once a geocoding lookup has confirmed the location
    #[serde(default)]
    pub verified: bool,
}

impl LocationInfo {
    /// Unverified location carrying only the raw candidate text
    pub fn unverified(candidate: impl Into<String>) -> Self {
        Self {
            landmark: Some(candidate.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.coordinates.is_none() && self.landmark.is_none()
    }
}
