pub mod extract;
pub mod geocode;

pub use extract::*;
pub use geocode::*;

use tracing::{debug, warn};

use crate::error::TriageError;
use crate::models::{Coordinates, LocationInfo};

/// Extract a candidate from the transcript and try to enrich it.
/// Returns `None` when the transcript has no location-like phrase.
pub async fn locate(geocoder: &dyn Geocoder, transcript: &str) -> Option<LocationInfo> {
    let candidate = extract_location_candidate(transcript)?;
    Some(resolve_location(geocoder, &candidate).await)
}

/// Geocode a candidate. Only a successful lookup marks the location verified;
/// failures leave the raw candidate as an unverified landmark.
pub async fn resolve_location(geocoder: &dyn Geocoder, candidate: &str) -> LocationInfo {
    let result = geocoder.geocode(candidate).await;

    if !result.success {
        let err = TriageError::EnrichmentFailed(
            result.error.unwrap_or_else(|| "no result".to_string()),
        );
        warn!("Location {:?} left unverified: {}", candidate, err);
        return LocationInfo::unverified(candidate);
    }

    debug!("Geocoded {:?} to {:?}", candidate, result.formatted_address);
    let coordinates = match (result.lat, result.lon) {
        (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
        _ => None,
    };

    LocationInfo {
        address: result.formatted_address.or_else(|| Some(candidate.to_string())),
        coordinates,
        landmark: Some(candidate.to_string()),
        verified: true,
    }
}

/// Fold the address/postcode reported by an analysis stage into the scanned
/// location. `verified` is left as the geocoder set it.
pub fn merge_reported_location(
    location: Option<LocationInfo>,
    address: Option<&str>,
    postcode: Option<&str>,
) -> Option<LocationInfo> {
    let address = address.map(str::trim).filter(|a| !a.is_empty());
    let postcode = postcode.map(str::trim).filter(|p| !p.is_empty());

    if address.is_none() && postcode.is_none() {
        return location;
    }

    let mut location = location.unwrap_or_default();

    let combined = match (address, postcode) {
        (Some(a), Some(p)) if !a.to_lowercase().contains(&p.to_lowercase()) => {
            Some(format!("{}, {}", a, p))
        }
        (Some(a), _) => Some(a.to_string()),
        (None, Some(p)) => match &location.address {
            Some(existing) if existing.to_lowercase().contains(&p.to_lowercase()) => None,
            Some(existing) => Some(format!("{}, {}", existing, p)),
            None => Some(p.to_string()),
        },
        (None, None) => None,
    };
    if let Some(combined) = combined {
        location.address = Some(combined);
    }

    if location
        .landmark
        .as_deref()
        .is_some_and(landmark_looks_unreliable)
    {
        location.landmark = None;
    }

    Some(location)
}

/// Placeholder echoes or fragments too short to be a real place
pub fn landmark_looks_unreliable(landmark: &str) -> bool {
    let lower = landmark.trim().to_lowercase();
    lower.chars().count() <= 5
        || ["landmark", "unknown", "n/a", "not provided"]
            .iter()
            .any(|p| lower.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_success_marks_verified() {
        let geocoder = FixedGeocoder::new(GeocodeResult::found(
            "West High School, 123 Main St".to_string(),
            39.12,
            -84.56,
        ));
        let location = resolve_location(&geocoder, "West High School").await;

        assert!(location.verified);
        assert_eq!(location.address.as_deref(), Some("West High School, 123 Main St"));
        assert_eq!(location.landmark.as_deref(), Some("West High School"));
        assert_eq!(location.coordinates, Some(Coordinates { lat: 39.12, lon: -84.56 }));
    }

    #[tokio::test]
    async fn test_resolve_failure_leaves_unverified() {
        let geocoder = FixedGeocoder::new(GeocodeResult::failed("rate limited"));
        let location = resolve_location(&geocoder, "the old mill").await;

        assert!(!location.verified);
        assert_eq!(location.landmark.as_deref(), Some("the old mill"));
        assert!(location.address.is_none());
    }

    #[tokio::test]
    async fn test_locate_without_candidate_skips_lookup() {
        let geocoder = FixedGeocoder::new(GeocodeResult::failed("unused"));
        assert!(locate(&geocoder, "Caller: help me").await.is_none());
        assert!(geocoder.lookups().is_empty());
    }

    #[test]
    fn test_merge_address_overrides_scan() {
        let scanned = LocationInfo::unverified("the corner shop");
        let merged =
            merge_reported_location(Some(scanned), Some("3 Davis Street, London"), None).unwrap();

        assert_eq!(merged.address.as_deref(), Some("3 Davis Street, London"));
        assert_eq!(merged.landmark.as_deref(), Some("the corner shop"));
        assert!(!merged.verified);
    }

    #[test]
    fn test_merge_postcode_appended_and_bad_landmark_dropped() {
        let scanned = LocationInfo::unverified("landmark");
        let merged =
            merge_reported_location(Some(scanned), Some("3 Davis Street"), Some("E13 9EE")).unwrap();

        assert_eq!(merged.address.as_deref(), Some("3 Davis Street, E13 9EE"));
        assert!(merged.landmark.is_none());
    }

    #[test]
    fn test_merge_keeps_verified_flag() {
        let verified = LocationInfo {
            address: Some("10 Downing St, London SW1A 2AA".to_string()),
            landmark: Some("Downing Street".to_string()),
            verified: true,
            ..Default::default()
        };
        let merged = merge_reported_location(Some(verified), None, Some("SW1A 2AA")).unwrap();

        assert!(merged.verified);
        assert_eq!(merged.address.as_deref(), Some("10 Downing St, London SW1A 2AA"));
    }

    #[test]
    fn test_merge_nothing_reported() {
        assert_eq!(merge_reported_location(None, None, Some("  ")), None);
        let merged = merge_reported_location(None, None, Some("E13 9EE")).unwrap();
        assert_eq!(merged.address.as_deref(), Some("E13 9EE"));
    }
}
