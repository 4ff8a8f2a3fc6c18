//! Venue layout loading.
//!
//! The layout document is the purchase service's own `venues.yml`:
//!
//! ```yaml
//! venues:
//!   map:
//!     Venue1:
//!       zones:
//!         zone-count: 10
//!         row-count: 26
//!         col-count: 30
//! ```
//!
//! Only the three counts of one venue are extracted; everything else in the
//! document is ignored. Missing counts default to 0. Rejecting a zero-zone
//! layout is the lifecycle controller's job, not the loader's.

use crate::error::LayoutError;
use crate::types::{VenueId, VenueLayout};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Source of venue layouts.
pub trait VenueLayoutLoader: Send + Sync {
    /// Load the layout of `venue_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the document is missing, unreadable,
    /// malformed, or has no entry for the venue.
    fn load(&self, venue_id: &VenueId) -> Result<VenueLayout, LayoutError>;
}

/// Loads layouts from a YAML document on disk.
#[derive(Debug, Clone)]
pub struct YamlVenueLoader {
    path: PathBuf,
}

impl YamlVenueLoader {
    /// Loader for the document at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VenueLayoutLoader for YamlVenueLoader {
    fn load(&self, venue_id: &VenueId) -> Result<VenueLayout, LayoutError> {
        let document = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LayoutError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                LayoutError::Unreadable {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        let layout = parse_layout(&document, venue_id, &self.path)?;
        tracing::debug!(
            venue_id = %venue_id,
            path = %self.path.display(),
            %layout,
            "Venue layout loaded"
        );
        Ok(layout)
    }
}

/// A fixed layout, for runs that do not read a document.
impl VenueLayoutLoader for VenueLayout {
    fn load(&self, _venue_id: &VenueId) -> Result<VenueLayout, LayoutError> {
        Ok(*self)
    }
}

/// Extract one venue's layout from a YAML document.
///
/// `path` is only used for error messages.
///
/// # Errors
///
/// Returns [`LayoutError::Malformed`] if the text is not a YAML document of the
/// expected shape, [`LayoutError::VenueMissing`] if the venue has no entry.
pub fn parse_layout(
    document: &str,
    venue_id: &VenueId,
    path: &Path,
) -> Result<VenueLayout, LayoutError> {
    let parsed: VenuesDocument =
        serde_yaml::from_str(document).map_err(|source| LayoutError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    let entry = parsed
        .venues
        .unwrap_or_default()
        .map
        .unwrap_or_default()
        .remove(venue_id.as_str())
        .flatten()
        .ok_or_else(|| LayoutError::VenueMissing {
            venue_id: venue_id.to_string(),
            path: path.to_path_buf(),
        })?;

    let zones = entry.zones.unwrap_or_default();
    Ok(VenueLayout::new(
        zones.zone_count,
        zones.row_count,
        zones.col_count,
    ))
}

#[derive(Debug, Deserialize)]
struct VenuesDocument {
    #[serde(default)]
    venues: Option<VenuesSection>,
}

#[derive(Debug, Default, Deserialize)]
struct VenuesSection {
    #[serde(default)]
    map: Option<HashMap<String, Option<VenueEntry>>>,
}

#[derive(Debug, Default, Deserialize)]
struct VenueEntry {
    #[serde(default)]
    zones: Option<ZonesEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ZonesEntry {
    #[serde(default)]
    zone_count: u32,
    #[serde(default)]
    row_count: u32,
    #[serde(default)]
    col_count: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r"
venues:
  map:
    Venue1:
      zones:
        zone-count: 10
        row-count: 26
        col-count: 30
    Venue2:
      zones:
        zone-count: 2
    Venue3:
      capacity-note: standing only
    Venue4:
spring:
  application:
    name: PurchaseService
";

    fn parse(venue: &str) -> Result<VenueLayout, LayoutError> {
        parse_layout(DOCUMENT, &VenueId::new(venue), Path::new("venues.yml"))
    }

    #[test]
    fn extracts_the_three_counts() {
        assert_eq!(parse("Venue1").unwrap(), VenueLayout::new(10, 26, 30));
    }

    #[test]
    fn missing_counts_default_to_zero() {
        assert_eq!(parse("Venue2").unwrap(), VenueLayout::new(2, 0, 0));
        assert_eq!(parse("Venue3").unwrap(), VenueLayout::new(0, 0, 0));
    }

    #[test]
    fn absent_or_null_venue_is_missing() {
        assert!(matches!(
            parse("Venue9"),
            Err(LayoutError::VenueMissing { venue_id, .. }) if venue_id == "Venue9"
        ));
        assert!(matches!(parse("Venue4"), Err(LayoutError::VenueMissing { .. })));
    }

    #[test]
    fn document_without_venues_section_is_missing_venue() {
        let result = parse_layout("spring: {}\n", &VenueId::new("Venue1"), Path::new("x.yml"));
        assert!(matches!(result, Err(LayoutError::VenueMissing { .. })));
    }

    #[test]
    fn malformed_document_is_rejected() {
        let result = parse_layout(
            "venues: [unclosed",
            &VenueId::new("Venue1"),
            Path::new("x.yml"),
        );
        assert!(matches!(result, Err(LayoutError::Malformed { .. })));
    }

    #[test]
    fn negative_counts_are_malformed() {
        let document = "venues:\n  map:\n    Venue1:\n      zones:\n        zone-count: -1\n";
        let result = parse_layout(document, &VenueId::new("Venue1"), Path::new("x.yml"));
        assert!(matches!(result, Err(LayoutError::Malformed { .. })));
    }

    #[test]
    fn fixed_layout_loads_itself() {
        let layout = VenueLayout::new(1, 2, 2);
        assert_eq!(layout.load(&VenueId::new("any")).unwrap(), layout);
    }
}
