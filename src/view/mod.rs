//! Render-independent derivations over snapshots
//!
//! Everything a map or table view needs beyond the raw snapshot, computed
//! without any knowledge of the drawing technology.

pub mod heading;
pub mod tracker;
pub mod traffic;

pub use heading::{bearing_degrees, icon_rotation, is_close};
pub use tracker::{AircraftTracker, TrackedAircraft, TrackerUpdate};
pub use traffic::{itinerary_progress, ItineraryStep, TargetProgress, TrafficStatus, TrafficSummary};
