use crate::core::{GeoPos, StateSnapshot};
use crate::view::heading::{bearing_degrees, is_close};
use crate::view::traffic::TrafficStatus;
use std::collections::HashMap;

/// Last known display state of one aircraft
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedAircraft {
    pub position: GeoPos,
    /// Degrees clockwise from north
    pub heading: f64,
    pub status: TrafficStatus,
}

/// Callsigns that appeared, moved or left between two snapshots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerUpdate {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

/// Follows aircraft across snapshots to keep markers and headings stable
#[derive(Debug, Default)]
pub struct AircraftTracker {
    aircraft: HashMap<String, TrackedAircraft>,
}

impl AircraftTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, callsign: &str) -> Option<&TrackedAircraft> {
        self.aircraft.get(callsign)
    }

    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }

    pub fn clear(&mut self) {
        self.aircraft.clear();
    }

    /// Apply a snapshot
    ///
    /// A moved aircraft faces its direction of travel. One that did not move
    /// keeps its previous heading, and a new one faces north.
    pub fn update(&mut self, state: &StateSnapshot) -> TrackerUpdate {
        let mut previous = std::mem::take(&mut self.aircraft);
        let mut update = TrackerUpdate::default();

        for record in &state.aircrafts {
            let status = TrafficStatus::of(record);
            let tracked = match previous.remove(&record.callsign) {
                Some(old) => {
                    let heading = if is_close(old.position, record.location) {
                        old.heading
                    } else {
                        bearing_degrees(old.position, record.location)
                    };
                    update.updated.push(record.callsign.clone());
                    TrackedAircraft { position: record.location, heading, status }
                }
                None => {
                    update.added.push(record.callsign.clone());
                    TrackedAircraft { position: record.location, heading: 0.0, status }
                }
            };
            self.aircraft.insert(record.callsign.clone(), tracked);
        }

        update.removed = previous.into_keys().collect();
        update.removed.sort();
        update
    }
}
