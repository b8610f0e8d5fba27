use crate::core::surface::GeoPos;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Motion state reported by the simulator for one aircraft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AircraftState {
    Stop,
    Moving,
    Hold,
    Flying,
    #[serde(other)]
    Unknown,
}

/// One target node of an aircraft's itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryTarget {
    pub node_name: String,
    pub node_location: GeoPos,
}

/// One aircraft at one simulated instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftRecord {
    pub callsign: String,
    pub state: AircraftState,
    #[serde(default)]
    pub is_delayed: bool,
    pub location: GeoPos,
    #[serde(default)]
    pub itinerary: Option<Vec<ItineraryTarget>>,
    #[serde(default)]
    pub itinerary_index: Option<usize>,
    #[serde(default)]
    pub uncertainty_delayed_index: Option<Vec<usize>>,
    #[serde(default)]
    pub scheduler_delayed_index: Option<Vec<usize>>,
}

/// One simulated instant: a wall-clock time and every aircraft on the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub time: NaiveTime,
    #[serde(default)]
    pub aircrafts: Vec<AircraftRecord>,
}

impl StateSnapshot {
    pub fn aircraft(&self, callsign: &str) -> Option<&AircraftRecord> {
        self.aircrafts.iter().find(|a| a.callsign == callsign)
    }

    /// Time formatted the way the simulator logs it
    pub fn time_label(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_logged_state() {
        let json = r#"{
            "time": "08:00:05",
            "aircrafts": [{
                "callsign": "UA123",
                "state": "moving",
                "is_delayed": false,
                "location": {"lat": 37.61, "lng": -122.38},
                "itinerary": [{"node_name": "S1", "node_location": {"lat": 37.6, "lng": -122.37}}],
                "itinerary_index": 0,
                "uncertainty_delayed_index": [],
                "scheduler_delayed_index": [0]
            }, {
                "callsign": "AA9",
                "state": "stop",
                "location": {"lat": 37.62, "lng": -122.39},
                "itinerary": null,
                "itinerary_index": null
            }]
        }"#;

        let state: StateSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(state.time_label(), "08:00:05");
        assert_eq!(state.aircrafts.len(), 2);

        let ua = state.aircraft("UA123").unwrap();
        assert_eq!(ua.state, AircraftState::Moving);
        assert_eq!(ua.scheduler_delayed_index, Some(vec![0]));

        let aa = state.aircraft("AA9").unwrap();
        assert_eq!(aa.state, AircraftState::Stop);
        assert!(!aa.is_delayed);
        assert!(aa.itinerary.is_none());
    }

    #[test]
    fn test_unrecognized_state_is_unknown() {
        let state: AircraftState = serde_json::from_str("\"taxiing\"").unwrap();
        assert_eq!(state, AircraftState::Unknown);
    }
}
