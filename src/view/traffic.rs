use crate::core::{AircraftRecord, AircraftState, ItineraryTarget, StateSnapshot};
use std::fmt;

/// Status shown for an aircraft in the traffic table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficStatus {
    /// Parked without a schedule
    NoSchedule,
    /// Held back by the scheduler
    Hold,
    Moving,
}

impl TrafficStatus {
    pub fn of(aircraft: &AircraftRecord) -> Self {
        if aircraft.state == AircraftState::Stop {
            TrafficStatus::NoSchedule
        } else if aircraft.is_delayed {
            TrafficStatus::Hold
        } else {
            TrafficStatus::Moving
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrafficStatus::NoSchedule => "No Schedule",
            TrafficStatus::Hold => "Hold",
            TrafficStatus::Moving => "Moving",
        }
    }
}

/// Aircraft counts of one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrafficSummary {
    pub total: usize,
    pub on_hold: usize,
}

impl TrafficSummary {
    pub fn of(state: &StateSnapshot) -> Self {
        let on_hold = state
            .aircrafts
            .iter()
            .filter(|a| TrafficStatus::of(a) == TrafficStatus::Hold)
            .count();

        Self {
            total: state.aircrafts.len(),
            on_hold,
        }
    }
}

impl fmt::Display for TrafficSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} aircraft on the surface. {} on hold.", self.total, self.on_hold)
    }
}

/// Where an itinerary target lies relative to the aircraft's progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetProgress {
    Past,
    Current,
    Future,
}

/// One itinerary target annotated for display
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryStep<'a> {
    pub target: &'a ItineraryTarget,
    pub progress: TargetProgress,
    pub uncertainty_delayed: bool,
    pub scheduler_delayed: bool,
}

/// Annotate each itinerary target, or `None` if the aircraft has no itinerary
pub fn itinerary_progress(aircraft: &AircraftRecord) -> Option<Vec<ItineraryStep<'_>>> {
    let targets = aircraft.itinerary.as_ref()?;
    let current = aircraft.itinerary_index.unwrap_or(0);
    let flagged = |indices: &Option<Vec<usize>>, i: usize| indices.as_ref().is_some_and(|v| v.contains(&i));

    let steps = targets
        .iter()
        .enumerate()
        .map(|(i, target)| ItineraryStep {
            target,
            progress: match i.cmp(&current) {
                std::cmp::Ordering::Less => TargetProgress::Past,
                std::cmp::Ordering::Equal => TargetProgress::Current,
                std::cmp::Ordering::Greater => TargetProgress::Future,
            },
            uncertainty_delayed: flagged(&aircraft.uncertainty_delayed_index, i),
            scheduler_delayed: flagged(&aircraft.scheduler_delayed_index, i),
        })
        .collect();

    Some(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GeoPos;
    use chrono::NaiveTime;

    fn aircraft(callsign: &str, state: AircraftState, is_delayed: bool) -> AircraftRecord {
        AircraftRecord {
            callsign: callsign.to_string(),
            state,
            is_delayed,
            location: GeoPos::new(0.0, 0.0),
            itinerary: None,
            itinerary_index: None,
            uncertainty_delayed_index: None,
            scheduler_delayed_index: None,
        }
    }

    #[test]
    fn test_status_precedence() {
        assert_eq!(TrafficStatus::of(&aircraft("A", AircraftState::Stop, true)), TrafficStatus::NoSchedule);
        assert_eq!(TrafficStatus::of(&aircraft("B", AircraftState::Moving, true)), TrafficStatus::Hold);
        assert_eq!(TrafficStatus::of(&aircraft("C", AircraftState::Hold, false)), TrafficStatus::Moving);
        assert_eq!(TrafficStatus::Hold.label(), "Hold");
    }

    #[test]
    fn test_summary_counts_only_holds() {
        let state = StateSnapshot {
            time: NaiveTime::default(),
            aircrafts: vec![
                aircraft("A", AircraftState::Stop, true),
                aircraft("B", AircraftState::Moving, true),
                aircraft("C", AircraftState::Moving, false),
            ],
        };
        let summary = TrafficSummary::of(&state);
        assert_eq!(summary, TrafficSummary { total: 3, on_hold: 1 });
        assert_eq!(summary.to_string(), "3 aircraft on the surface. 1 on hold.");
    }

    #[test]
    fn test_itinerary_progress() {
        let target = |name: &str| ItineraryTarget {
            node_name: name.to_string(),
            node_location: GeoPos::new(0.0, 0.0),
        };
        let mut record = aircraft("A", AircraftState::Moving, false);
        assert!(itinerary_progress(&record).is_none());

        record.itinerary = Some(vec![target("G1"), target("S1"), target("RWY")]);
        record.itinerary_index = Some(1);
        record.scheduler_delayed_index = Some(vec![2]);

        let steps = itinerary_progress(&record).unwrap();
        let progress: Vec<_> = steps.iter().map(|s| s.progress).collect();
        assert_eq!(progress, vec![TargetProgress::Past, TargetProgress::Current, TargetProgress::Future]);
        assert!(steps[2].scheduler_delayed);
        assert!(!steps[2].uncertainty_delayed);
        assert_eq!(steps[0].target.node_name, "G1");
    }
}
