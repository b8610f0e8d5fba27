use crate::backend::PlaybackBackend;
use crate::core::{
    AircraftRecord, AircraftState, DeliveryMode, GeoPos, ItineraryTarget, NamedPoint, SimulationDataset,
    SourceId, StateSnapshot, SurfaceDescription, SurfacePath,
};
use crate::error::{PlaybackError, PlaybackResult};
use async_trait::async_trait;
use chrono::{Duration, NaiveTime};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Name of the plan served by `MockBackend::demo`
pub const DEMO_PLAN: &str = "simple";

struct MockPlan {
    surface: SurfaceDescription,
    states: Vec<StateSnapshot>,
}

/// Position of one streaming run within its plan
struct MockRun {
    plan: String,
    produced: usize,
}

/// In-memory backend for testing and offline playback
///
/// Every plan is offered in both delivery modes. Streaming runs hand out the
/// plan's states in order and report exhaustion with an empty chunk.
#[derive(Default)]
pub struct MockBackend {
    plans: BTreeMap<String, MockPlan>,
    runs: Mutex<HashMap<SourceId, MockRun>>,
    next_run_id: AtomicI64,
    /// Cap on states returned by one continuation, if any
    chunk_limit: Option<usize>,
    plan_listing_down: AtomicBool,
    fail_next_chunk: AtomicBool,
    batch_fetches: AtomicUsize,
    runs_started: AtomicUsize,
    chunk_fetches: AtomicUsize,
    last_chunk_steps: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend serving one generated plan of `DEMO_PLAN`
    pub fn demo(state_count: usize) -> Self {
        Self::new().with_plan(DEMO_PLAN, sample_surface(), sample_states(state_count))
    }

    pub fn with_plan(mut self, plan: &str, surface: SurfaceDescription, states: Vec<StateSnapshot>) -> Self {
        self.plans.insert(plan.to_string(), MockPlan { surface, states });
        self
    }

    pub fn with_chunk_limit(mut self, limit: usize) -> Self {
        self.chunk_limit = Some(limit);
        self
    }

    /// Make plan listing fail until re-enabled
    pub fn set_plan_listing_available(&self, available: bool) {
        self.plan_listing_down.store(!available, Ordering::SeqCst);
    }

    /// Make the next continuation fetch fail
    pub fn fail_next_chunk(&self) {
        self.fail_next_chunk.store(true, Ordering::SeqCst);
    }

    pub fn batch_fetch_count(&self) -> usize {
        self.batch_fetches.load(Ordering::SeqCst)
    }

    pub fn runs_started(&self) -> usize {
        self.runs_started.load(Ordering::SeqCst)
    }

    pub fn chunk_fetch_count(&self) -> usize {
        self.chunk_fetches.load(Ordering::SeqCst)
    }

    /// `steps` argument of the most recent continuation fetch
    pub fn last_chunk_steps(&self) -> usize {
        self.last_chunk_steps.load(Ordering::SeqCst)
    }

    fn plan(&self, plan: &str) -> Option<&MockPlan> {
        self.plans.get(plan)
    }

    fn runs(&self) -> MutexGuard<'_, HashMap<SourceId, MockRun>> {
        self.runs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PlaybackBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_plans(&self, _mode: DeliveryMode) -> PlaybackResult<Vec<String>> {
        if self.plan_listing_down.load(Ordering::SeqCst) {
            return Err(PlaybackError::PlanListUnavailable("Mock plan listing is down".to_string()));
        }
        Ok(self.plans.keys().cloned().collect())
    }

    async fn fetch_batch_dataset(&self, plan: &str) -> PlaybackResult<SimulationDataset> {
        self.batch_fetches.fetch_add(1, Ordering::SeqCst);
        let found = self
            .plan(plan)
            .ok_or_else(|| PlaybackError::DatasetLoadFailed(format!("Plan {} not found", plan)))?;

        Ok(SimulationDataset {
            surface: found.surface.clone(),
            states: found.states.clone(),
            source_id: None,
        })
    }

    async fn start_streaming_run(&self, plan: &str, steps: usize) -> PlaybackResult<SimulationDataset> {
        self.runs_started.fetch_add(1, Ordering::SeqCst);
        let found = self
            .plan(plan)
            .ok_or_else(|| PlaybackError::DatasetLoadFailed(format!("Plan {} not found", plan)))?;

        let produced = steps.min(found.states.len());
        let id = self.next_run_id.fetch_add(1, Ordering::SeqCst);
        self.runs().insert(
            id,
            MockRun {
                plan: plan.to_string(),
                produced,
            },
        );

        Ok(SimulationDataset {
            surface: found.surface.clone(),
            states: found.states[..produced].to_vec(),
            source_id: Some(id),
        })
    }

    async fn fetch_streaming_chunk(
        &self,
        _plan: &str,
        source_id: SourceId,
        steps: usize,
    ) -> PlaybackResult<Vec<StateSnapshot>> {
        self.chunk_fetches.fetch_add(1, Ordering::SeqCst);
        self.last_chunk_steps.store(steps, Ordering::SeqCst);

        if self.fail_next_chunk.swap(false, Ordering::SeqCst) {
            return Err(PlaybackError::StreamingFetchFailed("Simulator crashed".to_string()));
        }

        let mut runs = self.runs();
        let run = runs
            .get_mut(&source_id)
            .ok_or_else(|| PlaybackError::StreamingFetchFailed(format!("Unknown simulator id {}", source_id)))?;
        let states = match self.plans.get(&run.plan) {
            Some(plan) => &plan.states,
            None => return Ok(Vec::new()),
        };

        let limit = self.chunk_limit.unwrap_or(usize::MAX);
        let count = steps.min(limit).min(states.len() - run.produced);
        let chunk = states[run.produced..run.produced + count].to_vec();
        run.produced += count;
        Ok(chunk)
    }
}

/// A small single-runway airport
pub fn sample_surface() -> SurfaceDescription {
    SurfaceDescription {
        airport_name: "Simple Airport".to_string(),
        airport_center: GeoPos::new(37.4088, -122.0644),
        gates: vec![
            NamedPoint { name: "G1".to_string(), lat: 37.4090, lng: -122.0650 },
            NamedPoint { name: "G2".to_string(), lat: 37.4092, lng: -122.0648 },
        ],
        spots: vec![NamedPoint { name: "S1".to_string(), lat: 37.4085, lng: -122.0645 }],
        runways: vec![SurfacePath {
            name: Some("10/28".to_string()),
            nodes: vec![GeoPos::new(37.4080, -122.0700), GeoPos::new(37.4080, -122.0600)],
        }],
        taxiways: vec![SurfacePath {
            name: Some("A".to_string()),
            nodes: vec![GeoPos::new(37.4085, -122.0645), GeoPos::new(37.4080, -122.0645)],
        }],
        pushback_ways: vec![SurfacePath {
            name: None,
            nodes: vec![GeoPos::new(37.4090, -122.0650), GeoPos::new(37.4085, -122.0645)],
        }],
    }
}

/// `count` one-second states: one aircraft taxiing east, one holding at its gate
pub fn sample_states(count: usize) -> Vec<StateSnapshot> {
    let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default();
    let spot = GeoPos::new(37.4085, -122.0645);

    (0..count)
        .map(|i| {
            let taxiing = AircraftRecord {
                callsign: "DEMO1".to_string(),
                state: AircraftState::Moving,
                is_delayed: false,
                location: GeoPos::new(37.4080, -122.0700 + i as f64 * 0.0001),
                itinerary: Some(vec![
                    ItineraryTarget { node_name: "S1".to_string(), node_location: spot },
                    ItineraryTarget { node_name: "10/28".to_string(), node_location: GeoPos::new(37.4080, -122.0600) },
                ]),
                itinerary_index: Some(if i < count / 2 { 0 } else { 1 }),
                uncertainty_delayed_index: Some(Vec::new()),
                scheduler_delayed_index: Some(Vec::new()),
            };
            let holding = AircraftRecord {
                callsign: "DEMO2".to_string(),
                state: AircraftState::Hold,
                is_delayed: true,
                location: GeoPos::new(37.4090, -122.0650),
                itinerary: None,
                itinerary_index: None,
                uncertainty_delayed_index: None,
                scheduler_delayed_index: None,
            };

            StateSnapshot {
                time: start + Duration::seconds(i as i64),
                aircrafts: vec![taxiing, holding],
            }
        })
        .collect()
}
