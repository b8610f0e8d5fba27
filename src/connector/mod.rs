//! Playback data connectors
//!
//! A connector owns the playback position within one plan's state sequence
//! and hides whether that sequence was fetched whole (batch) or grows on
//! demand from a running simulator (streaming).

pub mod batch;
pub mod cursor;
pub mod streaming;

pub use batch::BatchDataConnector;
pub use cursor::PlaybackCursor;
pub use streaming::StreamingDataConnector;

use crate::backend::PlaybackBackend;
use crate::core::{DeliveryMode, SimulationDataset, StateSnapshot, SurfaceDescription};
use crate::error::{PlaybackError, PlaybackResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Navigation over a plan's state sequence
///
/// Nothing but `initialize` and the metadata accessors may be used before
/// `initialize` has completed successfully. Navigation calls must be
/// serialized: await one before issuing the next.
#[async_trait]
pub trait PlaybackDataConnector: Send {
    /// Plan this connector plays
    fn plan(&self) -> &str;

    fn mode(&self) -> DeliveryMode;

    /// Whether `initialize` has completed successfully
    fn is_ready(&self) -> bool;

    /// Current cursor, if initialized
    fn cursor(&self) -> Option<PlaybackCursor>;

    /// Whether moving forward can no longer yield a different state
    fn at_end(&self) -> bool;

    /// Load the initial data; navigation is unavailable until this succeeds
    async fn initialize(&mut self) -> PlaybackResult<()>;

    /// Move forward by `step_size` states and return the new current state
    async fn advance(&mut self, step_size: usize) -> PlaybackResult<StateSnapshot>;

    /// Move backward by `step_size` states and return the new current state
    async fn retreat(&mut self, step_size: usize) -> PlaybackResult<StateSnapshot>;

    /// State at the cursor
    fn current_state(&self) -> PlaybackResult<&StateSnapshot>;

    /// Static airport geometry
    fn surface_data(&self) -> PlaybackResult<&SurfaceDescription>;

    /// Step forward by one state
    async fn step_forward(&mut self) -> PlaybackResult<StateSnapshot> {
        self.advance(1).await
    }

    /// Step back by one state
    async fn step_back(&mut self) -> PlaybackResult<StateSnapshot> {
        self.retreat(1).await
    }
}

/// A dataset together with the cursor walking it
#[derive(Debug)]
pub(crate) struct LoadedDataset {
    pub dataset: SimulationDataset,
    pub cursor: PlaybackCursor,
}

impl LoadedDataset {
    /// Wrap a freshly loaded dataset, rejecting one without states
    pub fn new(plan: &str, dataset: SimulationDataset) -> PlaybackResult<Self> {
        if dataset.is_empty() {
            return Err(PlaybackError::DatasetLoadFailed(format!("Plan {} has no states", plan)));
        }
        let cursor = PlaybackCursor::new(dataset.len());
        Ok(Self { dataset, cursor })
    }

    pub fn current(&self) -> &StateSnapshot {
        debug_assert!(
            self.cursor.index() < self.dataset.states.len(),
            "cursor {} outside {} loaded states",
            self.cursor.index(),
            self.dataset.states.len()
        );
        &self.dataset.states[self.cursor.index()]
    }

    pub fn append(&mut self, states: Vec<StateSnapshot>) {
        self.dataset.states.extend(states);
        self.cursor.grow(self.dataset.states.len());
    }
}

/// List the plans the backend offers for a delivery mode
pub async fn list_available_plans(backend: &dyn PlaybackBackend, mode: DeliveryMode) -> PlaybackResult<Vec<String>> {
    match mode {
        DeliveryMode::Batch => BatchDataConnector::list_available_plans(backend).await,
        DeliveryMode::Streaming => StreamingDataConnector::list_available_plans(backend).await,
    }
}

/// Create an uninitialized connector for `plan` delivered in `mode`
pub fn open_connector(
    mode: DeliveryMode,
    plan: &str,
    backend: Arc<dyn PlaybackBackend>,
) -> Box<dyn PlaybackDataConnector> {
    match mode {
        DeliveryMode::Batch => Box::new(BatchDataConnector::new(plan, backend)),
        DeliveryMode::Streaming => Box::new(StreamingDataConnector::new(plan, backend)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{MockBackend, DEMO_PLAN};

    #[tokio::test]
    async fn test_open_connector_selects_variant() {
        let backend = Arc::new(MockBackend::demo(4));

        let mut batch = open_connector(DeliveryMode::Batch, DEMO_PLAN, backend.clone());
        assert_eq!(batch.mode(), DeliveryMode::Batch);
        batch.initialize().await.unwrap();
        assert_eq!(backend.batch_fetch_count(), 1);

        let mut streaming = open_connector(DeliveryMode::Streaming, DEMO_PLAN, backend.clone());
        assert_eq!(streaming.mode(), DeliveryMode::Streaming);
        streaming.initialize().await.unwrap();
        assert_eq!(backend.runs_started(), 1);
        assert_eq!(streaming.plan(), DEMO_PLAN);
    }

    #[tokio::test]
    async fn test_list_available_plans_per_mode() {
        let backend = MockBackend::demo(4);
        for mode in [DeliveryMode::Batch, DeliveryMode::Streaming] {
            let plans = list_available_plans(&backend, mode).await.unwrap();
            assert_eq!(plans, vec![DEMO_PLAN.to_string()]);
        }
    }

    #[tokio::test]
    async fn test_step_helpers_move_by_one() {
        let backend = Arc::new(MockBackend::demo(4));
        let mut connector = open_connector(DeliveryMode::Batch, DEMO_PLAN, backend);
        connector.initialize().await.unwrap();

        connector.step_forward().await.unwrap();
        assert_eq!(connector.cursor().unwrap().index(), 1);
        connector.step_back().await.unwrap();
        connector.step_back().await.unwrap();
        assert_eq!(connector.cursor().unwrap().index(), 3);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let dataset = SimulationDataset {
            surface: crate::backend::mock::sample_surface(),
            states: Vec::new(),
            source_id: None,
        };
        assert!(matches!(
            LoadedDataset::new("empty", dataset),
            Err(PlaybackError::DatasetLoadFailed(_))
        ));
    }

    #[test]
    fn test_current_follows_cursor_across_appends() {
        let states = crate::backend::mock::sample_states(4);
        let dataset = SimulationDataset {
            surface: crate::backend::mock::sample_surface(),
            states: states[..2].to_vec(),
            source_id: Some(7),
        };
        let mut loaded = LoadedDataset::new("simple", dataset).unwrap();
        assert_eq!(loaded.current(), &states[0]);

        loaded.append(states[2..].to_vec());
        loaded.cursor.seek_last();
        assert_eq!(loaded.cursor.dataset_size(), 4);
        assert_eq!(loaded.current(), &states[3]);
    }
}
