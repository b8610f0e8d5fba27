use crate::connector::{PlaybackCursor, PlaybackDataConnector};
use crate::core::{DeliveryMode, StateSnapshot};
use crate::error::PlaybackResult;
use crate::playback::{normalize_speed, FrameSink, Generation, PlaybackConfig, PlaybackState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stops a running auto-play loop from outside the session
#[derive(Debug, Clone, Default)]
pub struct AutoPlayHandle {
    stop_signal: Arc<AtomicBool>,
}

impl AutoPlayHandle {
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_signal.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.stop_signal.store(false, Ordering::SeqCst);
    }
}

/// Playback of one selected plan
///
/// Created per plan selection and discarded on reselection. Every control
/// forwards the resulting state, or the error, to a `FrameSink`.
pub struct PlaybackSession {
    generation: Generation,
    connector: Box<dyn PlaybackDataConnector>,
    config: PlaybackConfig,
    state: PlaybackState,
    auto_play: AutoPlayHandle,
}

impl PlaybackSession {
    pub fn new(generation: Generation, connector: Box<dyn PlaybackDataConnector>, config: PlaybackConfig) -> Self {
        Self {
            generation,
            connector,
            config,
            state: PlaybackState::Stopped,
            auto_play: AutoPlayHandle::default(),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn plan(&self) -> &str {
        self.connector.plan()
    }

    pub fn mode(&self) -> DeliveryMode {
        self.connector.mode()
    }

    pub fn connector(&self) -> &dyn PlaybackDataConnector {
        self.connector.as_ref()
    }

    pub fn cursor(&self) -> Option<PlaybackCursor> {
        self.connector.cursor()
    }

    /// Get current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Set playback speed
    pub fn set_speed(&mut self, speed: f64) {
        self.config.speed = normalize_speed(speed);
    }

    pub fn speed(&self) -> f64 {
        self.config.speed
    }

    pub fn auto_play_handle(&self) -> AutoPlayHandle {
        self.auto_play.clone()
    }

    /// Load the plan's initial data
    pub async fn initialize(&mut self) -> PlaybackResult<()> {
        self.connector.initialize().await
    }

    /// Show the surface and the first state of an initialized plan
    pub fn present(&self, sink: &mut dyn FrameSink) -> PlaybackResult<()> {
        let result = self.connector.surface_data().and_then(|surface| {
            sink.show_surface(self.connector.plan(), self.connector.mode(), surface);
            self.connector.current_state()
        });

        match result {
            Ok(state) => {
                sink.show_state(state, true);
                Ok(())
            }
            Err(e) => {
                sink.show_error(&e);
                Err(e)
            }
        }
    }

    /// Initialize, then present
    pub async fn start(&mut self, sink: &mut dyn FrameSink) -> PlaybackResult<()> {
        if let Err(e) = self.initialize().await {
            sink.show_error(&e);
            return Err(e);
        }
        self.present(sink)
    }

    /// Step forward by one state
    pub async fn next(&mut self, sink: &mut dyn FrameSink) -> PlaybackResult<StateSnapshot> {
        self.pause();
        let result = self.connector.advance(1).await;
        Self::show(sink, result, true)
    }

    /// Step back by one state
    pub async fn prev(&mut self, sink: &mut dyn FrameSink) -> PlaybackResult<StateSnapshot> {
        self.pause();
        let result = self.connector.retreat(1).await;
        Self::show(sink, result, true)
    }

    /// Jump forward by the fast-forward step size
    pub async fn fast_forward(&mut self, sink: &mut dyn FrameSink) -> PlaybackResult<StateSnapshot> {
        self.pause();
        let result = self.connector.advance(self.config.fast_forward_step).await;
        Self::show(sink, result, false)
    }

    /// Jump back by the fast-forward step size
    pub async fn fast_back(&mut self, sink: &mut dyn FrameSink) -> PlaybackResult<StateSnapshot> {
        self.pause();
        let result = self.connector.retreat(self.config.fast_forward_step).await;
        Self::show(sink, result, false)
    }

    /// Pause auto-play, if running
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
        self.auto_play.stop();
    }

    /// Stop playback for good; used when the session is discarded
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.auto_play.stop();
    }

    /// Advance one state per tick until stopped
    ///
    /// Each tick awaits its navigation before the next is scheduled, so a
    /// streaming fetch never overlaps another. The loop ends when the handle
    /// is stopped, after `max_ticks` ticks, when an exhausted stream reaches
    /// its last state, or on the first error. Returns the number of ticks.
    pub async fn run_auto_play(&mut self, sink: &mut dyn FrameSink, max_ticks: Option<usize>) -> PlaybackResult<usize> {
        self.auto_play.reset();
        self.state = PlaybackState::Playing;
        info!("Auto-play started for plan {}", self.plan());

        let mut ticks = 0;
        let mut reached_end = false;
        let result = loop {
            if self.auto_play.is_stopped() || max_ticks.is_some_and(|max| ticks >= max) {
                break Ok(ticks);
            }
            if self.connector.at_end() {
                debug!("Auto-play reached the end of plan {}", self.plan());
                reached_end = true;
                break Ok(ticks);
            }

            let step = self.connector.advance(1).await;
            if let Err(e) = Self::show(sink, step, true) {
                warn!("Auto-play stopped: {}", e);
                break Err(e);
            }
            ticks += 1;

            if !self.auto_play_finished(ticks, max_ticks) {
                tokio::time::sleep(self.config.tick_interval()).await;
            }
        };

        // nothing is left to play once an exhausted stream reaches its end
        self.state = if reached_end {
            PlaybackState::Stopped
        } else {
            PlaybackState::Paused
        };
        result
    }

    fn auto_play_finished(&self, ticks: usize, max_ticks: Option<usize>) -> bool {
        self.auto_play.is_stopped() || max_ticks.is_some_and(|max| ticks >= max) || self.connector.at_end()
    }

    fn show(
        sink: &mut dyn FrameSink,
        result: PlaybackResult<StateSnapshot>,
        animate: bool,
    ) -> PlaybackResult<StateSnapshot> {
        match &result {
            Ok(state) => sink.show_state(state, animate),
            Err(e) => sink.show_error(e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{sample_states, MockBackend, DEMO_PLAN};
    use crate::connector::open_connector;
    use crate::error::PlaybackError;
    use crate::playback::RecordingSink;
    use std::time::Duration;

    fn session(mode: DeliveryMode, backend: Arc<MockBackend>) -> PlaybackSession {
        session_with_interval(mode, backend, Duration::ZERO)
    }

    fn session_with_interval(mode: DeliveryMode, backend: Arc<MockBackend>, interval: Duration) -> PlaybackSession {
        let config = PlaybackConfig {
            auto_run_interval: interval,
            fast_forward_step: 3,
            speed: 1.0,
        };
        PlaybackSession::new(1, open_connector(mode, DEMO_PLAN, backend), config)
    }

    #[tokio::test]
    async fn test_start_presents_surface_and_first_state() {
        let mut sink = RecordingSink::default();
        let mut session = session(DeliveryMode::Batch, Arc::new(MockBackend::demo(5)));

        session.start(&mut sink).await.unwrap();
        assert_eq!(sink.surfaces, vec![DEMO_PLAN.to_string()]);
        assert_eq!(sink.states, vec![(sample_states(5)[0].clone(), true)]);
        assert_eq!(session.state(), PlaybackState::Stopped);
    }

    #[tokio::test]
    async fn test_start_failure_is_reported() {
        let mut sink = RecordingSink::default();
        let backend = Arc::new(MockBackend::demo(5));
        let mut session = PlaybackSession::new(
            1,
            open_connector(DeliveryMode::Batch, "missing", backend),
            PlaybackConfig::default(),
        );

        assert!(session.start(&mut sink).await.is_err());
        assert!(matches!(sink.errors.as_slice(), [PlaybackError::DatasetLoadFailed(_)]));
        assert!(sink.surfaces.is_empty());
    }

    #[tokio::test]
    async fn test_present_before_initialize_reports_not_ready() {
        let mut sink = RecordingSink::default();
        let session = session(DeliveryMode::Batch, Arc::new(MockBackend::demo(5)));
        assert_eq!(session.present(&mut sink), Err(PlaybackError::SurfaceDataNotReady));
        assert_eq!(sink.errors, vec![PlaybackError::SurfaceDataNotReady]);
    }

    #[tokio::test]
    async fn test_controls_animate_single_steps_only() {
        let mut sink = RecordingSink::default();
        let mut session = session(DeliveryMode::Batch, Arc::new(MockBackend::demo(5)));
        session.start(&mut sink).await.unwrap();

        session.next(&mut sink).await.unwrap();
        session.fast_forward(&mut sink).await.unwrap();
        session.fast_back(&mut sink).await.unwrap();
        session.prev(&mut sink).await.unwrap();

        let animated: Vec<bool> = sink.states.iter().skip(1).map(|(_, a)| *a).collect();
        assert_eq!(animated, vec![true, false, false, true]);
        assert_eq!(session.cursor().unwrap().index(), 0);
    }

    #[tokio::test]
    async fn test_auto_play_tick_limit() {
        let mut sink = RecordingSink::default();
        let mut session = session(DeliveryMode::Batch, Arc::new(MockBackend::demo(5)));
        session.start(&mut sink).await.unwrap();

        let ticks = session.run_auto_play(&mut sink, Some(7)).await.unwrap();
        assert_eq!(ticks, 7);
        assert_eq!(session.cursor().unwrap().index(), 2);
        assert_eq!(session.state(), PlaybackState::Paused);
    }

    #[tokio::test]
    async fn test_auto_play_ends_with_exhausted_stream() {
        let mut sink = RecordingSink::default();
        let backend = Arc::new(MockBackend::demo(4));
        let mut session = session(DeliveryMode::Streaming, backend.clone());
        session.start(&mut sink).await.unwrap();

        // three states fetched one by one, then one empty fetch
        let ticks = session.run_auto_play(&mut sink, None).await.unwrap();
        assert_eq!(ticks, 4);
        assert_eq!(backend.chunk_fetch_count(), 4);
        assert!(session.connector().at_end());
        assert_eq!(session.state(), PlaybackState::Stopped);
    }

    #[tokio::test]
    async fn test_auto_play_skips_sleep_after_last_tick() {
        let mut sink = RecordingSink::default();
        let interval = Duration::from_secs(60);

        let mut batch = session_with_interval(DeliveryMode::Batch, Arc::new(MockBackend::demo(5)), interval);
        batch.start(&mut sink).await.unwrap();
        let ticks = tokio::time::timeout(Duration::from_secs(5), batch.run_auto_play(&mut sink, Some(1)))
            .await
            .expect("auto-play slept after its final tick")
            .unwrap();
        assert_eq!(ticks, 1);
        assert_eq!(batch.state(), PlaybackState::Paused);

        // one loaded state; the next fetch comes back empty
        let mut streaming = session_with_interval(DeliveryMode::Streaming, Arc::new(MockBackend::demo(1)), interval);
        streaming.start(&mut sink).await.unwrap();
        let ticks = tokio::time::timeout(Duration::from_secs(5), streaming.run_auto_play(&mut sink, None))
            .await
            .expect("auto-play slept after the stream ended")
            .unwrap();
        assert_eq!(ticks, 1);
        assert_eq!(streaming.state(), PlaybackState::Stopped);
    }

    #[tokio::test]
    async fn test_auto_play_stops_on_fetch_error() {
        let mut sink = RecordingSink::default();
        let backend = Arc::new(MockBackend::demo(10));
        let mut session = session(DeliveryMode::Streaming, backend.clone());
        session.start(&mut sink).await.unwrap();
        backend.fail_next_chunk();

        let result = session.run_auto_play(&mut sink, None).await;
        assert!(matches!(result, Err(PlaybackError::StreamingFetchFailed(_))));
        assert_eq!(sink.errors.len(), 1);
    }

    /// Stops auto-play through its handle once `after` states were shown
    struct StoppingSink {
        handle: AutoPlayHandle,
        after: usize,
        shown: usize,
    }

    impl FrameSink for StoppingSink {
        fn show_surface(&mut self, _plan: &str, _mode: DeliveryMode, _surface: &crate::core::SurfaceDescription) {}

        fn show_state(&mut self, _state: &StateSnapshot, _animate: bool) {
            self.shown += 1;
            if self.shown >= self.after {
                self.handle.stop();
            }
        }

        fn show_error(&mut self, _error: &PlaybackError) {}
    }

    #[tokio::test]
    async fn test_stopped_handle_ends_auto_play() {
        let mut session = session(DeliveryMode::Batch, Arc::new(MockBackend::demo(5)));
        session.initialize().await.unwrap();
        let mut sink = StoppingSink {
            handle: session.auto_play_handle(),
            after: 3,
            shown: 0,
        };

        // cyclic batch playback would never end on its own
        let ticks = session.run_auto_play(&mut sink, None).await.unwrap();
        assert_eq!(ticks, 3);
        assert!(session.auto_play_handle().is_stopped());
        assert!(!session.is_playing());
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut session = session(DeliveryMode::Batch, Arc::new(MockBackend::demo(1)));
        session.set_speed(50.0);
        assert_eq!(session.speed(), 10.0);
        session.set_speed(0.0);
        assert_eq!(session.speed(), 0.1);
        session.set_speed(f64::NAN);
        assert_eq!(session.speed(), 1.0);
    }

    #[tokio::test]
    async fn test_auto_play_with_nan_speed() {
        let mut sink = RecordingSink::default();
        let mut session = session(DeliveryMode::Batch, Arc::new(MockBackend::demo(3)));
        session.start(&mut sink).await.unwrap();
        session.set_speed(f64::NAN);

        assert_eq!(session.run_auto_play(&mut sink, Some(2)).await.unwrap(), 2);
        assert_eq!(session.cursor().unwrap().index(), 2);
    }
}
