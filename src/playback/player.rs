use crate::backend::PlaybackBackend;
use crate::connector::{list_available_plans, open_connector};
use crate::core::DeliveryMode;
use crate::error::PlaybackResult;
use crate::playback::{PlaybackConfig, PlaybackSession};
use std::sync::Arc;
use tracing::{info, warn};

/// Identifies one plan selection; increases with every selection
pub type Generation = u64;

/// Owns the session of the currently selected plan
///
/// Selecting a plan hands out a new session tagged with the next generation
/// and discards the current one. A session loaded in the background is only
/// installed if no other plan was selected in the meantime, so completions
/// of abandoned loads are dropped.
pub struct Player {
    backend: Arc<dyn PlaybackBackend>,
    config: PlaybackConfig,
    generation: Generation,
    session: Option<PlaybackSession>,
}

impl Player {
    pub fn new(backend: Arc<dyn PlaybackBackend>, config: PlaybackConfig) -> Self {
        Self {
            backend,
            config,
            generation: 0,
            session: None,
        }
    }

    pub fn backend(&self) -> &dyn PlaybackBackend {
        self.backend.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub async fn list_plans(&self, mode: DeliveryMode) -> PlaybackResult<Vec<String>> {
        list_available_plans(self.backend.as_ref(), mode).await
    }

    /// Discard the current session and return an uninitialized one for `plan`
    pub fn select_plan(&mut self, mode: DeliveryMode, plan: &str) -> PlaybackSession {
        self.close();
        self.generation += 1;
        info!("Selected {} plan {} (generation {})", mode, plan, self.generation);

        let connector = open_connector(mode, plan, self.backend.clone());
        PlaybackSession::new(self.generation, connector, self.config.clone())
    }

    /// Make a loaded session current unless a newer plan was selected since
    ///
    /// Returns whether the session was installed.
    pub fn install(&mut self, session: PlaybackSession) -> bool {
        if !self.is_current(session.generation()) {
            warn!(
                "Dropping stale session for plan {} (generation {}, current {})",
                session.plan(),
                session.generation(),
                self.generation
            );
            return false;
        }
        self.session = Some(session);
        true
    }

    /// Pass through a result of `generation`, or drop it if stale
    pub fn accept<T>(&self, generation: Generation, value: T) -> Option<T> {
        if self.is_current(generation) {
            Some(value)
        } else {
            warn!("Ignoring result of stale generation {}", generation);
            None
        }
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut PlaybackSession> {
        self.session.as_mut()
    }

    /// Stop and discard the current session
    pub fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{MockBackend, DEMO_PLAN};
    use crate::error::PlaybackError;
    use crate::playback::RecordingSink;

    fn player(backend: Arc<MockBackend>) -> Player {
        Player::new(backend, PlaybackConfig::default())
    }

    #[tokio::test]
    async fn test_select_initialize_install() {
        let mut player = player(Arc::new(MockBackend::demo(5)));
        let mut sink = RecordingSink::default();

        let mut session = player.select_plan(DeliveryMode::Batch, DEMO_PLAN);
        session.start(&mut sink).await.unwrap();
        assert!(player.install(session));

        let session = player.session_mut().unwrap();
        session.next(&mut sink).await.unwrap();
        assert_eq!(session.cursor().unwrap().index(), 1);
    }

    #[tokio::test]
    async fn test_stale_load_is_dropped() {
        let mut player = player(Arc::new(MockBackend::demo(5)));

        let first = player.select_plan(DeliveryMode::Batch, DEMO_PLAN);
        let second = player.select_plan(DeliveryMode::Streaming, DEMO_PLAN);

        let load = tokio::spawn(async move {
            let mut first = first;
            first.initialize().await.map(|_| first)
        });
        let first = load.await.unwrap().unwrap();

        assert!(!player.install(first));
        assert!(player.session().is_none());
        assert!(player.install(second));
        assert_eq!(player.session().unwrap().mode(), DeliveryMode::Streaming);
    }

    #[tokio::test]
    async fn test_accept_filters_by_generation() {
        let mut player = player(Arc::new(MockBackend::demo(5)));
        let old = player.select_plan(DeliveryMode::Batch, DEMO_PLAN).generation();
        let new = player.select_plan(DeliveryMode::Batch, DEMO_PLAN).generation();

        assert_eq!(player.accept(old, 1), None);
        assert_eq!(player.accept(new, 2), Some(2));
    }

    #[tokio::test]
    async fn test_reselection_stops_current_session() {
        let mut player = player(Arc::new(MockBackend::demo(5)));
        let mut session = player.select_plan(DeliveryMode::Batch, DEMO_PLAN);
        session.initialize().await.unwrap();
        let handle = session.auto_play_handle();
        player.install(session);

        player.select_plan(DeliveryMode::Batch, DEMO_PLAN);
        assert!(handle.is_stopped());
        assert!(player.session().is_none());
        assert_eq!(player.generation(), 2);
    }

    #[tokio::test]
    async fn test_plan_listing_failure() {
        let backend = Arc::new(MockBackend::demo(5));
        let player = player(backend.clone());
        assert_eq!(player.list_plans(DeliveryMode::Batch).await.unwrap(), vec![DEMO_PLAN.to_string()]);

        backend.set_plan_listing_available(false);
        assert!(matches!(
            player.list_plans(DeliveryMode::Batch).await,
            Err(PlaybackError::PlanListUnavailable(_))
        ));
    }
}
