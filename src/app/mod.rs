//! [Tracker] is the single owner of the application state. Every change goes through one of its
//! methods, which persist the affected collection and redraw through a [render::Renderer].

pub mod render;

use std::sync::Arc;

use render::{Renderer, Snapshot, TimerView};
use tracing::{debug, info, warn};

use crate::{
    domain::{
        aggregate::{client_project_groups, total_this_week, total_today, totals_by_project},
        entities::{Client, Labels, Project, Session},
        registry::{self, RegistryError},
        timer::SessionTimer,
    },
    storage::key_value::{KeyValueStore, StoreKey},
    utils::{clock::Clock, time::clock_reading},
};

#[derive(Debug, Default, Clone)]
pub struct AppState {
    /// Newest first.
    pub sessions: Vec<Session>,
    pub projects: Vec<Project>,
    pub clients: Vec<Client>,
    pub timer: SessionTimer,
    pub labels: Labels,
}

pub struct Tracker<S, R> {
    state: AppState,
    store: S,
    renderer: R,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore, R: Renderer> Tracker<S, R> {
    /// Restores the collections from `store` and draws the initial state.
    pub async fn load(store: S, renderer: R, clock: Arc<dyn Clock>) -> Self {
        let state = AppState {
            sessions: store.load(StoreKey::Sessions, vec![]).await,
            projects: store.load(StoreKey::Projects, vec![]).await,
            clients: store.load(StoreKey::Clients, vec![]).await,
            timer: SessionTimer::new(),
            labels: Labels::default(),
        };
        debug!(
            "Loaded {} sessions, {} projects, {} clients",
            state.sessions.len(),
            state.projects.len(),
            state.clients.len()
        );
        let mut tracker = Self {
            state,
            store,
            renderer,
            clock,
        };
        tracker.redraw();
        tracker
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn renderer(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        let now = self.clock.local_time();
        let state = &self.state;
        Snapshot {
            sessions: state.sessions.clone(),
            projects: state.projects.clone(),
            clients: state.clients.clone(),
            timer: TimerView::from(&state.timer),
            labels: state.labels.clone(),
            today_seconds: total_today(&state.sessions, &now),
            week_seconds: total_this_week(&state.sessions, &now),
            project_totals: totals_by_project(&state.sessions),
            client_groups: client_project_groups(&state.projects, &state.clients),
        }
    }

    fn redraw(&mut self) {
        let snapshot = self.snapshot();
        self.renderer.render(&snapshot);
    }

    pub fn start(&mut self) {
        self.state.timer.start();
        self.redraw();
    }

    pub fn stop(&mut self) {
        self.state.timer.stop();
        self.redraw();
    }

    /// Advances the timer by one second and refreshes the clock line.
    pub fn tick(&mut self) {
        self.state.timer.tick();
        let reading = clock_reading(&self.clock.local_time());
        let timer = TimerView::from(&self.state.timer);
        self.renderer.render_tick(&reading, &timer);
    }

    pub fn set_task(&mut self, task: impl Into<String>) {
        self.state.labels.task = task.into();
    }

    pub fn set_project(&mut self, project: impl Into<String>) {
        self.state.labels.project = project.into();
    }

    pub fn set_tags(&mut self, tags: impl Into<String>) {
        self.state.labels.tags = tags.into();
    }

    pub fn redraw_status(&mut self) {
        self.redraw();
    }

    /// Stops the timer and records the counted time as a new session, if there is any.
    pub async fn reset(&mut self) -> Option<Session> {
        let session = self.commit_timer().await;
        self.redraw();
        session
    }

    /// Saves whatever the timer counted so far. Called right before the application exits, so
    /// nothing is drawn.
    pub async fn flush_on_exit(&mut self) -> Option<Session> {
        self.commit_timer().await
    }

    async fn commit_timer(&mut self) -> Option<Session> {
        let now = self.clock.time();
        let session = self.state.timer.reset(self.state.labels.clone(), now)?;
        info!(
            "Recorded {}s for '{}' in '{}'",
            session.seconds, session.task, session.project
        );
        self.state.sessions.insert(0, session.clone());
        self.store
            .save(StoreKey::Sessions, &self.state.sessions)
            .await;
        Some(session)
    }

    pub async fn add_project(&mut self, name: &str, client: &str) -> Result<(), RegistryError> {
        let now = self.clock.time();
        let result = registry::add_project(&mut self.state.projects, name, client, now);
        self.finish_registry_change(StoreKey::Projects, result).await
    }

    /// Removes every project named exactly `name`. Missing projects are not an error.
    pub async fn remove_project(&mut self, name: &str) -> usize {
        let removed = registry::remove_project(&mut self.state.projects, name);
        debug!("Removed {removed} projects named '{name}'");
        self.store
            .save(StoreKey::Projects, &self.state.projects)
            .await;
        self.redraw();
        removed
    }

    pub async fn add_client(&mut self, name: &str) -> Result<(), RegistryError> {
        let now = self.clock.time();
        let result = registry::add_client(&mut self.state.clients, name, now);
        self.finish_registry_change(StoreKey::Clients, result).await
    }

    async fn finish_registry_change(
        &mut self,
        key: StoreKey,
        result: Result<(), RegistryError>,
    ) -> Result<(), RegistryError> {
        match result {
            Ok(()) => {
                match key {
                    StoreKey::Projects => self.store.save(key, &self.state.projects).await,
                    StoreKey::Clients => self.store.save(key, &self.state.clients).await,
                    StoreKey::Sessions => self.store.save(key, &self.state.sessions).await,
                }
                self.redraw();
                Ok(())
            }
            Err(e) => {
                warn!("Rejected {key} change: {e}");
                self.renderer.render_error(&e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};

    use crate::{
        domain::{entities::Session, registry::RegistryError},
        storage::key_value::{KeyValueStore, MemoryStore, StoreKey},
        utils::{clock::FixedClock, logging::TEST_LOGGING},
    };

    use super::{render::MockRenderer, Tracker};

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock {
            moment: Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap(),
        })
    }

    fn quiet_renderer() -> MockRenderer {
        let mut renderer = MockRenderer::new();
        renderer.expect_render().return_const(());
        renderer.expect_render_tick().return_const(());
        renderer.expect_render_error().return_const(());
        renderer.expect_render_notice().return_const(());
        renderer
    }

    async fn tracker() -> Tracker<MemoryStore, MockRenderer> {
        *TEST_LOGGING;
        Tracker::load(MemoryStore::new(), quiet_renderer(), clock()).await
    }

    async fn stored_sessions(store: &MemoryStore) -> Vec<Session> {
        store.load(StoreKey::Sessions, vec![]).await
    }

    #[tokio::test]
    async fn test_load_renders_stored_state() {
        let store = MemoryStore::new();
        store.insert_raw(
            StoreKey::Clients,
            r#"[{"name":"Acme","createdAt":"2024-05-01T10:00:00Z"}]"#,
        );
        store.insert_raw(StoreKey::Sessions, "{broken");

        let mut renderer = MockRenderer::new();
        renderer
            .expect_render()
            .withf(|snapshot| snapshot.clients.len() == 1 && snapshot.sessions.is_empty())
            .times(1)
            .return_const(());

        let tracker = Tracker::load(store, renderer, clock()).await;
        assert_eq!(tracker.state().clients[0].name, "Acme");
    }

    #[tokio::test]
    async fn test_reset_records_and_persists_session() {
        let mut tracker = tracker().await;
        tracker.set_task("write");
        tracker.set_project("book");
        tracker.start();
        for _ in 0..90 {
            tracker.tick();
        }

        let session = tracker.reset().await.unwrap();

        assert_eq!(session.seconds, 90);
        assert_eq!(session.task, "write");
        assert_eq!(session.tags, "-");
        assert!(!tracker.state().timer.is_running());
        assert_eq!(tracker.state().timer.elapsed(), 0);
        assert_eq!(stored_sessions(tracker.store()).await, vec![session]);
    }

    #[tokio::test]
    async fn test_reset_without_time_records_nothing() {
        let mut tracker = tracker().await;
        tracker.start();
        assert!(tracker.reset().await.is_none());
        assert!(tracker.state().sessions.is_empty());
        assert_eq!(tracker.store().raw(StoreKey::Sessions), None);
    }

    #[tokio::test]
    async fn test_sessions_are_newest_first() {
        let mut tracker = tracker().await;
        for (task, seconds) in [("first", 3), ("second", 5)] {
            tracker.set_task(task);
            tracker.start();
            for _ in 0..seconds {
                tracker.tick();
            }
            tracker.reset().await;
        }
        let tasks = tracker
            .state()
            .sessions
            .iter()
            .map(|v| v.task.as_str())
            .collect::<Vec<_>>();
        assert_eq!(tasks, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_flush_on_exit_saves_running_session() {
        let mut tracker = tracker().await;
        tracker.start();
        tracker.tick();
        tracker.tick();

        tracker.flush_on_exit().await;

        let stored = stored_sessions(tracker.store()).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].seconds, 2);
    }

    #[tokio::test]
    async fn test_snapshot_totals() {
        let mut tracker = tracker().await;
        tracker.set_project("A");
        tracker.start();
        for _ in 0..60 {
            tracker.tick();
        }
        tracker.reset().await;

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.today_seconds, 60);
        assert_eq!(snapshot.week_seconds, 60);
        assert_eq!(snapshot.project_totals[0].project, "A");
        assert_eq!(snapshot.timer.display, "00:00:00");
    }

    #[tokio::test]
    async fn test_old_sessions_excluded_from_today() {
        let store = MemoryStore::new();
        let old = Session {
            task: "old".into(),
            project: "A".into(),
            tags: "-".into(),
            seconds: 1800,
            started_at: Some(clock().moment - Duration::days(8)),
        };
        store.save(StoreKey::Sessions, &vec![old]).await;

        let tracker = Tracker::load(store, quiet_renderer(), clock()).await;
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.today_seconds, 0);
        assert_eq!(snapshot.week_seconds, 0);
        assert_eq!(snapshot.project_totals[0].seconds, 1800);
    }

    #[tokio::test]
    async fn test_duplicate_project_not_persisted() {
        let mut tracker = tracker().await;
        tracker.add_project("Foo", "").await.unwrap();
        let stored = tracker.store().raw(StoreKey::Projects);

        let result = tracker.add_project("foo", "").await;

        assert_eq!(
            result,
            Err(RegistryError::DuplicateName { name: "foo".into() })
        );
        assert_eq!(tracker.state().projects.len(), 1);
        assert_eq!(tracker.store().raw(StoreKey::Projects), stored);
    }

    #[tokio::test]
    async fn test_rejected_input_renders_error_only() {
        let mut renderer = MockRenderer::new();
        renderer.expect_render().times(1).return_const(());
        renderer
            .expect_render_error()
            .withf(|e| *e == RegistryError::EmptyName)
            .times(1)
            .return_const(());
        let mut tracker = Tracker::load(MemoryStore::new(), renderer, clock()).await;

        assert_eq!(
            tracker.add_client("  ").await,
            Err(RegistryError::EmptyName)
        );
        assert!(tracker.state().clients.is_empty());
        assert_eq!(tracker.store().raw(StoreKey::Clients), None);
    }

    #[tokio::test]
    async fn test_every_change_redraws() {
        let mut renderer = MockRenderer::new();
        // Initial draw, project, client, remove, start, stop, reset.
        renderer.expect_render().times(7).return_const(());
        let mut tracker = Tracker::load(MemoryStore::new(), renderer, clock()).await;

        tracker.add_project("Site", "Acme").await.unwrap();
        tracker.add_client("Acme").await.unwrap();
        tracker.remove_project("Nothing").await;
        tracker.start();
        tracker.stop();
        tracker.reset().await;
    }

    #[tokio::test]
    async fn test_remove_project_keeps_sessions() {
        let mut tracker = tracker().await;
        tracker.add_project("Foo", "").await.unwrap();
        tracker.set_project("Foo");
        tracker.start();
        tracker.tick();
        tracker.reset().await;

        assert_eq!(tracker.remove_project("foo").await, 0);
        assert_eq!(tracker.remove_project("Foo").await, 1);

        assert!(tracker.state().projects.is_empty());
        assert_eq!(tracker.state().sessions[0].project, "Foo");
        assert_eq!(tracker.store().raw(StoreKey::Projects).as_deref(), Some("[]"));
    }
}
