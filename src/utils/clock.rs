use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use tokio::time::Instant;

/// Represents an entity responsible for providing dates across application. This allows tests to
/// pin the current time.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;

    fn local_time(&self) -> DateTime<Local> {
        self.time().with_timezone(&Local)
    }

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}

/// Clock frozen at a single moment. Sleeping still follows tokio time, so paused tokio tests can
/// drive loops built on top of it.
#[derive(Clone)]
pub struct FixedClock {
    pub moment: DateTime<Utc>,
}

#[async_trait]
impl Clock for FixedClock {
    fn time(&self) -> DateTime<Utc> {
        self.moment
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
