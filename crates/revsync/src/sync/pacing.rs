use std::time::Duration;

/// Delay applied between consecutive successful batch fetches.
///
/// Pacing is a courtesy to the remote service. The engine only waits when it
/// is about to request another batch, never after a terminal or failed
/// fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// No delay between batches.
    #[default]
    Disabled,
    /// Sleep for a fixed duration between batches.
    Fixed(Duration),
}

impl Pacing {
    /// Build a fixed pacing from milliseconds; zero disables pacing.
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Self::Disabled
        } else {
            Self::Fixed(Duration::from_millis(ms))
        }
    }

    /// The delay this policy applies, if any.
    #[must_use]
    pub fn delay(&self) -> Option<Duration> {
        match self {
            Self::Disabled => None,
            Self::Fixed(d) if d.is_zero() => None,
            Self::Fixed(d) => Some(*d),
        }
    }

    /// The delay in whole milliseconds, saturating at `u64::MAX`.
    #[must_use]
    pub fn delay_ms(&self) -> Option<u64> {
        self.delay()
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub async fn wait(&self) {
        if let Some(delay) = self.delay() {
            tokio::time::sleep(delay).await;
        }
    }
}
