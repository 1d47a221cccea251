//! Plan-tier visibility gate and the free-plan notice timer.

use std::future::Future;
use std::time::Duration;

use storeloc_core::{ExecutionContext, PlanTier};
use tokio::task::JoinHandle;

pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_millis(5000);

/// Render decision for one load cycle. Derived, never stored across loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Entitlement {
    /// Render nothing at all.
    pub suppressed: bool,
    /// Show the dismissible free-plan notice.
    pub show_notice: bool,
}

impl Entitlement {
    /// | plan | context | outcome |
    /// |---|---|---|
    /// | free | editor / preview | visible, notice |
    /// | free | published | suppressed |
    /// | paid | any | visible, no notice |
    #[must_use]
    pub fn evaluate(plan: PlanTier, context: ExecutionContext) -> Self {
        match (plan.is_free(), context.is_authoring()) {
            (true, true) => Self {
                suppressed: false,
                show_notice: true,
            },
            (true, false) => Self {
                suppressed: true,
                show_notice: false,
            },
            (false, _) => Self::default(),
        }
    }
}

/// One-shot timer that hides the notice. Re-arming or cancelling aborts the
/// previous timer; dropping cancels it.
#[derive(Debug, Default)]
pub struct NoticeTimer {
    handle: Option<JoinHandle<()>>,
}

impl NoticeTimer {
    pub fn arm<F>(&mut self, after: Duration, on_expire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            on_expire.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for NoticeTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
