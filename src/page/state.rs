use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error};
use serde::Serialize;

use crate::core::Result;

/// Data state of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    /// Shown with a retry action.
    Failed(String),
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Mount flag shared between a page and whatever hosts it.
///
/// Requests are never cancelled; a page checks its scope after every await
/// and drops results that arrive once it has been unmounted.
#[derive(Debug, Clone)]
pub struct PageScope {
    mounted: Arc<AtomicBool>,
}

impl PageScope {
    pub fn new() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }
}

impl Default for PageScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply a joined load result to a page. Returns the data only when the
/// page is still mounted and every fetch succeeded.
pub(crate) fn settle_load<T>(
    page: &str,
    scope: &PageScope,
    state: &mut LoadState,
    result: Result<T>,
    failure: &str,
) -> Option<T> {
    if !scope.is_mounted() {
        debug!("{} unmounted, discarding load result", page);
        return None;
    }
    match result {
        Ok(data) => {
            *state = LoadState::Ready;
            Some(data)
        }
        Err(err) => {
            error!("Error loading {}: {}", page, err);
            *state = LoadState::Failed(failure.to_string());
            None
        }
    }
}
