//! Equipment listing service
//!
//! The page only talks to the service through [`EquipmentService`]. Every call
//! takes a [`CancelToken`] so a page that has been torn down (or reloaded) can
//! abandon requests still in flight.

pub mod http;

use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::model::{EquipmentFormData, EquipmentRecord};

pub use http::HttpEquipmentService;

/// Errors returned by the listing service
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status
    #[error("service returned status {0}")]
    Status(u16),

    /// The response body was not the JSON we expected
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The caller cancelled the request before it completed
    #[error("request cancelled")]
    Cancelled,
}

#[async_trait]
pub trait EquipmentService: Send + Sync + 'static {
    /// Fetch the full collection, in the order the service returns it.
    async fn get_equipment(&self, cancel: &CancelToken) -> Result<Vec<EquipmentRecord>, ApiError>;

    /// Create a listing. `Ok(None)` means the service accepted the request
    /// but returned no record.
    async fn add_equipment(
        &self,
        form: EquipmentFormData,
        cancel: &CancelToken,
    ) -> Result<Option<EquipmentRecord>, ApiError>;
}

/// Cooperative cancellation shared between the page and its requests
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel is not missed
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Drive `fut` to completion unless this token is cancelled first
    pub async fn run<T, F>(&self, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        if self.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        tokio::select! {
            _ = self.cancelled() => Err(ApiError::Cancelled),
            result = fut => result,
        }
    }
}
