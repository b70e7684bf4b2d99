//! Equipment exchange page state
//!
//! [`PageState`] is changed only through [`PageState::apply`], which returns
//! the side effects (notifications, form reset) for the caller to perform.
//! Nothing in here touches the network or the terminal.

mod view;

pub use view::{EquipmentRow, PageView, EMPTY_TEXT, LOADING_TEXT};

use crate::api::ApiError;
use crate::model::EquipmentRecord;
use crate::notify::Notification;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load equipment. Please try again later.";
pub const LOAD_FAILED_TOAST: &str = "Failed to load equipment";
pub const ADD_SUCCEEDED_TOAST: &str = "Equipment listed successfully!";
pub const ADD_FAILED_TOAST: &str = "Failed to add equipment";

/// Where the listing request stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Loading,
    Failed(String),
    Ready,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    listing: Listing,
    collection: Vec<EquipmentRecord>,
}

/// Inputs to the page, one per handler outcome
#[derive(Debug)]
pub enum PageEvent {
    FetchStarted,
    Fetched(Result<Vec<EquipmentRecord>, ApiError>),
    Submitted(Result<Option<EquipmentRecord>, ApiError>),
    /// The barter action on the row at this index
    BarterRequested(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Notify(Notification),
    ClearForm,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new()
    }
}

impl PageState {
    /// Freshly mounted page: loading, nothing collected yet
    pub fn new() -> Self {
        Self {
            listing: Listing::Loading,
            collection: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    #[cfg(test)]
    pub fn collection(&self) -> &[EquipmentRecord] {
        &self.collection
    }

    pub fn apply(&mut self, event: PageEvent) -> Vec<Effect> {
        match event {
            PageEvent::FetchStarted => {
                self.listing = Listing::Loading;
                Vec::new()
            }
            PageEvent::Fetched(Ok(records)) => {
                tracing::info!("Loaded {} equipment listings", records.len());
                self.collection = records;
                self.listing = Listing::Ready;
                Vec::new()
            }
            PageEvent::Fetched(Err(e)) => {
                tracing::warn!("Failed to load equipment: {}", e);
                self.listing = Listing::Failed(LOAD_FAILED_MESSAGE.to_string());
                vec![Effect::Notify(Notification::error(LOAD_FAILED_TOAST))]
            }
            PageEvent::Submitted(Ok(Some(record))) => {
                tracing::info!("Listed equipment {} ({})", record.id, record.name);
                self.collection.push(record);
                vec![
                    Effect::Notify(Notification::success(ADD_SUCCEEDED_TOAST)),
                    Effect::ClearForm,
                ]
            }
            PageEvent::Submitted(Ok(None)) => {
                tracing::debug!("Listing service returned no record for submission");
                Vec::new()
            }
            PageEvent::Submitted(Err(e)) => {
                tracing::warn!("Failed to add equipment: {}", e);
                vec![Effect::Notify(Notification::error(ADD_FAILED_TOAST))]
            }
            PageEvent::BarterRequested(index) => match self.collection.get(index) {
                Some(record) => vec![Effect::Notify(Notification::info(format!(
                    "Contact {} to barter for {}",
                    record.owner, record.name
                )))],
                None => Vec::new(),
            },
        }
    }
}
