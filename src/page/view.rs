use super::{Listing, PageState};
use crate::model::EquipmentRecord;

pub const LOADING_TEXT: &str = "Loading equipment...";
pub const EMPTY_TEXT: &str = "No equipment available for barter yet.";

/// What the equipment pane shows; exactly one variant at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageView {
    Loading,
    Error(String),
    Empty,
    List(Vec<EquipmentRow>),
}

/// One listing, already formatted for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub condition: String,
    pub value: String,
    pub location: String,
    pub owner: String,
}

impl EquipmentRow {
    fn from_record(record: &EquipmentRecord, currency: &str) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name.clone(),
            description: record.description.clone(),
            condition: record.condition.clone(),
            value: format!("{}{}", currency, record.expected_value),
            location: record.location.clone(),
            owner: record.owner.clone(),
        }
    }
}

impl PageState {
    /// Project the state onto a view. Loading beats an error, an error beats
    /// the collection.
    pub fn view(&self, currency: &str) -> PageView {
        match &self.listing {
            Listing::Loading => PageView::Loading,
            Listing::Failed(message) => PageView::Error(message.clone()),
            Listing::Ready if self.collection.is_empty() => PageView::Empty,
            Listing::Ready => PageView::List(
                self.collection
                    .iter()
                    .map(|r| EquipmentRow::from_record(r, currency))
                    .collect(),
            ),
        }
    }
}
