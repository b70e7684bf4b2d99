//! Equipment records as exchanged with the listing service

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the listing service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquipmentId(pub String);

impl fmt::Display for EquipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EquipmentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A piece of farm equipment offered for barter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRecord {
    pub id: EquipmentId,
    pub name: String,
    pub description: String,
    pub condition: String,
    pub expected_value: f64,
    pub location: String,
    pub owner: String,
}

/// Fields supplied by the person listing equipment (the id is assigned server-side)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentFormData {
    pub name: String,
    pub description: String,
    pub condition: String,
    pub expected_value: f64,
    pub location: String,
    pub owner: String,
}

#[cfg(test)]
pub(crate) fn sample_record(id: &str, name: &str, owner: &str) -> EquipmentRecord {
    EquipmentRecord {
        id: EquipmentId::from(id),
        name: name.to_string(),
        description: format!("{} in working order", name),
        condition: "Good".to_string(),
        expected_value: 5000.0,
        location: "Nashik".to_string(),
        owner: owner.to_string(),
    }
}
