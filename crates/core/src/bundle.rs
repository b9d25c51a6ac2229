use serde::{Deserialize, Serialize};

use crate::resource::{ConditionRecord, PatientRecord, Resource};

/// FHIR Bundle types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    Searchset,
}

/// FHIR Bundle resource (simplified for query responses)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: String,

    #[serde(rename = "type")]
    pub bundle_type: BundleType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

/// Single entry in a Bundle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BundleEntry {
    pub resource: Resource,
}

impl BundleEntry {
    pub fn new(resource: impl Into<Resource>) -> Self {
        Self {
            resource: resource.into(),
        }
    }
}

impl Bundle {
    /// Create a searchset bundle from resources, preserving their order
    pub fn searchset<I, R>(resources: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Resource>,
    {
        let entry: Vec<BundleEntry> = resources.into_iter().map(BundleEntry::new).collect();
        Self {
            resource_type: "Bundle".to_string(),
            bundle_type: BundleType::Searchset,
            total: Some(entry.len() as u32),
            entry,
        }
    }

    /// Empty searchset bundle
    pub fn empty() -> Self {
        Self::searchset(Vec::<Resource>::new())
    }

    pub fn len(&self) -> usize {
        self.entry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_empty()
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().map(|e| &e.resource)
    }

    pub fn patients(&self) -> impl Iterator<Item = &PatientRecord> {
        self.resources().filter_map(Resource::as_patient)
    }

    pub fn conditions(&self) -> impl Iterator<Item = &ConditionRecord> {
        self.resources().filter_map(Resource::as_condition)
    }
}
