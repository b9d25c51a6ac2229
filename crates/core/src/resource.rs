//! Patient and Condition resources as returned in query bundles.
//!
//! The in-memory shapes are flat; the wire shapes follow FHIR field layout
//! (`code.text`, `subject.reference`/`subject.display`).

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Prefix of a Condition subject reference
const PATIENT_REFERENCE_PREFIX: &str = "Patient/";

/// A patient as surfaced by the query tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientRecord {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    #[serde(default)]
    pub conditions: Vec<String>,
}

impl PatientRecord {
    pub fn new(id: &str, name: &str, age: u32, gender: &str, conditions: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            age,
            gender: gender.to_string(),
            conditions: conditions.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Case-insensitive check for a named condition
    pub fn has_condition(&self, condition: &str) -> bool {
        self.conditions
            .iter()
            .any(|c| c.eq_ignore_ascii_case(condition))
    }
}

/// A single diagnosed condition attached to a patient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(into = "ConditionWire", try_from = "ConditionWire")]
pub struct ConditionRecord {
    pub id: String,
    pub condition_name: String,
    pub subject_patient_id: String,
    /// Denormalized patient name, kept for display
    pub subject_display_name: String,
}

impl ConditionRecord {
    pub fn new(id: &str, condition_name: &str, subject: &PatientRecord) -> Self {
        Self {
            id: id.to_string(),
            condition_name: condition_name.to_string(),
            subject_patient_id: subject.id.clone(),
            subject_display_name: subject.name.clone(),
        }
    }

    /// `Patient/<id>` reference to the subject
    pub fn subject_reference(&self) -> String {
        format!("{}{}", PATIENT_REFERENCE_PREFIX, self.subject_patient_id)
    }
}

#[derive(Serialize, Deserialize)]
struct CodeableText {
    text: String,
}

#[derive(Serialize, Deserialize)]
struct SubjectReference {
    reference: String,
    display: String,
}

#[derive(Serialize, Deserialize)]
struct ConditionWire {
    id: String,
    code: CodeableText,
    subject: SubjectReference,
}

impl From<ConditionRecord> for ConditionWire {
    fn from(record: ConditionRecord) -> Self {
        let reference = record.subject_reference();
        Self {
            id: record.id,
            code: CodeableText {
                text: record.condition_name,
            },
            subject: SubjectReference {
                reference,
                display: record.subject_display_name,
            },
        }
    }
}

impl TryFrom<ConditionWire> for ConditionRecord {
    type Error = QueryError;

    fn try_from(wire: ConditionWire) -> Result<Self, Self::Error> {
        let subject_patient_id = wire
            .subject
            .reference
            .strip_prefix(PATIENT_REFERENCE_PREFIX)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| QueryError::InvalidReference(wire.subject.reference.clone()))?
            .to_string();

        Ok(Self {
            id: wire.id,
            condition_name: wire.code.text,
            subject_patient_id,
            subject_display_name: wire.subject.display,
        })
    }
}

/// A bundle entry resource: exactly one of the supported kinds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "resourceType")]
pub enum Resource {
    Patient(PatientRecord),
    Condition(ConditionRecord),
}

impl Resource {
    pub fn id(&self) -> &str {
        match self {
            Resource::Patient(p) => &p.id,
            Resource::Condition(c) => &c.id,
        }
    }

    pub fn as_patient(&self) -> Option<&PatientRecord> {
        match self {
            Resource::Patient(p) => Some(p),
            Resource::Condition(_) => None,
        }
    }

    pub fn as_condition(&self) -> Option<&ConditionRecord> {
        match self {
            Resource::Condition(c) => Some(c),
            Resource::Patient(_) => None,
        }
    }
}

impl From<PatientRecord> for Resource {
    fn from(patient: PatientRecord) -> Self {
        Resource::Patient(patient)
    }
}

impl From<ConditionRecord> for Resource {
    fn from(condition: ConditionRecord) -> Self {
        Resource::Condition(condition)
    }
}
