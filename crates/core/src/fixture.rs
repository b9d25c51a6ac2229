//! In-memory data source seeded with the demo cohort.

use crate::bundle::Bundle;
use crate::parse::{ResourceType, SearchParam, SearchParams};
use crate::resolver::DataSource;
use crate::resource::{ConditionRecord, PatientRecord, Resource};

pub const DIABETES_MELLITUS: &str = "Diabetes Mellitus";
pub const HYPERTENSION: &str = "Hypertension";
pub const ASTHMA: &str = "Asthma";
pub const ARTHRITIS: &str = "Arthritis";
pub const DEMENTIA: &str = "Dementia";
pub const ALLERGY: &str = "Allergy";
pub const ALLERGY_TO_PENICILLIN: &str = "Allergy to Penicillin";

/// Fixture records searched by parameters.
///
/// `cohort` answers Patient searches. `charted` patients carry Condition
/// resources and answer Condition searches by name.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    cohort: Vec<PatientRecord>,
    charted: Vec<PatientRecord>,
    conditions: Vec<ConditionRecord>,
}

impl FixtureSource {
    pub fn new(
        cohort: Vec<PatientRecord>,
        charted: Vec<PatientRecord>,
        conditions: Vec<ConditionRecord>,
    ) -> Self {
        Self {
            cohort,
            charted,
            conditions,
        }
    }

    /// The built-in demo data
    pub fn seed() -> Self {
        let cohort = vec![
            PatientRecord::new("p1", "John Doe", 55, "male", &[DIABETES_MELLITUS, HYPERTENSION]),
            PatientRecord::new("p2", "Jane Smith", 62, "female", &[DIABETES_MELLITUS]),
            PatientRecord::new("p3", "Robert Green", 65, "male", &[HYPERTENSION, ASTHMA]),
            PatientRecord::new("p4", "Emily White", 30, "female", &[ASTHMA]),
            PatientRecord::new("p5", "Sophia Brown", 40, "female", &[ASTHMA, ALLERGY]),
            PatientRecord::new("p6", "William Black", 75, "male", &[ARTHRITIS]),
            PatientRecord::new("p7", "Mary Jones", 80, "female", &[DEMENTIA]),
        ];

        let alice = PatientRecord::new(
            "p_alice",
            "Alice Smith",
            45,
            "female",
            &[ASTHMA, ALLERGY_TO_PENICILLIN],
        );
        let conditions = vec![
            ConditionRecord::new("c_asthma", ASTHMA, &alice),
            ConditionRecord::new("c_allergy", ALLERGY_TO_PENICILLIN, &alice),
        ];

        Self::new(cohort, vec![alice], conditions)
    }

    /// Every record id held by this source
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.cohort
            .iter()
            .chain(&self.charted)
            .map(|p| p.id.as_str())
            .chain(self.conditions.iter().map(|c| c.id.as_str()))
    }

    fn search_patients(&self, params: &SearchParams) -> Vec<Resource> {
        self.cohort
            .iter()
            .filter(|patient| patient_matches(patient, params))
            .cloned()
            .map(Resource::from)
            .collect()
    }

    fn search_conditions(&self, params: &SearchParams) -> Vec<Resource> {
        let mut resources = Vec::new();
        for patient in self
            .charted
            .iter()
            .filter(|patient| patient_matches(patient, params))
        {
            resources.push(Resource::from(patient.clone()));
            resources.extend(
                self.conditions
                    .iter()
                    .filter(|c| c.subject_patient_id == patient.id)
                    .cloned()
                    .map(Resource::from),
            );
        }
        resources
    }
}

/// Every present parameter must hold; `age` means strictly older than.
fn patient_matches(patient: &PatientRecord, params: &SearchParams) -> bool {
    params.iter().all(|(key, value)| match key {
        SearchParam::Condition => patient.has_condition(value),
        SearchParam::Age => value
            .parse::<u32>()
            .map(|min| patient.age > min)
            .unwrap_or(false),
        SearchParam::Gender => patient.gender.eq_ignore_ascii_case(value),
        SearchParam::Name => patient.name.eq_ignore_ascii_case(value),
    })
}

impl DataSource for FixtureSource {
    fn search(&self, resource_type: ResourceType, params: &SearchParams) -> Bundle {
        let resources = match resource_type {
            ResourceType::Patient => self.search_patients(params),
            ResourceType::Condition => self.search_conditions(params),
            ResourceType::NotApplicable => Vec::new(),
        };
        Bundle::searchset(resources)
    }
}
