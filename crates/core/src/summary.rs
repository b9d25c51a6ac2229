//! Aggregations the results view draws from: age histogram, condition
//! frequencies and flat table rows.

use serde::Serialize;

use crate::parse::ResourceType;
use crate::resolver::ResolverOutput;

/// Fixed age ranges, upper bounds inclusive
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum AgeBucket {
    #[serde(rename = "0-20")]
    UpTo20,
    #[serde(rename = "21-40")]
    From21To40,
    #[serde(rename = "41-60")]
    From41To60,
    #[serde(rename = "61-80")]
    From61To80,
    #[serde(rename = "81+")]
    Over80,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 5] = [
        AgeBucket::UpTo20,
        AgeBucket::From21To40,
        AgeBucket::From41To60,
        AgeBucket::From61To80,
        AgeBucket::Over80,
    ];

    pub fn for_age(age: u32) -> Self {
        match age {
            0..=20 => AgeBucket::UpTo20,
            21..=40 => AgeBucket::From21To40,
            41..=60 => AgeBucket::From41To60,
            61..=80 => AgeBucket::From61To80,
            _ => AgeBucket::Over80,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBucket::UpTo20 => "0-20",
            AgeBucket::From21To40 => "21-40",
            AgeBucket::From41To60 => "41-60",
            AgeBucket::From61To80 => "61-80",
            AgeBucket::Over80 => "81+",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AgeCount {
    pub bucket: AgeBucket,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConditionCount {
    pub condition: String,
    pub count: u32,
}

/// One row of the results table
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TableRow {
    Patient {
        name: String,
        age: u32,
        gender: String,
        conditions: String,
    },
    Condition {
        #[serde(rename = "patientName")]
        patient_name: String,
        condition: String,
    },
}

/// Everything the results view needs for one query
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Summary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_distribution: Option<Vec<AgeCount>>,
    pub condition_distribution: Vec<ConditionCount>,
    pub rows: Vec<TableRow>,
}

impl Summary {
    pub fn of(output: &ResolverOutput) -> Self {
        Self {
            age_distribution: age_distribution(output),
            condition_distribution: condition_distribution(output),
            rows: table_rows(output),
        }
    }
}

/// Patient counts per age bucket, all buckets present in order.
/// `None` unless the query targeted patients.
pub fn age_distribution(output: &ResolverOutput) -> Option<Vec<AgeCount>> {
    if output.parse.resource_type != ResourceType::Patient {
        return None;
    }

    let mut counts: Vec<AgeCount> = AgeBucket::ALL
        .iter()
        .map(|&bucket| AgeCount { bucket, count: 0 })
        .collect();

    for patient in output.bundle.patients() {
        let bucket = AgeBucket::for_age(patient.age);
        if let Some(slot) = counts.iter_mut().find(|c| c.bucket == bucket) {
            slot.count += 1;
        }
    }

    Some(counts)
}

/// Condition occurrence counts in first-seen order
pub fn condition_distribution(output: &ResolverOutput) -> Vec<ConditionCount> {
    let names: Vec<&str> = match output.parse.resource_type {
        ResourceType::Patient => output
            .bundle
            .patients()
            .flat_map(|p| p.conditions.iter().map(String::as_str))
            .collect(),
        ResourceType::Condition => output
            .bundle
            .conditions()
            .map(|c| c.condition_name.as_str())
            .collect(),
        ResourceType::NotApplicable => Vec::new(),
    };

    let mut counts: Vec<ConditionCount> = Vec::new();
    for name in names {
        match counts.iter_mut().find(|c| c.condition == name) {
            Some(existing) => existing.count += 1,
            None => counts.push(ConditionCount {
                condition: name.to_string(),
                count: 1,
            }),
        }
    }
    counts
}

pub fn table_rows(output: &ResolverOutput) -> Vec<TableRow> {
    match output.parse.resource_type {
        ResourceType::Patient => output
            .bundle
            .patients()
            .map(|p| TableRow::Patient {
                name: p.name.clone(),
                age: p.age,
                gender: p.gender.clone(),
                conditions: p.conditions.join(", "),
            })
            .collect(),
        ResourceType::Condition => output
            .bundle
            .conditions()
            .map(|c| TableRow::Condition {
                patient_name: c.subject_display_name.clone(),
                condition: c.condition_name.clone(),
            })
            .collect(),
        ResourceType::NotApplicable => Vec::new(),
    }
}
