//! Query classification and result resolution.
//!
//! A query is matched against an ordered rule table by case-insensitive
//! substring containment. The first matching rule wins, even when a later
//! rule would be a more specific match (e.g. "male patients over 70" resolves
//! to `get_patients_over_70`, not `get_male_patients`). The winning rule's
//! parameters are handed to a [`DataSource`] to produce the result bundle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bundle::Bundle;
use crate::fixture::FixtureSource;
use crate::parse::{NOT_APPLICABLE, ParseResult, ResourceType, SearchParam, SearchParams};

/// Capability that turns derived parameters into matching records
pub trait DataSource: Send + Sync {
    fn search(&self, resource_type: ResourceType, params: &SearchParams) -> Bundle;
}

/// One entry of the classification table
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Lowercase substring that triggers the rule
    pub pattern: &'static str,
    pub intent: &'static str,
    pub resource_type: ResourceType,
    pub params: &'static [(SearchParam, &'static str)],
    pub request_uri: Option<&'static str>,
}

impl Rule {
    fn matches(&self, normalized: &str) -> bool {
        normalized.contains(self.pattern)
    }

    fn parse(&self, query: &str) -> ParseResult {
        ParseResult {
            intent: self.intent.to_string(),
            resource_type: self.resource_type,
            parameters: self
                .params
                .iter()
                .map(|(key, value)| (*key, value.to_string()))
                .collect(),
            simulated_request_uri: self.request_uri.unwrap_or(NOT_APPLICABLE).to_string(),
            original_query: query.to_string(),
        }
    }
}

/// Classification rules in priority order
pub const RULES: &[Rule] = &[
    Rule {
        pattern: "diabetic patients over 50",
        intent: "get_diabetic_patients_over_50",
        resource_type: ResourceType::Patient,
        params: &[
            (SearchParam::Condition, "Diabetes Mellitus"),
            (SearchParam::Age, "50"),
        ],
        request_uri: Some("Patient?condition=DiabetesMellitus&age=gt50"),
    },
    Rule {
        pattern: "patients over 60 with hypertension",
        intent: "get_hypertensive_patients_over_60",
        resource_type: ResourceType::Patient,
        params: &[
            (SearchParam::Condition, "Hypertension"),
            (SearchParam::Age, "60"),
        ],
        request_uri: Some("Patient?condition=Hypertension&age=gt60"),
    },
    Rule {
        pattern: "female patients with asthma",
        intent: "get_female_patients_with_asthma",
        resource_type: ResourceType::Patient,
        params: &[
            (SearchParam::Gender, "female"),
            (SearchParam::Condition, "Asthma"),
        ],
        request_uri: None,
    },
    Rule {
        pattern: "what conditions does alice smith have?",
        intent: "get_patient_conditions",
        resource_type: ResourceType::Condition,
        params: &[(SearchParam::Name, "Alice Smith")],
        request_uri: None,
    },
    Rule {
        pattern: "patients over 70",
        intent: "get_patients_over_70",
        resource_type: ResourceType::Patient,
        params: &[(SearchParam::Age, "70")],
        request_uri: None,
    },
    Rule {
        pattern: "male patients",
        intent: "get_male_patients",
        resource_type: ResourceType::Patient,
        params: &[(SearchParam::Gender, "male")],
        request_uri: None,
    },
    Rule {
        pattern: "all patients",
        intent: "get_all_patients",
        resource_type: ResourceType::Patient,
        params: &[],
        request_uri: None,
    },
];

/// Parse record paired with its result bundle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolverOutput {
    #[serde(rename = "nlp_parse")]
    pub parse: ParseResult,
    #[serde(rename = "simulated_fhir_response")]
    pub bundle: Bundle,
}

/// Classifies free-text queries and fetches their results
#[derive(Clone)]
pub struct QueryResolver {
    rules: &'static [Rule],
    source: Arc<dyn DataSource>,
}

impl QueryResolver {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            rules: RULES,
            source,
        }
    }

    /// Resolver over the built-in seed cohort
    pub fn with_fixtures() -> Self {
        Self::new(Arc::new(FixtureSource::seed()))
    }

    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    /// First rule whose pattern occurs in the query, if any
    pub fn classify(&self, query: &str) -> Option<&'static Rule> {
        let normalized = query.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&normalized))
    }

    /// Resolve a query. Never fails: unmatched input yields the
    /// `unknown_query` parse with an empty bundle.
    pub fn resolve(&self, query: &str) -> ResolverOutput {
        match self.classify(query) {
            Some(rule) => {
                let parse = rule.parse(query);
                let bundle = self.source.search(parse.resource_type, &parse.parameters);
                ResolverOutput { parse, bundle }
            }
            None => ResolverOutput {
                parse: ParseResult::unknown(query),
                bundle: Bundle::empty(),
            },
        }
    }
}

impl std::fmt::Debug for QueryResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResolver")
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}
