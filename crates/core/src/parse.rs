//! Parse record describing how a query was understood.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel intent for queries no rule recognises
pub const UNKNOWN_INTENT: &str = "unknown_query";

/// Placeholder used where a value does not apply
pub const NOT_APPLICABLE: &str = "N/A";

/// FHIR resource category a query targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Patient,
    Condition,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Patient => "Patient",
            ResourceType::Condition => "Condition",
            ResourceType::NotApplicable => NOT_APPLICABLE,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed vocabulary of derived query parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SearchParam {
    Condition,
    Age,
    Gender,
    Name,
}

/// Derived query parameters, one value per key
pub type SearchParams = BTreeMap<SearchParam, String>;

/// How a free-text query was classified.
///
/// Serialized with the snake_case keys the frontend reads
/// (`resource_type`, `fhir_params`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseResult {
    pub intent: String,
    pub resource_type: ResourceType,
    #[serde(rename = "fhir_params")]
    pub parameters: SearchParams,
    #[serde(rename = "simulated_fhir_request_url")]
    pub simulated_request_uri: String,
    pub original_query: String,
}

impl ParseResult {
    /// Parse record for a query no rule matched
    pub fn unknown(query: &str) -> Self {
        Self {
            intent: UNKNOWN_INTENT.to_string(),
            resource_type: ResourceType::NotApplicable,
            parameters: SearchParams::new(),
            simulated_request_uri: NOT_APPLICABLE.to_string(),
            original_query: query.to_string(),
        }
    }

    pub fn param(&self, key: SearchParam) -> Option<&str> {
        self.parameters.get(&key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_parse_json() {
        let value = serde_json::to_value(ParseResult::unknown("hello")).unwrap();
        assert_eq!(
            value,
            json!({
                "intent": "unknown_query",
                "resource_type": "N/A",
                "fhir_params": {},
                "simulated_fhir_request_url": "N/A",
                "original_query": "hello"
            })
        );
    }

    #[test]
    fn test_params_serialize_as_lowercase_keys() {
        let mut parse = ParseResult::unknown("q");
        parse.parameters.insert(SearchParam::Gender, "male".to_string());
        parse.parameters.insert(SearchParam::Age, "70".to_string());
        let value = serde_json::to_value(&parse).unwrap();
        assert_eq!(value["fhir_params"], json!({"age": "70", "gender": "male"}));
    }

    #[test]
    fn test_unknown_parameter_key_rejected() {
        let value = json!({
            "intent": "x",
            "resource_type": "Patient",
            "fhir_params": {"birthdate": "1990"},
            "simulated_fhir_request_url": "N/A",
            "original_query": "x"
        });
        assert!(serde_json::from_value::<ParseResult>(value).is_err());
    }

    #[test]
    fn test_resource_type_wire_names() {
        let parsed: ResourceType = serde_json::from_value(json!("N/A")).unwrap();
        assert_eq!(parsed, ResourceType::NotApplicable);
        assert_eq!(ResourceType::Condition.to_string(), "Condition");
        assert!(serde_json::from_value::<ResourceType>(json!("Observation")).is_err());
    }
}
