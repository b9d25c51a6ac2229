//! fhir-query-core: natural-language query resolution over FHIR-shaped data
//!
//! This crate classifies free-text questions against an ordered rule table,
//! derives FHIR search parameters, and resolves them through a pluggable
//! data source into a Bundle of Patient and Condition resources.

pub mod bundle;
pub mod error;
pub mod fixture;
pub mod outcome;
pub mod parse;
pub mod resolver;
pub mod resource;
pub mod suggest;
pub mod summary;

pub use bundle::{Bundle, BundleEntry, BundleType};
pub use error::QueryError;
pub use fixture::FixtureSource;
pub use outcome::{IssueSeverity, IssueType, OperationOutcome, OperationOutcomeIssue};
pub use parse::{ParseResult, ResourceType, SearchParam, SearchParams};
pub use resolver::{DataSource, QueryResolver, ResolverOutput, Rule, RULES};
pub use resource::{ConditionRecord, PatientRecord, Resource};
pub use summary::Summary;
