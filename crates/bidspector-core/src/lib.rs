//! Multi-layer conformance validation for OpenRTB 2.6 bid requests.
//!
//! Feed [`validate_request`] any `serde_json::Value`; however malformed the
//! input is, it always comes back with a complete [`ValidationResult`]
//! carrying the findings, a compliance level and a deterministic score.

pub mod batch;
pub mod constraints;
pub mod crossfield;
pub mod engine;
pub mod enums;
pub mod findings;
pub mod openrtb;
pub mod report;
pub mod rules;
pub mod schema;
pub mod tables;

pub use batch::{validate_batch, BatchSummary, BatchValidationResult, CodeFrequency};
pub use engine::{validate_json_str, validate_request};
pub use findings::{
    codes, ComplianceLevel, ErrorKind, Severity, ValidationError, ValidationResult,
    ValidationWarning,
};
pub use report::{
    categorize_errors, format_error_message, format_warning_message, generate_compliance_report,
    generate_suggestions, generate_validation_report, ComplianceReport, FieldValidationResult,
    ValidationReport,
};
