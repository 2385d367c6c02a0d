use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Stable rule identifiers carried on every finding. The HTTP and export
/// layers key suggestion text and dashboards off these, so they are part of
/// the public contract.
pub mod codes {
    pub const MALFORMED_REQUEST: &str = "MALFORMED_REQUEST";
    pub const MALFORMED_FIELD: &str = "MALFORMED_FIELD";
    pub const INVALID_JSON: &str = "INVALID_JSON";
    pub const INTERNAL_VALIDATION_FAULT: &str = "INTERNAL_VALIDATION_FAULT";

    pub const REQUIRED_FIELD_MISSING: &str = "REQUIRED_FIELD_MISSING";
    pub const INVALID_REQUEST_ID: &str = "INVALID_REQUEST_ID";
    pub const MISSING_IMPRESSIONS: &str = "MISSING_IMPRESSIONS";
    pub const MISSING_IMPRESSION_ID: &str = "MISSING_IMPRESSION_ID";
    pub const SITE_APP_CONFLICT: &str = "SITE_APP_CONFLICT";

    pub const DUPLICATE_IMPRESSION_ID: &str = "DUPLICATE_IMPRESSION_ID";
    pub const MISSING_AD_FORMAT: &str = "MISSING_AD_FORMAT";
    pub const INVALID_CURRENCY_CODE: &str = "INVALID_CURRENCY_CODE";
    pub const INVALID_TEST_FLAG: &str = "INVALID_TEST_FLAG";

    pub const SITE_APP_MUTUAL_EXCLUSION: &str = "SITE_APP_MUTUAL_EXCLUSION";
    pub const INVALID_LMT_VALUE: &str = "INVALID_LMT_VALUE";
    pub const INVALID_DNT_VALUE: &str = "INVALID_DNT_VALUE";
    pub const UNREALISTIC_BIRTH_YEAR: &str = "UNREALISTIC_BIRTH_YEAR";
    pub const LOW_TIMEOUT: &str = "LOW_TIMEOUT";
    pub const HIGH_TIMEOUT: &str = "HIGH_TIMEOUT";

    pub const INVALID_AUCTION_TYPE: &str = "INVALID_AUCTION_TYPE";
    pub const INVALID_DEVICE_TYPE: &str = "INVALID_DEVICE_TYPE";
    pub const INVALID_CONNECTION_TYPE: &str = "INVALID_CONNECTION_TYPE";
    pub const INVALID_BANNER_POSITION: &str = "INVALID_BANNER_POSITION";

    pub const INVALID_BANNER_WIDTH: &str = "INVALID_BANNER_WIDTH";
    pub const INVALID_BANNER_HEIGHT: &str = "INVALID_BANNER_HEIGHT";
    pub const NON_STANDARD_BANNER_SIZE: &str = "NON_STANDARD_BANNER_SIZE";
    pub const INVALID_FORMAT_DIMENSIONS: &str = "INVALID_FORMAT_DIMENSIONS";
    pub const NEGATIVE_BID_FLOOR: &str = "NEGATIVE_BID_FLOOR";
    pub const INVALID_VIDEO_DURATION: &str = "INVALID_VIDEO_DURATION";
    pub const INVALID_MIN_DURATION: &str = "INVALID_MIN_DURATION";
    pub const INVALID_MAX_DURATION: &str = "INVALID_MAX_DURATION";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Schema,
    RequiredField,
    Format,
    Value,
    Logical,
}

impl ErrorKind {
    /// Bucket name used by the reporting layer.
    pub fn bucket(self) -> &'static str {
        match self {
            ErrorKind::Schema => "Schema",
            ErrorKind::RequiredField => "Required Fields",
            ErrorKind::Format => "Format",
            ErrorKind::Value => "Value",
            ErrorKind::Logical => "Business Logic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub severity: Severity,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(
        code: &str,
        kind: ErrorKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
            code: code.to_string(),
            kind,
            actual_value: None,
            expected_value: None,
            suggestion: None,
        }
    }

    pub fn actual(mut self, v: impl Into<Value>) -> Self {
        self.actual_value = Some(v.into());
        self
    }

    pub fn expected(mut self, v: impl Into<Value>) -> Self {
        self.expected_value = Some(v.into());
        self
    }

    pub fn suggest(mut self, s: impl Into<String>) -> Self {
        self.suggestion = Some(s.into());
        self
    }
}

/// Advisory finding; same shape as [`ValidationError`] minus the severity
/// (warnings are always advisory and never affect validity).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationWarning {
    pub fn new(code: &str, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.to_string(),
            actual_value: None,
            recommended_value: None,
            suggestion: None,
        }
    }

    pub fn actual(mut self, v: impl Into<Value>) -> Self {
        self.actual_value = Some(v.into());
        self
    }

    pub fn recommended(mut self, v: impl Into<Value>) -> Self {
        self.recommended_value = Some(v.into());
        self
    }

    pub fn suggest(mut self, s: impl Into<String>) -> Self {
        self.suggestion = Some(s.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceLevel {
    Compliant,
    Partial,
    NonCompliant,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub compliance_level: ComplianceLevel,
    pub compliance_score: f64,
    pub validated_fields: Vec<String>,
    pub validation_id: String,
    pub timestamp: DateTime<Utc>,
    pub spec_version: String,
}

/// Running accumulator the checkers write into. Field paths keep first-visit
/// order and are deduplicated on insert.
#[derive(Debug, Default)]
pub struct Findings {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub fields: Vec<String>,
}

impl Findings {
    pub fn error(&mut self, e: ValidationError) {
        self.errors.push(e);
    }

    pub fn warning(&mut self, w: ValidationWarning) {
        self.warnings.push(w);
    }

    pub fn field(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.fields.contains(&path) {
            self.fields.push(path);
        }
    }
}

pub fn new_id() -> String {
    Uuid::now_v7().simple().to_string()
}
