//! Human-facing views over a finished [`ValidationResult`]. Everything here
//! is a pure transform; nothing re-validates.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::findings::{codes, ErrorKind, ValidationError, ValidationResult, ValidationWarning};
use crate::tables::TOOL_VERSION;

const GENERIC_SUGGESTION_THRESHOLD: usize = 10;
const GENERIC_SUGGESTION: &str =
    "Request has many issues; validate it against the OpenRTB 2.6 specification before sending";

pub const CATEGORY_REQUIRED: &str = "Required Fields";
pub const CATEGORY_VALUE: &str = "Value Validation";
pub const CATEGORY_LOGIC: &str = "Business Logic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_fields: usize,
    pub valid_fields: usize,
    pub error_fields: usize,
    pub warning_fields: usize,
    pub missing_required: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub tool_version: String,
    pub spec_version: String,
    pub generated_at: DateTime<Utc>,
}

/// One field's verdict; the atomic unit the field-level report iterates over.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidationResult {
    pub field: String,
    pub required: bool,
    pub present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<Value>,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub status: ReportStatus,
    pub summary: ReportSummary,
    pub fields: Vec<FieldValidationResult>,
    pub recommendations: Vec<String>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizedRecommendation {
    pub priority: Priority,
    pub text: String,
    pub estimated_score_impact: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCompliance {
    pub category: String,
    pub score: f64,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub compliant: bool,
    pub compliance_level: crate::findings::ComplianceLevel,
    pub score: f64,
    pub categories: Vec<CategoryCompliance>,
    pub critical_issues: Vec<ValidationError>,
    pub recommendations: Vec<PrioritizedRecommendation>,
}

// Top-level fields the protocol marks required, plus per-impression ids.
fn is_required_path(path: &str) -> bool {
    matches!(path, "id" | "imp" | "at") || (path.starts_with("imp.") && path.ends_with(".id"))
}

fn marks_absent(code: &str) -> bool {
    code == codes::REQUIRED_FIELD_MISSING || code == codes::MISSING_IMPRESSION_ID
}

fn render_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `"[CODE] message"` plus detail lines. The `Field:` line is omitted for
/// root-level findings, where it would only repeat the obvious.
pub fn format_error_message(e: &ValidationError) -> String {
    let mut lines = vec![format!("[{}] {}", e.code, e.message)];
    if e.field != "root" {
        lines.push(format!("Field: {}", e.field));
    }
    if let Some(v) = &e.expected_value {
        lines.push(format!("Expected: {}", render_value(v)));
    }
    if let Some(v) = &e.actual_value {
        lines.push(format!("Got: {}", render_value(v)));
    }
    if let Some(s) = &e.suggestion {
        lines.push(format!("Suggestion: {s}"));
    }
    lines.join("\n")
}

pub fn format_warning_message(w: &ValidationWarning) -> String {
    let mut lines = vec![format!("[{}] {}", w.code, w.message)];
    if w.field != "root" {
        lines.push(format!("Field: {}", w.field));
    }
    if let Some(v) = &w.actual_value {
        lines.push(format!("Got: {}", render_value(v)));
    }
    if let Some(v) = &w.recommended_value {
        lines.push(format!("Recommended: {}", render_value(v)));
    }
    if let Some(s) = &w.suggestion {
        lines.push(format!("Suggestion: {s}"));
    }
    lines.join("\n")
}

/// Group errors into named buckets by their kind.
pub fn categorize_errors(
    errors: &[ValidationError],
) -> BTreeMap<&'static str, Vec<ValidationError>> {
    let mut buckets: BTreeMap<&'static str, Vec<ValidationError>> = BTreeMap::new();
    for e in errors {
        buckets.entry(e.kind.bucket()).or_default().push(e.clone());
    }
    buckets
}

fn suggestion_for_code(code: &str) -> Option<&'static str> {
    Some(match code {
        codes::DUPLICATE_IMPRESSION_ID => "Ensure impression ids are unique within the request",
        codes::SITE_APP_CONFLICT | codes::SITE_APP_MUTUAL_EXCLUSION => {
            "Specify either site or app, not both"
        }
        codes::REQUIRED_FIELD_MISSING => "Populate the required top-level fields: id, imp, at",
        codes::INVALID_REQUEST_ID => "Use a unique, non-empty string for the request id",
        codes::MISSING_IMPRESSIONS => "Include at least one impression in imp",
        codes::MISSING_IMPRESSION_ID => "Give every impression a non-empty id",
        codes::MISSING_AD_FORMAT => {
            "Attach exactly one of banner, video, audio or native to each impression"
        }
        codes::INVALID_AUCTION_TYPE => {
            "Use auction type 1, 2, 3 or an exchange-specific code of 500 or above"
        }
        codes::INVALID_BANNER_WIDTH | codes::INVALID_BANNER_HEIGHT => {
            "Use positive integer banner dimensions"
        }
        codes::INVALID_FORMAT_DIMENSIONS => "Use positive w and h in every banner format entry",
        codes::NON_STANDARD_BANNER_SIZE => "Prefer a standard IAB display size",
        codes::NEGATIVE_BID_FLOOR => "Use a zero or positive bid floor",
        codes::INVALID_VIDEO_DURATION => "Set minduration no greater than maxduration",
        codes::INVALID_MIN_DURATION => "Use a non-negative minduration",
        codes::INVALID_MAX_DURATION => "Use a positive maxduration",
        codes::INVALID_CURRENCY_CODE => "Use uppercase ISO-4217 currency codes",
        codes::INVALID_TEST_FLAG => "Set test to 0 for live traffic or 1 for test traffic",
        codes::LOW_TIMEOUT => "Allow bidders at least 100ms to respond",
        codes::HIGH_TIMEOUT => "Keep tmax within a realistic real-time budget",
        codes::MALFORMED_REQUEST | codes::MALFORMED_FIELD | codes::INVALID_JSON => {
            "Send a JSON object conforming to the OpenRTB 2.6 BidRequest schema"
        }
        _ => return None,
    })
}

/// Remediation text for a set of errors, deduplicated in first-seen order.
/// Past the threshold the per-code advice stops being readable and collapses
/// into one generic recommendation.
pub fn generate_suggestions(errors: &[ValidationError]) -> Vec<String> {
    if errors.len() > GENERIC_SUGGESTION_THRESHOLD {
        return vec![GENERIC_SUGGESTION.to_string()];
    }
    let mut out: Vec<String> = Vec::new();
    for e in errors {
        let text = e
            .suggestion
            .clone()
            .or_else(|| suggestion_for_code(&e.code).map(str::to_string))
            .unwrap_or_else(|| format!("Fix {}: {}", e.field, e.message));
        if !out.contains(&text) {
            out.push(text);
        }
    }
    out
}

pub fn generate_validation_report(result: &ValidationResult) -> ValidationReport {
    // Every validated field, then any finding-bearing field not already seen.
    let mut paths: Vec<String> = result.validated_fields.clone();
    for e in &result.errors {
        if !paths.contains(&e.field) {
            paths.push(e.field.clone());
        }
    }
    for w in &result.warnings {
        if !paths.contains(&w.field) {
            paths.push(w.field.clone());
        }
    }

    let fields: Vec<FieldValidationResult> = paths
        .into_iter()
        .map(|path| {
            let errors: Vec<ValidationError> = result
                .errors
                .iter()
                .filter(|e| e.field == path)
                .cloned()
                .collect();
            let warnings: Vec<ValidationWarning> = result
                .warnings
                .iter()
                .filter(|w| w.field == path)
                .cloned()
                .collect();
            let present = !errors.iter().any(|e| marks_absent(&e.code));
            let actual_value = errors
                .iter()
                .find_map(|e| e.actual_value.clone())
                .or_else(|| warnings.iter().find_map(|w| w.actual_value.clone()));
            FieldValidationResult {
                required: is_required_path(&path),
                present,
                actual_value,
                errors,
                warnings,
                field: path,
            }
        })
        .collect();

    let error_fields = fields.iter().filter(|f| !f.errors.is_empty()).count();
    let warning_fields = fields
        .iter()
        .filter(|f| f.errors.is_empty() && !f.warnings.is_empty())
        .count();
    let summary = ReportSummary {
        total_fields: fields.len(),
        valid_fields: fields
            .iter()
            .filter(|f| f.errors.is_empty() && f.warnings.is_empty())
            .count(),
        error_fields,
        warning_fields,
        missing_required: result
            .errors
            .iter()
            .filter(|e| e.kind == ErrorKind::RequiredField)
            .count(),
    };

    let status = if !result.errors.is_empty() {
        ReportStatus::Fail
    } else if !result.warnings.is_empty() {
        ReportStatus::Warn
    } else {
        ReportStatus::Pass
    };

    let mut recommendations = generate_suggestions(&result.errors);
    for w in &result.warnings {
        if let Some(text) = w
            .suggestion
            .clone()
            .or_else(|| suggestion_for_code(&w.code).map(str::to_string))
        {
            if !recommendations.contains(&text) {
                recommendations.push(text);
            }
        }
    }

    ValidationReport {
        status,
        summary,
        fields,
        recommendations,
        metadata: ReportMetadata {
            tool_version: TOOL_VERSION.to_string(),
            spec_version: result.spec_version.clone(),
            generated_at: Utc::now(),
        },
    }
}

fn error_category(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Schema | ErrorKind::RequiredField => CATEGORY_REQUIRED,
        ErrorKind::Format | ErrorKind::Value => CATEGORY_VALUE,
        ErrorKind::Logical => CATEGORY_LOGIC,
    }
}

fn warning_category(code: &str) -> &'static str {
    match code {
        codes::INVALID_TEST_FLAG
        | codes::UNREALISTIC_BIRTH_YEAR
        | codes::LOW_TIMEOUT
        | codes::HIGH_TIMEOUT => CATEGORY_LOGIC,
        _ => CATEGORY_VALUE,
    }
}

fn priority_for(kind: ErrorKind) -> Priority {
    match kind {
        ErrorKind::Schema | ErrorKind::RequiredField => Priority::High,
        ErrorKind::Format | ErrorKind::Value => Priority::Medium,
        ErrorKind::Logical => Priority::Low,
    }
}

pub fn generate_compliance_report(result: &ValidationResult) -> ComplianceReport {
    let mut issues: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    let mut error_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut warning_counts: BTreeMap<&'static str, usize> = BTreeMap::new();

    for e in &result.errors {
        let cat = error_category(e.kind);
        issues.entry(cat).or_default().push(format!("[{}] {}", e.code, e.message));
        *error_counts.entry(cat).or_default() += 1;
    }
    for w in &result.warnings {
        let cat = warning_category(&w.code);
        issues.entry(cat).or_default().push(format!("[{}] {}", w.code, w.message));
        *warning_counts.entry(cat).or_default() += 1;
    }

    let categories = [CATEGORY_REQUIRED, CATEGORY_VALUE, CATEGORY_LOGIC]
        .into_iter()
        .map(|cat| {
            let errors = error_counts.get(cat).copied().unwrap_or(0) as f64;
            let warnings = warning_counts.get(cat).copied().unwrap_or(0) as f64;
            CategoryCompliance {
                category: cat.to_string(),
                score: (100.0 - 25.0 * errors - 10.0 * warnings).max(0.0),
                issues: issues.get(cat).cloned().unwrap_or_default(),
            }
        })
        .collect();

    let critical_issues: Vec<ValidationError> = result
        .errors
        .iter()
        .filter(|e| matches!(e.kind, ErrorKind::RequiredField | ErrorKind::Value))
        .cloned()
        .collect();

    let mut recommendations: Vec<PrioritizedRecommendation> = Vec::new();
    for e in &result.errors {
        let text = e
            .suggestion
            .clone()
            .or_else(|| suggestion_for_code(&e.code).map(str::to_string))
            .unwrap_or_else(|| format!("Fix {}: {}", e.field, e.message));
        recommendations.push(PrioritizedRecommendation {
            priority: priority_for(e.kind),
            text,
            estimated_score_impact: 15.0,
        });
    }
    for w in &result.warnings {
        let text = w
            .suggestion
            .clone()
            .or_else(|| suggestion_for_code(&w.code).map(str::to_string))
            .unwrap_or_else(|| format!("Address {}: {}", w.field, w.message));
        recommendations.push(PrioritizedRecommendation {
            priority: Priority::Low,
            text,
            estimated_score_impact: 5.0,
        });
    }
    recommendations.sort_by_key(|r| r.priority);
    let mut seen: Vec<String> = Vec::new();
    recommendations.retain(|r| {
        if seen.contains(&r.text) {
            false
        } else {
            seen.push(r.text.clone());
            true
        }
    });

    ComplianceReport {
        compliant: result.is_valid,
        compliance_level: result.compliance_level,
        score: result.compliance_score,
        categories,
        critical_issues,
        recommendations,
    }
}
