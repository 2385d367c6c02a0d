//! Pipeline orchestration and the score fold.
//!
//! `validate_request` is the single-item contract consumed by the API layer:
//! it never panics outward and always returns a complete result, whatever
//! the input looks like.

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::Utc;
use serde_json::Value;

use crate::findings::{
    codes, new_id, ComplianceLevel, ErrorKind, Findings, ValidationError, ValidationResult,
};
use crate::openrtb::BidRequest;
use crate::tables::SPEC_VERSION;
use crate::{constraints, crossfield, enums, rules, schema};

const ERROR_PENALTY: f64 = 15.0;
const WARNING_PENALTY: f64 = 5.0;
const COVERAGE_PENALTY: f64 = 1.0;

/// Validate one candidate bid request. Total: any internal fault is caught
/// here and converted into the generic malformed-input result rather than
/// propagating to the caller.
pub fn validate_request(candidate: &Value) -> ValidationResult {
    match catch_unwind(AssertUnwindSafe(|| run_pipeline(candidate))) {
        Ok(result) => result,
        Err(_) => {
            log::error!("validation fault; converting to non-compliant result");
            let mut findings = Findings::default();
            findings.error(ValidationError::new(
                codes::INTERNAL_VALIDATION_FAULT,
                ErrorKind::Schema,
                "root",
                "request could not be validated",
            ));
            assemble(findings, None, true)
        }
    }
}

/// Convenience entry point for raw JSON text. Unparseable input is reported
/// the same way as any other malformed candidate, not as an `Err`.
pub fn validate_json_str(raw: &str) -> ValidationResult {
    match serde_json::from_str::<Value>(raw) {
        Ok(candidate) => validate_request(&candidate),
        Err(e) => {
            let mut findings = Findings::default();
            findings.error(
                ValidationError::new(
                    codes::INVALID_JSON,
                    ErrorKind::Schema,
                    "root",
                    format!("request body is not valid JSON: {e}"),
                )
                .suggest("send a JSON object conforming to the OpenRTB 2.6 BidRequest schema"),
            );
            assemble(findings, None, true)
        }
    }
}

fn run_pipeline(candidate: &Value) -> ValidationResult {
    let mut findings = Findings::default();

    if !schema::check(candidate, &mut findings) {
        return assemble(findings, None, true);
    }

    match schema::decode(candidate) {
        Ok(req) => {
            rules::check(&req, &mut findings);
            crossfield::check(&req, &mut findings);
            enums::check(&req, &mut findings);
            constraints::check(&req, &mut findings);
            log::info!(
                "validated id={} errors={} warnings={}",
                req.id,
                findings.errors.len(),
                findings.warnings.len()
            );
            assemble(findings, Some(&req), false)
        }
        Err(err) => {
            findings.error(
                ValidationError::new(codes::MALFORMED_FIELD, ErrorKind::Format, "root", err.to_string())
                    .suggest("check field types against the OpenRTB 2.6 schema"),
            );
            assemble(findings, None, false)
        }
    }
}

// Optional sections a complete request is expected to carry; absence costs
// score but never affects the compliance level.
fn missing_recommended(req: &BidRequest) -> usize {
    let mut missing = 0;
    if req.site.is_none() && req.app.is_none() {
        missing += 1;
    }
    if req.device.is_none() {
        missing += 1;
    }
    if req.user.is_none() {
        missing += 1;
    }
    if req.cur.is_none() {
        missing += 1;
    }
    if req.tmax.is_none() {
        missing += 1;
    }
    missing
}

fn assemble(findings: Findings, req: Option<&BidRequest>, malformed: bool) -> ValidationResult {
    let Findings {
        errors,
        warnings,
        fields,
    } = findings;

    let compliance_score = if malformed {
        0.0
    } else {
        let mut score = 100.0
            - ERROR_PENALTY * errors.len() as f64
            - WARNING_PENALTY * warnings.len() as f64;
        if let Some(req) = req {
            score -= COVERAGE_PENALTY * missing_recommended(req) as f64;
        }
        score.clamp(0.0, 100.0)
    };

    let compliance_level = if !errors.is_empty() {
        ComplianceLevel::NonCompliant
    } else if !warnings.is_empty() {
        ComplianceLevel::Partial
    } else {
        ComplianceLevel::Compliant
    };

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        compliance_level,
        compliance_score,
        validated_fields: fields,
        validation_id: new_id(),
        timestamp: Utc::now(),
        spec_version: SPEC_VERSION.to_string(),
    }
}
