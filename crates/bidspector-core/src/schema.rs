//! Structural pass over the raw candidate. Runs before any typed decoding,
//! so nothing here may assume shape: the input can be null, a scalar, or an
//! arbitrarily nested object.

use serde_json::Value;
use thiserror::Error;

use crate::findings::{codes, ErrorKind, Findings, ValidationError};
use crate::openrtb::BidRequest;

/// Nesting bound for candidate trees. A `serde_json::Value` cannot be cyclic,
/// but an adversarially deep one could still exhaust the stack during typed
/// decoding, so anything deeper is rejected wholesale.
pub const MAX_CANDIDATE_DEPTH: usize = 64;

#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("candidate is not a JSON object")]
    NotAnObject,
    #[error("candidate nests deeper than {MAX_CANDIDATE_DEPTH} levels")]
    TooDeep,
    #[error("candidate does not decode as a bid request: {0}")]
    Decode(#[from] serde_json::Error),
}

fn root_error(message: &str) -> ValidationError {
    ValidationError::new(codes::MALFORMED_REQUEST, ErrorKind::Schema, "root", message)
        .suggest("send a JSON object conforming to the OpenRTB 2.6 BidRequest schema")
}

fn exceeds_depth(v: &Value, remaining: usize) -> bool {
    if remaining == 0 {
        return true;
    }
    match v {
        Value::Array(items) => items.iter().any(|i| exceeds_depth(i, remaining - 1)),
        Value::Object(map) => map.values().any(|i| exceeds_depth(i, remaining - 1)),
        _ => false,
    }
}

fn present(obj: &serde_json::Map<String, Value>, key: &str) -> bool {
    obj.get(key).is_some_and(|v| !v.is_null())
}

/// Verify the candidate's structural shape and required fields. Returns
/// `false` when the candidate is not a well-formed container at all; in that
/// case `out` holds the single root schema error and no further checking is
/// useful for this item.
pub fn check(candidate: &Value, out: &mut Findings) -> bool {
    let obj = match candidate {
        Value::Object(map) => map,
        Value::Null => {
            out.error(root_error("request is null"));
            return false;
        }
        other => {
            out.error(root_error("request must be a JSON object").actual(other.clone()));
            return false;
        }
    };

    if exceeds_depth(candidate, MAX_CANDIDATE_DEPTH) {
        out.error(root_error("request nesting exceeds the supported depth"));
        return false;
    }

    out.field("id");
    match obj.get("id") {
        None | Some(Value::Null) => out.error(
            ValidationError::new(
                codes::REQUIRED_FIELD_MISSING,
                ErrorKind::RequiredField,
                "id",
                "request id is required",
            )
            .suggest("set id to a unique, non-empty string"),
        ),
        Some(Value::String(s)) if s.trim().is_empty() => out.error(
            ValidationError::new(
                codes::INVALID_REQUEST_ID,
                ErrorKind::Format,
                "id",
                "request id must be a non-empty string",
            )
            .actual(s.clone())
            .suggest("set id to a unique, non-empty string"),
        ),
        Some(Value::String(_)) => {}
        Some(other) => out.error(
            ValidationError::new(
                codes::INVALID_REQUEST_ID,
                ErrorKind::Format,
                "id",
                "request id must be a string",
            )
            .actual(other.clone())
            .expected("string"),
        ),
    }

    out.field("imp");
    match obj.get("imp") {
        None | Some(Value::Null) => out.error(
            ValidationError::new(
                codes::REQUIRED_FIELD_MISSING,
                ErrorKind::RequiredField,
                "imp",
                "at least one impression is required",
            )
            .suggest("add an imp array with at least one impression object"),
        ),
        Some(Value::Array(imps)) if imps.is_empty() => out.error(
            ValidationError::new(
                codes::MISSING_IMPRESSIONS,
                ErrorKind::RequiredField,
                "imp",
                "imp array must not be empty",
            )
            .suggest("add an imp array with at least one impression object"),
        ),
        Some(Value::Array(imps)) => {
            for (i, imp) in imps.iter().enumerate() {
                let path = format!("imp.{i}.id");
                out.field(path.clone());
                let id_ok = imp
                    .get("id")
                    .and_then(Value::as_str)
                    .is_some_and(|s| !s.trim().is_empty());
                if !id_ok {
                    out.error(
                        ValidationError::new(
                            codes::MISSING_IMPRESSION_ID,
                            ErrorKind::RequiredField,
                            path,
                            format!("impression {i} has no id"),
                        )
                        .suggest("give every impression a non-empty id, unique within the request"),
                    );
                }
            }
        }
        Some(other) => out.error(
            ValidationError::new(
                codes::MISSING_IMPRESSIONS,
                ErrorKind::RequiredField,
                "imp",
                "imp must be an array of impression objects",
            )
            .actual(other.clone())
            .expected("array"),
        ),
    }

    out.field("at");
    if !present(obj, "at") {
        out.error(
            ValidationError::new(
                codes::REQUIRED_FIELD_MISSING,
                ErrorKind::RequiredField,
                "at",
                "auction type (at) is required",
            )
            .expected(serde_json::json!([1, 2, 3]))
            .suggest("set at to 1 (first price) or 2 (second price plus)"),
        );
    }

    let has_site = present(obj, "site");
    let has_app = present(obj, "app");
    if has_site {
        out.field("site");
    }
    if has_app {
        out.field("app");
    }
    if has_site && has_app {
        out.error(
            ValidationError::new(
                codes::SITE_APP_CONFLICT,
                ErrorKind::Logical,
                "site/app",
                "site and app are mutually exclusive",
            )
            .suggest("specify either site or app, not both"),
        );
    }

    true
}

/// Decode the structurally vetted candidate into the typed model. Wrong JSON
/// types inside the tree surface here as [`CandidateError::Decode`].
pub fn decode(candidate: &Value) -> Result<BidRequest, CandidateError> {
    match candidate {
        Value::Object(_) => {
            if exceeds_depth(candidate, MAX_CANDIDATE_DEPTH) {
                return Err(CandidateError::TooDeep);
            }
            Ok(serde_json::from_value(candidate.clone())?)
        }
        _ => Err(CandidateError::NotAnObject),
    }
}
