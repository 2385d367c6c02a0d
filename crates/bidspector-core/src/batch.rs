//! Batch validation: the single-item pipeline applied independently per
//! candidate, plus aggregate statistics across the batch.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::engine::validate_request;
use crate::findings::{new_id, ValidationResult};

const TOP_CODES: usize = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFrequency {
    pub code: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_requests: usize,
    pub valid_requests: usize,
    pub invalid_requests: usize,
    pub warning_only_requests: usize,
    pub common_errors: Vec<CodeFrequency>,
    pub common_warnings: Vec<CodeFrequency>,
    pub average_compliance_score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchValidationResult {
    pub results: Vec<ValidationResult>,
    pub summary: BatchSummary,
    pub overall_compliance_score: f64,
    pub batch_id: String,
    pub timestamp: DateTime<Utc>,
}

// Top codes by occurrence, percentage relative to the batch size. Ties break
// on the code itself so repeated runs aggregate identically.
fn top_frequencies(counts: HashMap<String, usize>, total_requests: usize) -> Vec<CodeFrequency> {
    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(TOP_CODES);
    entries
        .into_iter()
        .map(|(code, count)| CodeFrequency {
            code,
            count,
            percentage: count as f64 / total_requests as f64 * 100.0,
        })
        .collect()
}

/// Validate every candidate independently; one malformed item never affects
/// a sibling's result. An empty batch returns a well-formed zero result.
pub fn validate_batch(candidates: &[Value]) -> BatchValidationResult {
    let results: Vec<ValidationResult> = candidates.iter().map(validate_request).collect();

    let total = results.len();
    let valid = results.iter().filter(|r| r.is_valid).count();
    let warning_only = results
        .iter()
        .filter(|r| r.is_valid && !r.warnings.is_empty())
        .count();

    let mut error_counts: HashMap<String, usize> = HashMap::new();
    let mut warning_counts: HashMap<String, usize> = HashMap::new();
    for r in &results {
        for e in &r.errors {
            *error_counts.entry(e.code.clone()).or_default() += 1;
        }
        for w in &r.warnings {
            *warning_counts.entry(w.code.clone()).or_default() += 1;
        }
    }

    let average = if total == 0 {
        0.0
    } else {
        results.iter().map(|r| r.compliance_score).sum::<f64>() / total as f64
    };

    let (common_errors, common_warnings) = if total == 0 {
        (Vec::new(), Vec::new())
    } else {
        (
            top_frequencies(error_counts, total),
            top_frequencies(warning_counts, total),
        )
    };

    log::info!(
        "batch validated total={} valid={} invalid={}",
        total,
        valid,
        total - valid
    );

    BatchValidationResult {
        summary: BatchSummary {
            total_requests: total,
            valid_requests: valid,
            invalid_requests: total - valid,
            warning_only_requests: warning_only,
            common_errors,
            common_warnings,
            average_compliance_score: average,
        },
        overall_compliance_score: average,
        batch_id: new_id(),
        timestamp: Utc::now(),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::codes;
    use serde_json::json;

    fn valid_request(id: &str) -> Value {
        json!({
            "id": id,
            "imp": [{"id":"i1","banner":{"w":300,"h":250}}],
            "at": 2
        })
    }

    #[test]
    fn empty_batch_returns_zero_result() {
        let batch = validate_batch(&[]);
        assert_eq!(batch.summary.total_requests, 0);
        assert_eq!(batch.summary.valid_requests, 0);
        assert_eq!(batch.overall_compliance_score, 0.0);
        assert!(batch.summary.common_errors.is_empty());
        assert!(batch.results.is_empty());
    }

    #[test]
    fn mixed_batch_counts_and_frequencies() {
        let mut invalid = valid_request("r2");
        invalid["id"] = json!("");
        let batch = validate_batch(&[valid_request("r1"), invalid]);

        assert_eq!(batch.summary.total_requests, 2);
        assert_eq!(batch.summary.valid_requests, 1);
        assert_eq!(batch.summary.invalid_requests, 1);

        let common = &batch.summary.common_errors;
        assert_eq!(common.len(), 1);
        assert_eq!(common[0].code, codes::INVALID_REQUEST_ID);
        assert_eq!(common[0].count, 1);
        assert_eq!(common[0].percentage, 50.0);
    }

    #[test]
    fn malformed_item_does_not_poison_siblings() {
        let batch = validate_batch(&[Value::Null, valid_request("r1"), json!(42)]);
        assert_eq!(batch.summary.total_requests, 3);
        assert_eq!(batch.summary.valid_requests, 1);
        assert!(batch.results[1].is_valid);
        assert!(!batch.results[0].is_valid);
        assert!(!batch.results[2].is_valid);
    }

    #[test]
    fn warning_only_requests_counted_separately() {
        let mut warned = valid_request("r2");
        warned["imp"][0]["banner"] = json!({"w": 123, "h": 456});
        let batch = validate_batch(&[valid_request("r1"), warned]);
        assert_eq!(batch.summary.valid_requests, 2);
        assert_eq!(batch.summary.warning_only_requests, 1);
        assert_eq!(
            batch.summary.common_warnings[0].code,
            codes::NON_STANDARD_BANNER_SIZE
        );
    }

    #[test]
    fn common_error_list_caps_at_ten_distinct_codes() {
        // More than ten distinct error codes across the batch; the ranking
        // must still stop at ten.
        let candidates = vec![
            json!({}),
            json!({"id":"", "imp":[{"id":"i1","banner":{"w":300,"h":250}}], "at":1}),
            json!({"id":"r", "imp":[], "at":1}),
            json!({"id":"r", "imp":[{}], "at":1}),
            json!({"id":"r", "imp":[{"id":"i1","banner":{}}], "at":1,
                   "site":{"domain":"a.example"}, "app":{"bundle":"b"}}),
            json!({"id":"r", "imp":[{"id":"i1","banner":{}},{"id":"i1","banner":{}}], "at":1}),
            json!({"id":"r", "imp":[{"id":"i1","banner":{}}], "at":9}),
            json!({"id":"r", "imp":[{"id":"i1","banner":{"w":0,"h":-1}}], "at":1}),
            json!({"id":"r", "imp":[{"id":"i1","banner":{},"bidfloor":-1.0}], "at":1}),
            json!({"id":"r", "imp":[{"id":"i1","video":{"minduration":30,"maxduration":5}}], "at":1}),
            json!({"id":"r", "imp":[{"id":"i1","video":{"minduration":-1,"maxduration":0}}], "at":1}),
            json!({"id":"r", "imp":[{"id":"i1","banner":{"format":[{"w":0,"h":50}]}}], "at":1}),
            Value::Null,
            json!({"id":"r", "imp":[{"id":"i1","banner":{}}], "at":1, "tmax":"fast"}),
        ];
        let batch = validate_batch(&candidates);

        let mut distinct: Vec<String> = Vec::new();
        for r in &batch.results {
            for e in &r.errors {
                if !distinct.contains(&e.code) {
                    distinct.push(e.code.clone());
                }
            }
        }
        assert!(distinct.len() > 10, "fixture produced {} codes", distinct.len());
        assert_eq!(batch.summary.common_errors.len(), 10);
    }

    #[test]
    fn overall_score_is_mean_of_item_scores() {
        let batch = validate_batch(&[valid_request("r1"), Value::Null]);
        let expected =
            (batch.results[0].compliance_score + batch.results[1].compliance_score) / 2.0;
        assert_eq!(batch.overall_compliance_score, expected);
        assert_eq!(batch.summary.average_compliance_score, expected);
    }
}
