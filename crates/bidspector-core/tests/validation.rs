use bidspector_core::{codes, validate_batch, validate_request, ComplianceLevel, ErrorKind};
use serde_json::{json, Value};

fn minimal_valid() -> Value {
    json!({
        "id": "r1",
        "imp": [{"id":"i1","banner":{"w":300,"h":250}}],
        "at": 2
    })
}

#[test]
fn invariants_hold_across_assorted_inputs() {
    let inputs = vec![
        Value::Null,
        json!(42),
        json!("request"),
        json!([]),
        json!({}),
        minimal_valid(),
        json!({"id":"", "imp":[], "at": 99, "site": {}, "app": {}}),
        json!({"id":"r","imp":[{"id":"a","banner":{"w":-1,"h":0}},{"id":"a"}],"at":1,"tmax":5}),
    ];
    for input in inputs {
        let result = validate_request(&input);
        assert_eq!(result.is_valid, result.errors.is_empty(), "input {input}");
        assert!(
            (0.0..=100.0).contains(&result.compliance_score),
            "score out of range for {input}"
        );
        if !result.errors.is_empty() {
            assert_eq!(result.compliance_level, ComplianceLevel::NonCompliant);
        } else if !result.warnings.is_empty() {
            assert_eq!(result.compliance_level, ComplianceLevel::Partial);
        } else {
            assert_eq!(result.compliance_level, ComplianceLevel::Compliant);
        }
    }
}

#[test]
fn null_input_is_single_root_schema_error_with_zero_score() {
    let result = validate_request(&Value::Null);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, "root");
    assert_eq!(result.errors[0].kind, ErrorKind::Schema);
    assert_eq!(result.compliance_score, 0.0);
    assert_eq!(result.compliance_level, ComplianceLevel::NonCompliant);
}

#[test]
fn minimal_valid_request_is_fully_compliant() {
    let result = validate_request(&minimal_valid());
    assert!(result.is_valid);
    assert!(result.errors.is_empty());
    assert_eq!(result.compliance_level, ComplianceLevel::Compliant);
}

#[test]
fn empty_request_id_yields_exactly_one_error() {
    let mut v = minimal_valid();
    v["id"] = json!("");
    let result = validate_request(&v);
    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, codes::INVALID_REQUEST_ID);
}

#[test]
fn duplicate_impression_id_reported_once() {
    let v = json!({
        "id": "r1",
        "imp": [
            {"id":"i1","banner":{"w":300,"h":250}},
            {"id":"i2","banner":{"w":300,"h":250}},
            {"id":"i1","banner":{"w":300,"h":250}}
        ],
        "at": 2
    });
    let result = validate_request(&v);
    assert_eq!(result.errors.len(), 1);
    let e = &result.errors[0];
    assert_eq!(e.code, codes::DUPLICATE_IMPRESSION_ID);
    assert_eq!(e.actual_value, Some(json!("i1")));
}

#[test]
fn non_standard_banner_size_is_warning_only() {
    let v = json!({
        "id": "r1",
        "imp": [{"id":"i1","banner":{"w":123,"h":456}}],
        "at": 2
    });
    let result = validate_request(&v);
    assert!(result.is_valid);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code, codes::NON_STANDARD_BANNER_SIZE);
    assert_eq!(result.warnings[0].actual_value, Some(json!("123x456")));
    assert_eq!(result.compliance_level, ComplianceLevel::Partial);
}

#[test]
fn site_app_copresence_fires_in_both_layers() {
    let mut v = minimal_valid();
    v["site"] = json!({"domain":"a.example"});
    v["app"] = json!({"bundle":"com.example"});
    let result = validate_request(&v);
    let codes_seen: Vec<_> = result.errors.iter().map(|e| e.code.as_str()).collect();
    assert!(codes_seen.contains(&codes::SITE_APP_CONFLICT));
    assert!(codes_seen.contains(&codes::SITE_APP_MUTUAL_EXCLUSION));
    assert_eq!(result.errors.len(), 2);
}

#[test]
fn batch_of_valid_and_invalid_aggregates_correctly() {
    let mut invalid = minimal_valid();
    invalid["id"] = json!("");
    let batch = validate_batch(&[minimal_valid(), invalid]);

    assert_eq!(batch.summary.total_requests, 2);
    assert_eq!(batch.summary.valid_requests, 1);
    assert_eq!(batch.summary.invalid_requests, 1);

    let freq = batch
        .summary
        .common_errors
        .iter()
        .find(|f| f.code == codes::INVALID_REQUEST_ID)
        .expect("invalid-id code ranked");
    assert_eq!(freq.count, 1);
    assert_eq!(freq.percentage, 50.0);
}

#[test]
fn batch_results_preserve_input_order() {
    let batch = validate_batch(&[Value::Null, minimal_valid()]);
    assert!(!batch.results[0].is_valid);
    assert!(batch.results[1].is_valid);
}

#[test]
fn every_result_carries_metadata() {
    let result = validate_request(&minimal_valid());
    assert_eq!(result.validation_id.len(), 32);
    assert_eq!(result.spec_version, "2.6");
    assert!(!result.validated_fields.is_empty());
}

#[test]
fn results_serialize_with_wire_field_names() {
    let result = validate_request(&json!({"id":"", "imp":[{"id":"i1","banner":{}}], "at":1}));
    let v = serde_json::to_value(&result).unwrap();
    assert_eq!(v["isValid"], json!(false));
    assert_eq!(v["complianceLevel"], json!("non-compliant"));
    assert!(v["complianceScore"].is_number());
    assert!(v["validatedFields"].is_array());
    assert_eq!(v["errors"][0]["type"], json!("format"));
    assert_eq!(v["errors"][0]["severity"], json!("error"));
}
