//! Business rules local to one field or one repeated structure.

use std::collections::HashSet;

use crate::findings::{codes, ErrorKind, Findings, ValidationError, ValidationWarning};
use crate::openrtb::BidRequest;
use crate::tables::is_valid_currency;

pub fn check(req: &BidRequest, out: &mut Findings) {
    // One error per distinct duplicated id, however many times it repeats.
    let mut seen: HashSet<&str> = HashSet::new();
    let mut reported: HashSet<&str> = HashSet::new();
    for imp in &req.imp {
        if !imp.id.is_empty() && !seen.insert(&imp.id) && reported.insert(&imp.id) {
            out.error(
                ValidationError::new(
                    codes::DUPLICATE_IMPRESSION_ID,
                    ErrorKind::Logical,
                    "imp[].id",
                    format!("impression id '{}' appears more than once", imp.id),
                )
                .actual(imp.id.clone())
                .suggest("ensure impression ids are unique within the request"),
            );
        }
    }

    for (i, imp) in req.imp.iter().enumerate() {
        out.field(format!("imp.{i}"));
        if imp.media_type().is_none() {
            out.error(
                ValidationError::new(
                    codes::MISSING_AD_FORMAT,
                    ErrorKind::Logical,
                    format!("imp.{i}"),
                    format!("impression {i} has no ad format object"),
                )
                .expected(serde_json::json!(["banner", "video", "audio", "native"]))
                .suggest("attach exactly one of banner, video, audio or native"),
            );
        }

        if let Some(cur) = &imp.bidfloorcur {
            out.field(format!("imp.{i}.bidfloorcur"));
            if !is_valid_currency(cur) {
                out.warning(
                    ValidationWarning::new(
                        codes::INVALID_CURRENCY_CODE,
                        format!("imp.{i}.bidfloorcur"),
                        format!("'{cur}' is not a recognized ISO-4217 currency code"),
                    )
                    .actual(cur.clone())
                    .recommended("USD")
                    .suggest("use an uppercase ISO-4217 code such as USD or EUR"),
                );
            }
        }
    }

    if let Some(cur) = &req.cur {
        for (i, code) in cur.iter().enumerate() {
            out.field(format!("cur.{i}"));
            if !is_valid_currency(code) {
                out.warning(
                    ValidationWarning::new(
                        codes::INVALID_CURRENCY_CODE,
                        format!("cur.{i}"),
                        format!("'{code}' is not a recognized ISO-4217 currency code"),
                    )
                    .actual(code.clone())
                    .suggest("use an uppercase ISO-4217 code such as USD or EUR"),
                );
            }
        }
    }

    if let Some(test) = req.test {
        out.field("test");
        if test != 0 && test != 1 {
            out.warning(
                ValidationWarning::new(
                    codes::INVALID_TEST_FLAG,
                    "test",
                    "test flag should be 0 (live) or 1 (test)",
                )
                .actual(test)
                .recommended(serde_json::json!([0, 1])),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(v: serde_json::Value) -> Findings {
        let req: BidRequest = serde_json::from_value(v).unwrap();
        let mut out = Findings::default();
        check(&req, &mut out);
        out
    }

    #[test]
    fn duplicate_imp_id_reported_once_per_value() {
        let out = run(json!({
            "id": "r1",
            "imp": [
                {"id":"i1","banner":{}},
                {"id":"i2","banner":{}},
                {"id":"i1","banner":{}},
                {"id":"i1","banner":{}}
            ],
            "at": 1
        }));
        assert_eq!(out.errors.len(), 1);
        let e = &out.errors[0];
        assert_eq!(e.code, codes::DUPLICATE_IMPRESSION_ID);
        assert_eq!(e.field, "imp[].id");
        assert_eq!(e.actual_value, Some(json!("i1")));
    }

    #[test]
    fn two_distinct_duplicates_reported_separately() {
        let out = run(json!({
            "id": "r1",
            "imp": [
                {"id":"a","banner":{}},
                {"id":"a","banner":{}},
                {"id":"b","banner":{}},
                {"id":"b","banner":{}}
            ],
            "at": 1
        }));
        assert_eq!(out.errors.len(), 2);
        let dup_values: Vec<_> = out.errors.iter().filter_map(|e| e.actual_value.clone()).collect();
        assert_eq!(dup_values, vec![json!("a"), json!("b")]);
    }

    #[test]
    fn impression_without_ad_format_flagged() {
        let out = run(json!({
            "id": "r1",
            "imp": [{"id":"i1"}, {"id":"i2","video":{"mimes":["video/mp4"]}}],
            "at": 1
        }));
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].code, codes::MISSING_AD_FORMAT);
        assert_eq!(out.errors[0].field, "imp.0");
    }

    #[test]
    fn unknown_bidfloorcur_warns() {
        let out = run(json!({
            "id": "r1",
            "imp": [{"id":"i1","banner":{},"bidfloor":0.5,"bidfloorcur":"DOGE"}],
            "at": 1
        }));
        assert!(out.errors.is_empty());
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].code, codes::INVALID_CURRENCY_CODE);
        assert_eq!(out.warnings[0].field, "imp.0.bidfloorcur");
    }

    #[test]
    fn request_level_cur_checked_per_entry() {
        let out = run(json!({
            "id": "r1",
            "imp": [{"id":"i1","banner":{}}],
            "at": 1,
            "cur": ["USD", "BEANS"]
        }));
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].field, "cur.1");
    }

    #[test]
    fn test_flag_outside_binary_warns() {
        let out = run(json!({
            "id": "r1",
            "imp": [{"id":"i1","banner":{}}],
            "at": 1,
            "test": 7
        }));
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].code, codes::INVALID_TEST_FLAG);

        let clean = run(json!({
            "id": "r1",
            "imp": [{"id":"i1","banner":{}}],
            "at": 1,
            "test": 1
        }));
        assert!(clean.warnings.is_empty());
    }
}
