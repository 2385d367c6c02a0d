//! Set-membership checks for protocol-coded fields.

use crate::findings::{codes, ErrorKind, Findings, ValidationError, ValidationWarning};
use crate::openrtb::{AdPosition, AuctionType, BidRequest, ConnectionType, DeviceType};

pub fn check(req: &BidRequest, out: &mut Findings) {
    if let Some(at) = req.at {
        out.field("at");
        if !AuctionType::is_known_code(at) {
            out.error(
                ValidationError::new(
                    codes::INVALID_AUCTION_TYPE,
                    ErrorKind::Value,
                    "at",
                    format!("auction type {at} is not defined by the protocol"),
                )
                .actual(at)
                .expected(serde_json::json!([1, 2, 3]))
                .suggest("use 1 (first price), 2 (second price plus), 3 (fixed price) or an exchange-specific code >= 500"),
            );
        }
    }

    if let Some(device) = &req.device {
        if let Some(devicetype) = device.devicetype {
            out.field("device.devicetype");
            if DeviceType::try_from(devicetype).is_err() {
                out.warning(
                    ValidationWarning::new(
                        codes::INVALID_DEVICE_TYPE,
                        "device.devicetype",
                        format!("device type {devicetype} is not a known code"),
                    )
                    .actual(devicetype)
                    .recommended(serde_json::json!([1, 2, 3, 4, 5, 6, 7])),
                );
            }
        }
        if let Some(connectiontype) = device.connectiontype {
            out.field("device.connectiontype");
            if ConnectionType::try_from(connectiontype).is_err() {
                out.warning(
                    ValidationWarning::new(
                        codes::INVALID_CONNECTION_TYPE,
                        "device.connectiontype",
                        format!("connection type {connectiontype} is not a known code"),
                    )
                    .actual(connectiontype)
                    .recommended(serde_json::json!([0, 1, 2, 3, 4, 5, 6, 7])),
                );
            }
        }
    }

    for (i, imp) in req.imp.iter().enumerate() {
        if let Some(pos) = imp.banner.as_ref().and_then(|b| b.pos) {
            let path = format!("imp.{i}.banner.pos");
            out.field(path.clone());
            if AdPosition::try_from(pos).is_err() {
                out.warning(
                    ValidationWarning::new(
                        codes::INVALID_BANNER_POSITION,
                        path,
                        format!("ad position {pos} is not a known code"),
                    )
                    .actual(pos)
                    .recommended(serde_json::json!([0, 1, 2, 3, 4, 5, 6, 7])),
                );
            }
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
    fn unknown_auction_type_is_an_error() {
        let out = run(json!({"id":"r1","imp":[{"id":"i1","banner":{}}],"at":9}));
        assert_eq!(out.errors.len(), 1);
        let e = &out.errors[0];
        assert_eq!(e.code, codes::INVALID_AUCTION_TYPE);
        assert_eq!(e.kind, ErrorKind::Value);
        assert_eq!(e.actual_value, Some(json!(9)));
    }

    #[test]
    fn standard_and_exchange_specific_auction_types_pass() {
        for at in [1, 2, 3, 500, 612] {
            let out = run(json!({"id":"r1","imp":[{"id":"i1","banner":{}}],"at":at}));
            assert!(out.errors.is_empty(), "at={at}");
        }
    }

    #[test]
    fn unknown_device_and_connection_types_warn() {
        let out = run(json!({
            "id":"r1",
            "imp":[{"id":"i1","banner":{}}],
            "at":1,
            "device": {"devicetype": 42, "connectiontype": 9}
        }));
        assert!(out.errors.is_empty());
        let codes_seen: Vec<_> = out.warnings.iter().map(|w| w.code.as_str()).collect();
        assert_eq!(
            codes_seen,
            vec![codes::INVALID_DEVICE_TYPE, codes::INVALID_CONNECTION_TYPE]
        );
    }

    #[test]
    fn known_device_codes_pass() {
        let out = run(json!({
            "id":"r1",
            "imp":[{"id":"i1","banner":{}}],
            "at":1,
            "device": {"devicetype": 4, "connectiontype": 2}
        }));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn banner_position_checked_per_impression() {
        let out = run(json!({
            "id":"r1",
            "imp":[
                {"id":"i1","banner":{"pos": 1}},
                {"id":"i2","banner":{"pos": 12}}
            ],
            "at":1
        }));
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].field, "imp.1.banner.pos");
        assert_eq!(out.warnings[0].code, codes::INVALID_BANNER_POSITION);
    }
}
