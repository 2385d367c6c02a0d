//! Rules spanning two or more top-level sections of the request.

use chrono::{Datelike, Utc};

use crate::findings::{codes, ErrorKind, Findings, ValidationError, ValidationWarning};
use crate::openrtb::BidRequest;
use crate::tables::{HIGH_TMAX_MS, LOW_TMAX_MS, MIN_PLAUSIBLE_YOB};

pub fn check(req: &BidRequest, out: &mut Findings) {
    // Also caught by the schema pass under SITE_APP_CONFLICT; both layers
    // fire on purpose so the condition survives even if one layer is
    // bypassed.
    if req.site.is_some() && req.app.is_some() {
        out.error(
            ValidationError::new(
                codes::SITE_APP_MUTUAL_EXCLUSION,
                ErrorKind::Logical,
                "site/app",
                "a request must describe a site or an app, never both",
            )
            .suggest("specify either site or app, not both"),
        );
    }

    if let Some(device) = &req.device {
        if let Some(lmt) = device.lmt {
            out.field("device.lmt");
            if lmt != 0 && lmt != 1 {
                out.warning(
                    ValidationWarning::new(
                        codes::INVALID_LMT_VALUE,
                        "device.lmt",
                        "lmt (limit ad tracking) should be 0 or 1",
                    )
                    .actual(lmt)
                    .recommended(serde_json::json!([0, 1])),
                );
            }
        }
        if let Some(dnt) = device.dnt {
            out.field("device.dnt");
            if dnt != 0 && dnt != 1 {
                out.warning(
                    ValidationWarning::new(
                        codes::INVALID_DNT_VALUE,
                        "device.dnt",
                        "dnt (do not track) should be 0 or 1",
                    )
                    .actual(dnt)
                    .recommended(serde_json::json!([0, 1])),
                );
            }
        }
    }

    if let Some(yob) = req.user.as_ref().and_then(|u| u.yob) {
        out.field("user.yob");
        let this_year = i64::from(Utc::now().year());
        if !(MIN_PLAUSIBLE_YOB..=this_year).contains(&yob) {
            out.warning(
                ValidationWarning::new(
                    codes::UNREALISTIC_BIRTH_YEAR,
                    "user.yob",
                    format!("year of birth outside {MIN_PLAUSIBLE_YOB}-{this_year}"),
                )
                .actual(yob)
                .suggest("send a four-digit year of birth, or omit the field"),
            );
        }
    }

    if let Some(tmax) = req.tmax {
        out.field("tmax");
        if tmax < LOW_TMAX_MS {
            out.warning(
                ValidationWarning::new(
                    codes::LOW_TIMEOUT,
                    "tmax",
                    format!("tmax of {tmax}ms leaves bidders little time to respond"),
                )
                .actual(tmax)
                .recommended(LOW_TMAX_MS),
            );
        } else if tmax > HIGH_TMAX_MS {
            out.warning(
                ValidationWarning::new(
                    codes::HIGH_TIMEOUT,
                    "tmax",
                    format!("tmax of {tmax}ms is unusually high for real-time bidding"),
                )
                .actual(tmax)
                .recommended(HIGH_TMAX_MS),
            );
        }
    }
}
