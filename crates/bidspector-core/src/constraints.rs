//! Numeric-range and ordering checks on the offered ad slots.

use crate::findings::{codes, ErrorKind, Findings, ValidationError, ValidationWarning};
use crate::openrtb::{Banner, BidRequest, Video};
use crate::tables::is_standard_size;

pub fn check(req: &BidRequest, out: &mut Findings) {
    for (i, imp) in req.imp.iter().enumerate() {
        if let Some(banner) = &imp.banner {
            check_banner(i, banner, out);
        }
        if let Some(video) = &imp.video {
            check_video(i, video, out);
        }

        if let Some(bidfloor) = imp.bidfloor {
            out.field(format!("imp.{i}.bidfloor"));
            if bidfloor < 0.0 {
                out.error(
                    ValidationError::new(
                        codes::NEGATIVE_BID_FLOOR,
                        ErrorKind::Value,
                        format!("imp.{i}.bidfloor"),
                        "bid floor must not be negative",
                    )
                    .actual(bidfloor)
                    .suggest("set bidfloor to 0 or a positive CPM"),
                );
            }
        }

        // Same sign constraint applies to deal-level floors inside the PMP.
        if let Some(deals) = imp.pmp.as_ref().and_then(|p| p.deals.as_ref()) {
            for (j, deal) in deals.iter().enumerate() {
                if let Some(floor) = deal.bidfloor {
                    let path = format!("imp.{i}.pmp.deals.{j}.bidfloor");
                    out.field(path.clone());
                    if floor < 0.0 {
                        out.error(
                            ValidationError::new(
                                codes::NEGATIVE_BID_FLOOR,
                                ErrorKind::Value,
                                path,
                                "deal bid floor must not be negative",
                            )
                            .actual(floor),
                        );
                    }
                }
            }
        }
    }
}

fn check_banner(i: usize, banner: &Banner, out: &mut Findings) {
    if let Some(w) = banner.w {
        out.field(format!("imp.{i}.banner.w"));
        if w <= 0 {
            out.error(
                ValidationError::new(
                    codes::INVALID_BANNER_WIDTH,
                    ErrorKind::Value,
                    format!("imp.{i}.banner.w"),
                    "banner width must be a positive integer",
                )
                .actual(w),
            );
        }
    }
    if let Some(h) = banner.h {
        out.field(format!("imp.{i}.banner.h"));
        if h <= 0 {
            out.error(
                ValidationError::new(
                    codes::INVALID_BANNER_HEIGHT,
                    ErrorKind::Value,
                    format!("imp.{i}.banner.h"),
                    "banner height must be a positive integer",
                )
                .actual(h),
            );
        }
    }

    if let (Some(w), Some(h)) = (banner.w, banner.h) {
        if w > 0 && h > 0 && !is_standard_size(w, h) {
            out.warning(
                ValidationWarning::new(
                    codes::NON_STANDARD_BANNER_SIZE,
                    format!("imp.{i}.banner"),
                    format!("{w}x{h} is not a standard IAB display size"),
                )
                .actual(format!("{w}x{h}"))
                .recommended("300x250")
                .suggest("prefer a standard IAB size for broader demand"),
            );
        }
    }

    if let Some(formats) = &banner.format {
        for (j, f) in formats.iter().enumerate() {
            let path = format!("imp.{i}.banner.format.{j}");
            out.field(path.clone());
            if f.w <= 0 || f.h <= 0 {
                out.error(
                    ValidationError::new(
                        codes::INVALID_FORMAT_DIMENSIONS,
                        ErrorKind::Value,
                        path,
                        "format entries require positive w and h",
                    )
                    .actual(serde_json::json!({"w": f.w, "h": f.h})),
                );
            }
        }
    }
}

// The three duration checks are independent; a single video object can
// collect all of them.
fn check_video(i: usize, video: &Video, out: &mut Findings) {
    let path = format!("imp.{i}.video");

    if let Some(min) = video.minduration {
        out.field(format!("{path}.minduration"));
        if min < 0 {
            out.error(
                ValidationError::new(
                    codes::INVALID_MIN_DURATION,
                    ErrorKind::Value,
                    format!("{path}.minduration"),
                    "minduration must not be negative",
                )
                .actual(min),
            );
        }
    }

    if let Some(max) = video.maxduration {
        out.field(format!("{path}.maxduration"));
        if max <= 0 {
            out.error(
                ValidationError::new(
                    codes::INVALID_MAX_DURATION,
                    ErrorKind::Value,
                    format!("{path}.maxduration"),
                    "maxduration must be positive",
                )
                .actual(max),
            );
        }
    }

    if let (Some(min), Some(max)) = (video.minduration, video.maxduration) {
        if min > max {
            out.error(
                ValidationError::new(
                    codes::INVALID_VIDEO_DURATION,
                    ErrorKind::Logical,
                    path,
                    format!("minduration {min} exceeds maxduration {max}"),
                )
                .actual(serde_json::json!({"minduration": min, "maxduration": max}))
                .suggest("set minduration <= maxduration"),
            );
        }
    }
}
