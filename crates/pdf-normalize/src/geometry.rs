//! Per-page geometry decisions
//!
//! Given the current page box and rotation plus the run's target box, decide
//! whether the page is stretched or fitted and centered, and compute the
//! scale, offset and final rotation. Everything here is pure.

use crate::constants::{FULL_TURN_DEGREES, RATIO_TOLERANCE_PCT};
use crate::types::{PageBox, ResizeMode, Result, RotationRequest, TargetSpec, TransformPlan};

/// Round half away from zero.
///
/// `f64::round` already has these semantics; the wrapper pins the rule in
/// one place since mode selection at ratio boundaries depends on it.
#[inline]
pub fn round_half_away(value: f64) -> i64 {
    value.round() as i64
}

/// Aspect ratio as whole percentage points.
///
/// Divides before multiplying by 100. The order matters at `.5` boundaries:
/// `56.5 / 100 * 100` is just under 56.5 and rounds to 56.
#[inline]
pub fn ratio_pct(width: f64, height: f64) -> i64 {
    round_half_away(width / height * 100.0)
}

/// Wrap an angle into `[0, 360)`
#[inline]
pub fn normalize_degrees(degrees: i32) -> i32 {
    degrees.rem_euclid(FULL_TURN_DEGREES)
}

/// Pick the resize mode for a page against a target.
pub fn resize_mode(page: PageBox, target: TargetSpec) -> ResizeMode {
    let diff = ratio_pct(target.width, target.height) - ratio_pct(page.width, page.height);
    if diff.abs() > RATIO_TOLERANCE_PCT {
        ResizeMode::FitCenter
    } else {
        ResizeMode::Stretch
    }
}

/// Compute the transform for one page.
///
/// Fails with `DegenerateGeometry` if either box has a non-positive or
/// non-finite side.
pub fn plan(
    page: PageBox,
    current_rotation: i32,
    request: RotationRequest,
    target: TargetSpec,
) -> Result<TransformPlan> {
    let page = page.validate()?;
    let target = target.validate()?;

    let final_rotation_degrees = request.degrees() + current_rotation;

    let plan = match resize_mode(page, target) {
        ResizeMode::FitCenter => {
            let scale = (target.width / page.width).min(target.height / page.height);
            // Two separate roundings: the leftover space, then its half
            let diff_width = round_half_away(target.width - scale * page.width);
            let diff_height = round_half_away(target.height - scale * page.height);
            TransformPlan {
                mode: ResizeMode::FitCenter,
                box_size: target,
                content_scale: (scale, scale),
                translation: (
                    round_half_away(diff_width as f64 / 2.0),
                    round_half_away(diff_height as f64 / 2.0),
                ),
                final_rotation_degrees,
            }
        }
        ResizeMode::Stretch => TransformPlan {
            mode: ResizeMode::Stretch,
            box_size: target,
            content_scale: (target.width / page.width, target.height / page.height),
            translation: (0, 0),
            final_rotation_degrees,
        },
    };

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NormalizeError;

    #[test]
    fn test_round_half_away() {
        assert_eq!(round_half_away(0.5), 1);
        assert_eq!(round_half_away(1.5), 2);
        assert_eq!(round_half_away(2.5), 3);
        assert_eq!(round_half_away(-0.5), -1);
        assert_eq!(round_half_away(-2.5), -3);
        assert_eq!(round_half_away(2.4999), 2);
    }

    #[test]
    fn test_ratio_pct() {
        assert_eq!(ratio_pct(595.0, 842.0), 71);
        assert_eq!(ratio_pct(594.96, 841.92), 71);
        assert_eq!(ratio_pct(612.0, 792.0), 77);
        assert_eq!(ratio_pct(1000.0, 500.0), 200);
        // 0.705 * 100 = 70.5 rounds up
        assert_eq!(ratio_pct(70.5, 100.0), 71);
        // 0.565 is stored just below itself, so the quotient lands under 56.5
        assert_eq!(ratio_pct(56.5, 100.0), 56);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0), 0);
        assert_eq!(normalize_degrees(-90), 270);
        assert_eq!(normalize_degrees(360), 0);
        assert_eq!(normalize_degrees(450), 90);
        assert_eq!(normalize_degrees(-450), 270);
    }

    #[test]
    fn test_resize_mode_threshold() {
        let target = PageBox::new(100.0, 100.0);
        // 101 pct vs 100 pct: within tolerance
        assert_eq!(
            resize_mode(PageBox::new(101.0, 100.0), target),
            ResizeMode::Stretch
        );
        // 102 pct vs 100 pct: outside
        assert_eq!(
            resize_mode(PageBox::new(102.0, 100.0), target),
            ResizeMode::FitCenter
        );
        assert_eq!(
            resize_mode(PageBox::new(99.0, 100.0), target),
            ResizeMode::Stretch
        );
        assert_eq!(
            resize_mode(PageBox::new(98.0, 100.0), target),
            ResizeMode::FitCenter
        );
    }

    #[test]
    fn test_plan_rejects_degenerate_page() {
        let target = PageBox::new(594.96, 841.92);
        for page in [
            PageBox::new(0.0, 100.0),
            PageBox::new(100.0, 0.0),
            PageBox::new(-10.0, 100.0),
            PageBox::new(f64::NAN, 100.0),
            PageBox::new(100.0, f64::INFINITY),
        ] {
            match plan(page, 0, RotationRequest::None, target) {
                Err(NormalizeError::DegenerateGeometry { .. }) => {}
                other => panic!("Expected DegenerateGeometry, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_plan_rejects_degenerate_target() {
        let result = plan(
            PageBox::new(100.0, 100.0),
            0,
            RotationRequest::None,
            PageBox::new(0.0, 0.0),
        );
        assert!(matches!(
            result,
            Err(NormalizeError::DegenerateGeometry { .. })
        ));
    }
}
