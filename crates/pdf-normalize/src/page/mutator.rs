//! Plan application

use super::PagePrimitives;
use crate::geometry;
use crate::types::{ResizeMode, Result, RotationRequest, TargetSpec, TransformPlan};

/// Issue the primitive calls for a plan, in order.
///
/// FitCenter resizes the box, scales and then translates the content as
/// separate steps. Stretch uses the combined box-and-content scale and has
/// no translation. Both end by setting the rotation.
pub fn apply_plan<P: PagePrimitives + ?Sized>(page: &mut P, plan: &TransformPlan) -> Result<()> {
    let (sx, sy) = plan.content_scale;
    match plan.mode {
        ResizeMode::FitCenter => {
            page.set_box_size(plan.box_size.width, plan.box_size.height)?;
            page.scale_content(sx, sy)?;
            let (dx, dy) = plan.translation;
            page.translate_content(dx, dy)?;
        }
        ResizeMode::Stretch => {
            page.scale_box_and_content(sx, sy)?;
        }
    }
    page.set_rotation(plan.final_rotation_degrees)
}

/// Read a page, plan its transform and apply it.
pub fn normalize_page<P: PagePrimitives + ?Sized>(
    page: &mut P,
    request: RotationRequest,
    target: TargetSpec,
) -> Result<TransformPlan> {
    let page_box = page.page_box()?;
    let rotation = page.rotation()?;
    let plan = geometry::plan(page_box, rotation, request, target)?;
    apply_plan(page, &plan)?;
    Ok(plan)
}
