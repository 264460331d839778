//! Page mutation for normalization
//!
//! This module applies a `TransformPlan` to a page:
//! - `PagePrimitives` is the per-page boundary to the PDF library
//! - `LopdfPage` implements it over an `lopdf::Document`
//! - `apply_plan` sequences the primitive calls for each resize mode

mod lopdf_page;
mod mutator;
mod primitives;

pub use lopdf_page::LopdfPage;
pub use mutator::{apply_plan, normalize_page};
pub use primitives::PagePrimitives;
