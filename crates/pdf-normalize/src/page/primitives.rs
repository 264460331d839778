use crate::types::{PageBox, Result};

/// Low-level operations on a single page.
///
/// Readers report the page's current state; mutators change the page in
/// place. None of them make decisions, that is the job of `geometry::plan`.
pub trait PagePrimitives {
    /// Effective page box dimensions
    fn page_box(&self) -> Result<PageBox>;

    /// Effective rotation in degrees (0 when unset)
    fn rotation(&self) -> Result<i32>;

    /// Replace the box dimensions, keeping its origin
    fn set_box_size(&mut self, width: f64, height: f64) -> Result<()>;

    /// Scale drawable content about the origin
    fn scale_content(&mut self, sx: f64, sy: f64) -> Result<()>;

    /// Offset drawable content
    fn translate_content(&mut self, dx: i64, dy: i64) -> Result<()>;

    /// Scale box, content and annotations together
    fn scale_box_and_content(&mut self, sx: f64, sy: f64) -> Result<()>;

    /// Set the page rotation; implementations normalize as needed
    fn set_rotation(&mut self, degrees: i32) -> Result<()>;
}
