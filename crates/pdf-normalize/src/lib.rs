pub mod batch;
pub mod constants;
pub mod geometry;
mod io;
mod options;
pub mod page;
mod transport;
mod types;

pub use batch::{
    BatchUpdate, DocumentError, DocumentInput, DocumentResult, NormalizedDocument,
    normalize_batch, normalize_batch_with_progress, normalize_document,
};
pub use constants::PDF_MIME_TYPE;
pub use geometry::plan;
pub use io::{load_pdf, load_pdf_bytes, save_pdf, save_pdf_bytes};
pub use options::*;
pub use page::{LopdfPage, PagePrimitives, apply_plan, normalize_page};
pub use transport::{from_data_uri, to_data_uri};
pub use types::*;
