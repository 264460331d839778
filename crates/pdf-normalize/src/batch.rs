//! Batch normalization
//!
//! Each input document is loaded, every page is normalized with that
//! document's rotation request, and the result is saved. Failures are
//! reported per document and never stop the rest of the batch. Results
//! always come back in input order.

use crate::io::{load_pdf_bytes, save_pdf_bytes};
use crate::options::NormalizeOptions;
use crate::page::{LopdfPage, normalize_page};
use crate::transport::to_data_uri;
use crate::types::*;
use lopdf::ObjectId;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::AbortHandle;

/// One document submitted to a batch
#[derive(Debug, Clone)]
pub struct DocumentInput {
    /// Display name, usually the source file name
    pub name: String,
    pub bytes: Vec<u8>,
    /// Applied identically to every page of this document
    pub rotation: RotationRequest,
}

impl DocumentInput {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, rotation: RotationRequest) -> Self {
        Self {
            name: name.into(),
            bytes,
            rotation,
        }
    }
}

/// A successfully normalized document
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub fit_center_pages: usize,
    pub stretch_pages: usize,
    /// Degenerate pages left untouched
    pub skipped_pages: usize,
}

impl NormalizedDocument {
    pub fn to_data_uri(&self) -> String {
        to_data_uri(&self.bytes)
    }
}

/// A failure attributed to one input document
#[derive(Error, Debug)]
#[error("{name} (input #{index}): {source}")]
pub struct DocumentError {
    pub index: usize,
    pub name: String,
    #[source]
    pub source: NormalizeError,
}

pub type DocumentResult = std::result::Result<NormalizedDocument, DocumentError>;

/// Progress events emitted while a batch runs
#[derive(Debug, Clone, PartialEq)]
pub enum BatchUpdate {
    Started {
        total: usize,
    },
    DocumentStarted {
        index: usize,
        name: String,
    },
    DocumentFinished {
        index: usize,
        name: String,
        /// Page count, or the error message
        result: std::result::Result<usize, String>,
    },
    Finished {
        succeeded: usize,
        failed: usize,
    },
}

#[derive(Clone)]
struct Progress(Option<mpsc::UnboundedSender<BatchUpdate>>);

impl Progress {
    fn send(&self, update: BatchUpdate) {
        if let Some(tx) = &self.0 {
            // A dropped receiver just means nobody is listening
            let _ = tx.send(update);
        }
    }

    fn document_finished(&self, index: usize, name: &str, result: &DocumentResult) {
        self.send(BatchUpdate::DocumentFinished {
            index,
            name: name.to_string(),
            result: result
                .as_ref()
                .map(|doc| doc.page_count)
                .map_err(|e| e.source.to_string()),
        });
    }
}

/// Normalize every document of a batch.
///
/// Returns `Err` only for invalid options; per-document failures are
/// reported in the returned list, one entry per input, in input order.
pub async fn normalize_batch(
    inputs: Vec<DocumentInput>,
    options: &NormalizeOptions,
) -> Result<Vec<DocumentResult>> {
    normalize_batch_with_progress(inputs, options, None).await
}

/// Same as [`normalize_batch`], reporting progress on `updates`.
pub async fn normalize_batch_with_progress(
    inputs: Vec<DocumentInput>,
    options: &NormalizeOptions,
    updates: Option<mpsc::UnboundedSender<BatchUpdate>>,
) -> Result<Vec<DocumentResult>> {
    options.validate()?;

    let progress = Progress(updates);
    progress.send(BatchUpdate::Started {
        total: inputs.len(),
    });

    let options = Arc::new(options.clone());
    let results = if options.concurrency <= 1 {
        run_sequential(inputs, options, &progress).await
    } else {
        run_concurrent(inputs, options, &progress).await
    };

    let failed = results.iter().filter(|r| r.is_err()).count();
    progress.send(BatchUpdate::Finished {
        succeeded: results.len() - failed,
        failed,
    });

    Ok(results)
}

/// One document at a time; each finishes before the next starts.
async fn run_sequential(
    inputs: Vec<DocumentInput>,
    options: Arc<NormalizeOptions>,
    progress: &Progress,
) -> Vec<DocumentResult> {
    let mut results = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.into_iter().enumerate() {
        let name = input.name.clone();
        progress.send(BatchUpdate::DocumentStarted {
            index,
            name: name.clone(),
        });

        let result = run_blocking(index, input, Arc::clone(&options)).await;
        progress.document_finished(index, &name, &result);
        results.push(result);
    }

    results
}

/// Up to `options.concurrency` documents at once, re-sequenced by index.
async fn run_concurrent(
    inputs: Vec<DocumentInput>,
    options: Arc<NormalizeOptions>,
    progress: &Progress,
) -> Vec<DocumentResult> {
    let semaphore = Arc::new(Semaphore::new(options.concurrency));
    let names: Vec<String> = inputs.iter().map(|input| input.name.clone()).collect();

    let mut tasks = TaskGuard(Vec::with_capacity(inputs.len()));
    let handles: Vec<_> = inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            let semaphore = Arc::clone(&semaphore);
            let options = Arc::clone(&options);
            let progress = progress.clone();
            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let name = input.name.clone();
                progress.send(BatchUpdate::DocumentStarted {
                    index,
                    name: name.clone(),
                });
                let result = run_blocking(index, input, options).await;
                progress.document_finished(index, &name, &result);
                result
            })
        })
        .inspect(|handle| tasks.0.push(handle.abort_handle()))
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (index, (handle, name)) in handles.into_iter().zip(names).enumerate() {
        let result = handle.await.unwrap_or_else(|e| {
            Err(DocumentError {
                index,
                name,
                source: e.into(),
            })
        });
        results.push(result);
    }
    results
}

/// Aborts the spawned document tasks when the batch future is dropped.
struct TaskGuard(Vec<AbortHandle>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        for task in &self.0 {
            task.abort();
        }
    }
}

async fn run_blocking(
    index: usize,
    input: DocumentInput,
    options: Arc<NormalizeOptions>,
) -> DocumentResult {
    let name = input.name.clone();
    tokio::task::spawn_blocking(move || normalize_document(index, &input, &options))
        .await
        .unwrap_or_else(|e| {
            Err(DocumentError {
                index,
                name,
                source: e.into(),
            })
        })
}

/// Normalize a single document synchronously.
///
/// `index` is only used to attribute a failure to its input.
pub fn normalize_document(
    index: usize,
    input: &DocumentInput,
    options: &NormalizeOptions,
) -> DocumentResult {
    normalize_document_inner(input, options).map_err(|source| DocumentError {
        index,
        name: input.name.clone(),
        source,
    })
}

fn normalize_document_inner(
    input: &DocumentInput,
    options: &NormalizeOptions,
) -> Result<NormalizedDocument> {
    let target = options.target();
    let mut doc = load_pdf_bytes(&input.bytes, options.ignore_encryption)?;
    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();

    let mut normalized = NormalizedDocument {
        name: input.name.clone(),
        bytes: Vec::new(),
        page_count: page_ids.len(),
        fit_center_pages: 0,
        stretch_pages: 0,
        skipped_pages: 0,
    };

    for (page_index, page_id) in page_ids.into_iter().enumerate() {
        let mut page = LopdfPage::new(&mut doc, page_id);
        match normalize_page(&mut page, input.rotation, target) {
            Ok(plan) => {
                log::debug!(
                    "{} page {}: {:?} scale ({}, {}) offset ({}, {}) rotate {}",
                    input.name,
                    page_index + 1,
                    plan.mode,
                    plan.content_scale.0,
                    plan.content_scale.1,
                    plan.translation.0,
                    plan.translation.1,
                    plan.final_rotation_degrees
                );
                match plan.mode {
                    ResizeMode::FitCenter => normalized.fit_center_pages += 1,
                    ResizeMode::Stretch => normalized.stretch_pages += 1,
                }
            }
            Err(NormalizeError::DegenerateGeometry { width, height })
                if options.skip_degenerate_pages =>
            {
                log::warn!(
                    "{} page {}: skipping degenerate page ({} x {})",
                    input.name,
                    page_index + 1,
                    width,
                    height
                );
                normalized.skipped_pages += 1;
            }
            Err(e) => return Err(e),
        }
    }

    normalized.bytes = save_pdf_bytes(&mut doc)?;
    log::info!(
        "Normalized {} ({} pages: {} fit-center, {} stretch, {} skipped)",
        input.name,
        normalized.page_count,
        normalized.fit_center_pages,
        normalized.stretch_pages,
        normalized.skipped_pages
    );
    Ok(normalized)
}
