//! Report synthesis, HTML rendering, and flat-file persistence.
//!
//! [`Report::synthesize`] turns a pipeline outcome into plain data,
//! [`html::render`] turns that data into a document, and [`ReportStore`]
//! owns the files on disk.

pub mod html;
mod model;
mod store;

pub use model::{DatasetOverview, Report};
pub use store::{ReportStore, StoredReport};
