//! Pipeline error taxonomy.

use std::fmt;
use thiserror::Error;

use crate::charts::RenderError;
use crate::data::{LoaderError, ProcessorError};
use crate::export::ExportError;

/// The five ways a run can fail. Every one of them is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Parse,
    Schema,
    EmptyDataset,
    Write,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::Schema => "SchemaError",
            ErrorKind::EmptyDataset => "EmptyDatasetError",
            ErrorKind::Write => "WriteError",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Filter(#[from] ProcessorError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Load(e) => e.kind(),
            PipelineError::Filter(e) => e.kind(),
            PipelineError::Render(e) => e.kind(),
            PipelineError::Export(e) => e.kind(),
        }
    }
}
