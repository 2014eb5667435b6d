//! Data module - CSV loading and latitude filtering

mod loader;
mod processor;

pub use loader::{DataLoader, Dataset, LoaderError, LATITUDE, LONGITUDE, REQUIRED_COLUMNS};
pub use processor::{DataProcessor, FilteredDataset, ProcessorError, LATITUDE_THRESHOLD};

pub(crate) use loader::is_numeric;
