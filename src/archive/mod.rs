pub mod extractor;

pub use extractor::{default_repository_name, extract, ArchiveFormat, ExtractionSummary};
