pub mod exporter;
pub mod file_scanner;
pub mod metadata;
