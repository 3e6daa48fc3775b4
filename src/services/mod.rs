//! Services Layer
//!
//! Business logic between the CLI commands and the storage/engine layers.
//! Commands stay thin; services own parsing, computation and persistence
//! and return plain result structs the command layer renders.
//!
//! # Services
//!
//! - `IngestService` - Parse and store participant open interest files
//! - `AnalysisService` - Run the derived-metrics engine, summarize the database
//! - `ExportService` - Write the derived table to CSV
//! - `SpotService` - Store manual or fetched NIFTY closing prices

pub mod analysis_service;
pub mod export_service;
pub mod ingest_service;
pub mod spot_service;

// Re-export commonly used types and services
pub use analysis_service::{AnalysisService, SummaryResult};
pub use export_service::{ExportService, ExportResult};
pub use ingest_service::{IngestService, IngestReport};
pub use spot_service::{SpotService, SpotResult};
