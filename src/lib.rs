pub mod aggregate;
pub mod charts;
pub mod config;
pub mod fake_feed;
pub mod ingest;
pub mod labels;
pub mod logging;
pub mod metrics;
pub mod persist;
pub mod report_export;
pub mod state;
pub mod workbook_export;
pub mod worker;
