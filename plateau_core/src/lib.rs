#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Plateau detection for multi-channel temperature logs (I/O-free).
//!
//! ## Architecture
//!
//! - **Series**: column-major table of named channels plus time (`series` module)
//! - **Scanner**: fixed-size window stability test at a stride (`scanner` module)
//! - **Assembler**: merges stable windows into candidates and drops near-duplicates
//!   by the first channel's starting value (`assembler` module)
//! - **Summary**: per-plateau min/mean/max table, auto-detected or explicit ranges
//! - **Sync**: shifts the time axis to a reference temperature crossing
//! - **Analysis**: one-call pipeline driven by `AnalysisOptions`
//!
//! Everything here is synchronous and side-effect free apart from `tracing`
//! events; independent files may be analyzed in parallel.

pub mod analysis;
pub mod assembler;
pub mod channels;
pub mod config;
pub mod conversions;
pub mod error;
pub mod mocks;
pub mod scanner;
pub mod series;
pub mod sink;
pub mod summary;
pub mod sync;

pub use analysis::{AnalysisOptions, FileReport, analyze_series};
pub use assembler::{Plateau, PlateauAssembler, find_distinct_plateaus, plateau_mask};
pub use channels::{resolve_channels, select_temperature_channels};
pub use config::{DEFAULT_STEP_SIZE, ScanParams, TimeSync};
pub use error::{PlateauError, Result};
pub use scanner::{StabilityScanner, WindowVerdict};
pub use series::Series;
pub use sink::SummarySink;
pub use summary::{
    ChannelStats, ExplicitPlateauSpec, PlateauSource, PlateauSummary, SummaryTable,
    plateau_label, summarize, summarize_plateaus,
};
pub use sync::{SyncOutcome, synchronize};
