//! Client-side pipeline for previewing, filtering and exporting job-offer
//! records to CSV, with a persisted log of past exports.

pub mod cli;
pub mod config;
pub mod export;
pub mod filter;
pub mod history;
pub mod logging;
pub mod record;
pub mod session;
pub mod util;
pub mod view;
