//! Census-tract income and minority classification for lending and branch
//! reporting: income-code normalisation, percentage rules, relative
//! minority banding, scope reports, peer comparison and dashboard payloads.

pub mod config;
pub mod error;
pub mod income;
pub mod minority;
pub mod payload;
pub mod peer;
pub mod percentage;
pub mod record;
pub mod report;
pub mod store;
pub mod types;
