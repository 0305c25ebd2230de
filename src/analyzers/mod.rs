//! Filtering and aggregation over the loaded datasets.
//!
//! Everything here is a pure function of a [`crate::datasets::StationTable`]
//! or [`crate::datasets::DeploymentTable`]; nothing is cached between calls.

pub mod aggregate;
pub mod filter;
pub mod types;
pub mod utility;
