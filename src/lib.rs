pub mod analyzers;
pub mod datasets;
pub mod feedback;
pub mod fetch;
pub mod output;
pub mod views;
