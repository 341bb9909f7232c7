pub mod maintenance;
pub mod records;
pub mod stats;
pub mod workflow;
