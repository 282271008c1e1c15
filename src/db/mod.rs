pub mod initialize;
pub mod log;
pub mod migrate;
pub mod pool;
pub mod queries;
pub mod queue;
pub mod settings;
pub mod stats;
pub mod status;
