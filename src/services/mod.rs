pub mod analysis;
pub mod log_sink;

pub use analysis::AnalysisService;
pub use log_sink::LogSink;
