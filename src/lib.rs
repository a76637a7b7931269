pub mod export;
pub mod pipeline;

pub use export::{ExportDocument, write_json};
pub use pipeline::{Report, RunResult, run, trace_runs};
