pub mod correction_flow;
pub mod integrity;
pub mod report;
pub mod response_extractor;

pub use correction_flow::CorrectionFlow;
pub use report::{CorrectionResult, FlowKind, FlowOutcome, FlowReport, Rejection};
pub use response_extractor::Extraction;
