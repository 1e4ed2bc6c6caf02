pub mod llm_service;
pub mod prompts;

pub use llm_service::{
    CorrectionClient, CorrectionService, ServiceFailure, ServiceOperation, ServiceReply,
};
