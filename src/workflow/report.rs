//! 流程结果与诊断报告

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 纠错结果
///
/// 两个字段都为空表示"没有可用结果"，这不是错误而是约定的哨兵值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorrectionResult {
    pub corrected_text: String,
    pub feedback_text: String,
}

impl CorrectionResult {
    pub fn new(corrected_text: impl Into<String>, feedback_text: impl Into<String>) -> Self {
        Self {
            corrected_text: corrected_text.into(),
            feedback_text: feedback_text.into(),
        }
    }

    /// 空哨兵
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.corrected_text.is_empty() && self.feedback_text.is_empty()
    }
}

/// 流程种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    TestCases,
    ExpectedResults,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowKind::TestCases => write!(f, "测试用例"),
            FlowKind::ExpectedResults => write!(f, "预期结果"),
        }
    }
}

/// 结果被拒绝的原因
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// 某个输入为空
    #[error("输入为空: {field}")]
    EmptyInput { field: &'static str },

    /// 拆行后没有任何条目
    #[error("拆行后没有任何条目")]
    NoItems,

    /// 批大小为 0
    #[error("批大小必须大于 0")]
    InvalidBatchSize,

    /// 用例与结果条数不同，无法配对
    #[error("测试用例({cases})与预期结果({results})数量不一致")]
    LengthMismatch { cases: usize, results: usize },

    /// 有批次调用服务失败
    #[error("批次 {failed_batches:?} 调用服务失败")]
    ServiceFailure { failed_batches: Vec<usize> },

    /// 没有解析出任何条目
    #[error("回复中没有解析出任何条目 (期望 {expected})")]
    NothingExtracted { expected: usize },

    /// 解析出的条目数与输入不一致
    #[error("纠正后的条目数({actual})与原始条目数({expected})不一致")]
    CountMismatch { expected: usize, actual: usize },
}

/// 单个流程的诊断报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowReport {
    pub flow: FlowKind,
    pub input_items: usize,
    pub batches: usize,
    pub extracted_items: usize,
    pub observations: usize,
    pub dropped_lines: usize,
    pub failed_batches: Vec<usize>,
    /// 反馈总结调用失败（此时反馈文本是错误描述）
    pub feedback_failed: bool,
    pub rejection: Option<Rejection>,
}

impl FlowReport {
    pub fn new(flow: FlowKind) -> Self {
        Self {
            flow,
            input_items: 0,
            batches: 0,
            extracted_items: 0,
            observations: 0,
            dropped_lines: 0,
            failed_batches: Vec::new(),
            feedback_failed: false,
            rejection: None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

/// 流程输出：结果 + 报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowOutcome {
    pub result: CorrectionResult,
    pub report: FlowReport,
}

impl FlowOutcome {
    pub fn accepted(result: CorrectionResult, report: FlowReport) -> Self {
        Self { result, report }
    }

    /// 拒绝：结果一律为空哨兵
    pub fn rejected(mut report: FlowReport, rejection: Rejection) -> Self {
        report.rejection = Some(rejection);
        Self {
            result: CorrectionResult::empty(),
            report,
        }
    }
}
