//! QA 产物
//!
//! 输入：用户故事、测试用例、预期结果；输出：纠正后的用例、预期结果和反馈。
//! 核心流程只和这里的内存字符串打交道，文件读写见 [`crate::models::loaders`]。

use serde::Serialize;

/// 用户故事文件名
pub const USER_STORY_FILE: &str = "UserStory.txt";
/// 测试用例文件名
pub const TEST_CASES_FILE: &str = "TestCases.txt";
/// 预期结果文件名
pub const EXPECTED_RESULTS_FILE: &str = "expectedResults.txt";
/// 反馈文件名
pub const FEEDBACK_FILE: &str = "feedback.txt";
/// 运行报告文件名
pub const REPORT_FILE: &str = "report.json";

/// 输入产物
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QaArtifacts {
    pub user_story: String,
    pub test_cases: String,
    pub expected_results: String,
}

/// 输出产物
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorrectedArtifacts {
    pub test_cases: String,
    pub expected_results: String,
    pub feedback: String,
}

impl CorrectedArtifacts {
    /// 合并两条流程的反馈，中间空一行；空反馈跳过
    pub fn combine_feedback(cases_feedback: &str, results_feedback: &str) -> String {
        [cases_feedback, results_feedback]
            .iter()
            .filter(|text| !text.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
