//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：输出启动信息、创建纠错流程
//! 2. **加载输入**：读取用户故事、测试用例、预期结果
//! 3. **串联流程**：先纠正测试用例，再用纠正后的用例纠正预期结果
//! 4. **保存输出**：纠正结果、合并后的反馈、运行报告
//! 5. **全局统计**：汇总两条流程的结果

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{self, CorrectedArtifacts, QaArtifacts};
use crate::utils::logging;
use crate::workflow::{CorrectionFlow, FlowReport};
use serde::Serialize;
use tracing::info;

/// 一次运行的报告
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub finished_at: String,
    pub test_cases: FlowReport,
    pub expected_results: FlowReport,
}

/// 应用主结构
pub struct App {
    config: Config,
    flow: CorrectionFlow,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        logging::log_startup(&config);
        let flow = CorrectionFlow::new(&config);
        Self { config, flow }
    }

    /// 使用自定义流程初始化（测试中注入脚本化服务）
    pub fn with_flow(config: Config, flow: CorrectionFlow) -> Self {
        Self { config, flow }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<RunReport> {
        let artifacts = models::load_artifacts(&self.config.input_dir).await?;

        let (corrected, report) = self.correct(&artifacts).await?;

        models::save_artifacts(&self.config.output_dir, &corrected).await?;
        models::save_report(&self.config.output_dir, &report).await?;

        logging::print_final_stats(
            &[&report.test_cases, &report.expected_results],
            &self.config.output_dir,
        );

        Ok(report)
    }

    /// 对内存中的产物执行两条纠错流程
    ///
    /// 预期结果流程使用纠正后的测试用例；测试用例流程没有结果时退回原始用例。
    pub async fn correct(
        &self,
        artifacts: &QaArtifacts,
    ) -> AppResult<(CorrectedArtifacts, RunReport)> {
        let cases_outcome = self
            .flow
            .correct_test_cases(&artifacts.user_story, &artifacts.test_cases)
            .await?;
        logging::log_flow_report(&cases_outcome.report);

        let cases_for_results = if cases_outcome.result.corrected_text.is_empty() {
            info!("测试用例没有可用的纠正结果，预期结果流程使用原始用例");
            artifacts.test_cases.as_str()
        } else {
            cases_outcome.result.corrected_text.as_str()
        };

        let results_outcome = self
            .flow
            .correct_expected_results(
                &artifacts.user_story,
                cases_for_results,
                &artifacts.expected_results,
            )
            .await?;
        logging::log_flow_report(&results_outcome.report);

        info!("反馈摘要:\n{}", cases_outcome.result.feedback_text);

        let corrected = CorrectedArtifacts {
            feedback: CorrectedArtifacts::combine_feedback(
                &cases_outcome.result.feedback_text,
                &results_outcome.result.feedback_text,
            ),
            test_cases: cases_outcome.result.corrected_text,
            expected_results: results_outcome.result.corrected_text,
        };

        let report = RunReport {
            finished_at: chrono::Local::now().to_rfc3339(),
            test_cases: cases_outcome.report,
            expected_results: results_outcome.report,
        };

        Ok((corrected, report))
    }
}
