//! # QA Redactor
//!
//! 借助 LLM 纠正 QA 产物（测试用例、预期结果）中拼写和语法错误的工具
//!
//! ## 架构设计
//!
//! ### ① 预处理（Processing）
//! - `processing` - 拆行、分批、用例与结果配对，全部是纯函数
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `CorrectionClient` - 调用 DeepSeek / OpenAI 的纠错能力
//! - `prompts` - 提示词与行前缀协议
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义一条纠错流程
//! - `response_extractor` - 按行前缀解析回复
//! - `integrity` - 条目数校验
//! - `CorrectionFlow` - 流程编排（拆行 → 分批 → 调度 → 解析 → 校验 → 反馈）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/dispatcher` - 有界并发、按提交顺序收集结果
//! - `orchestrator/app` - 读取输入、串联流程、保存输出
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod processing;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, Provider};
pub use error::{AppError, AppResult};
pub use orchestrator::{App, Dispatcher, RunReport};
pub use services::{CorrectionClient, CorrectionService, ServiceReply};
pub use workflow::{CorrectionFlow, CorrectionResult, FlowOutcome, FlowReport, Rejection};
