//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批次调度和整体运行，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `dispatcher` - 批次并发调度器
//! - 控制并发数量（Semaphore）
//! - 按提交顺序收集每个批次的回复
//!
//! ### `app` - 应用入口
//! - 加载输入产物
//! - 串联两条纠错流程
//! - 保存输出和运行报告
//!
//! ## 层次关系
//!
//! ```text
//! app (处理一组 QA 产物)
//!     ↓
//! workflow::CorrectionFlow (单条纠错流程)
//!     ↓
//! dispatcher (并发处理 Vec<Batch>)
//!     ↓
//! services (能力层：纠错服务)
//! ```

pub mod app;
pub mod dispatcher;

pub use app::{App, RunReport};
pub use dispatcher::Dispatcher;
