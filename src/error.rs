//! 错误类型定义
//!
//! 只有两类错误会真正中断运行：配置错误（启动前）和文件错误（读写产物）。
//! 调度池本身失败同样是致命的。
//! 单个批次的服务调用失败、输入为空、条数对不上等情况都属于"软失败"，
//! 不走这里，而是以 [`crate::workflow::Rejection`] 的形式记录在流程报告中。

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),

    /// 并发调度错误
    #[error("调度错误: {0}")]
    Dispatch(#[from] DispatchError),

    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 配置错误
///
/// 每个变体都指明出问题的环境变量，便于运维直接定位。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 环境变量不存在或为空
    #[error("环境变量 {var_name} 不存在 (示例: {example})")]
    EnvVarNotFound {
        var_name: &'static str,
        example: &'static str,
    },

    /// 提供商不受支持
    #[error("PROVIDER 无效: '{value}'，只支持 'deepseek' 或 'openai'")]
    UnsupportedProvider { value: String },

    /// API 密钥格式不对
    #[error("{var_name} 必须以 'sk-' 开头 (当前值: {preview}...)")]
    InvalidApiKey {
        var_name: &'static str,
        preview: String,
    },

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: &'static str,
        value: String,
        expected_type: &'static str,
    },

    /// 编号前缀为空白
    #[error("HU_CODE 无效: '{value}'，必须是非空字符串")]
    BlankItemPrefix { value: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在 ({label}): {path}")]
    NotFound { label: &'static str, path: String },

    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 调度池错误
///
/// 单个 worker 的业务失败不会出现在这里（服务层从不抛错），
/// 只有任务本身 panic / 被取消或者信号量被关闭才算。
#[derive(Debug, Error)]
pub enum DispatchError {
    /// 并发许可获取失败
    #[error("无法获取并发许可: {0}")]
    PoolClosed(#[from] tokio::sync::AcquireError),

    /// worker 任务异常退出
    #[error("批次 {batch_index} 的任务执行失败: {source}")]
    WorkerAborted {
        batch_index: usize,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON序列化失败: {}", err))
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
