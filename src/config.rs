//! 程序配置
//!
//! 所有配置来自环境变量（可由 `.env` 提供），启动时一次性校验。
//! 任何必填项缺失或格式不对都立即返回 [`ConfigError`]，不会进入纠错流程。

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// 默认的测试用例编号前缀
pub const DEFAULT_ITEM_PREFIX: &str = "USRNM";
/// 默认并发数
pub const DEFAULT_MAX_WORKERS: usize = 4;
/// 默认单次请求超时（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// LLM 提供商
///
/// 两家都兼容 OpenAI 的 chat completion 协议，只有地址和模型名不同。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    DeepSeek,
    OpenAi,
}

impl Provider {
    /// 从 `PROVIDER` 的取值解析（不区分大小写）
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "deepseek" => Ok(Provider::DeepSeek),
            "openai" => Ok(Provider::OpenAi),
            _ => Err(ConfigError::UnsupportedProvider {
                value: value.to_string(),
            }),
        }
    }

    pub fn api_base_url(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "https://api.deepseek.com",
            Provider::OpenAi => "https://api.openai.com/v1",
        }
    }

    pub fn model_name(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "deepseek-chat",
            Provider::OpenAi => "gpt-4",
        }
    }

    /// 该提供商对应的密钥环境变量
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "DS_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "deepseek",
            Provider::OpenAi => "openai",
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub provider: Provider,
    pub api_key: String,
    /// 单次请求超时
    pub request_timeout: Duration,
    // --- 批处理配置 ---
    /// 每批发送的条目数
    pub batch_size: usize,
    /// 同时进行的请求数
    pub max_workers: usize,
    /// 测试用例编号前缀（回复解析依赖它）
    pub item_prefix: String,
    // --- 文件配置 ---
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Config {
    /// 从进程环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置
    ///
    /// 空字符串视为未设置；`HU_CODE` 只含空白时报错。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = get("PROVIDER").ok_or(ConfigError::EnvVarNotFound {
            var_name: "PROVIDER",
            example: "PROVIDER=deepseek",
        })?;
        let provider = Provider::parse(&provider)?;

        let key_var = provider.api_key_var();
        let api_key = get(key_var).ok_or(ConfigError::EnvVarNotFound {
            var_name: key_var,
            example: "sk-...",
        })?;
        if !api_key.starts_with("sk-") {
            return Err(ConfigError::InvalidApiKey {
                var_name: key_var,
                preview: api_key.chars().take(10).collect(),
            });
        }

        let batch_size = get("BATCH_SIZE").ok_or(ConfigError::EnvVarNotFound {
            var_name: "BATCH_SIZE",
            example: "BATCH_SIZE=20",
        })?;
        let batch_size = parse_positive("BATCH_SIZE", &batch_size)?;

        let item_prefix = match lookup("HU_CODE").filter(|v| !v.is_empty()) {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::BlankItemPrefix { value });
            }
            Some(value) => value.trim().to_string(),
            None => DEFAULT_ITEM_PREFIX.to_string(),
        };

        let max_workers = match get("MAX_WORKERS") {
            Some(value) => parse_positive("MAX_WORKERS", &value)?,
            None => DEFAULT_MAX_WORKERS,
        };

        let timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(value) => parse_positive("REQUEST_TIMEOUT_SECS", &value)? as u64,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let verbose_logging = match get("VERBOSE_LOGGING") {
            Some(value) => parse_bool("VERBOSE_LOGGING", &value)?,
            None => false,
        };

        Ok(Self {
            provider,
            api_key,
            request_timeout: Duration::from_secs(timeout_secs),
            batch_size,
            max_workers,
            item_prefix,
            input_dir: get("INPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/raw")),
            output_dir: get("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/processed")),
            verbose_logging,
        })
    }
}

fn parse_positive(var_name: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::EnvVarParseFailed {
            var_name,
            value: value.to_string(),
            expected_type: "正整数",
        }),
    }
}

/// 布尔值不区分大小写（`true` / `TRUE` / `False` 都可以）
fn parse_bool(var_name: &'static str, value: &str) -> Result<bool, ConfigError> {
    value
        .trim()
        .to_lowercase()
        .parse::<bool>()
        .map_err(|_| ConfigError::EnvVarParseFailed {
            var_name,
            value: value.to_string(),
            expected_type: "bool",
        })
}
