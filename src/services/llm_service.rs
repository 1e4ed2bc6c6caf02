//! LLM 服务 - 业务能力层
//!
//! 只负责"调用纠错服务"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - DeepSeek 与 OpenAI 共用同一套请求格式，只切换地址和模型
//!
//! ## 失败语义
//! 这一层从不向上抛错：任何网络/服务失败都变成 [`ServiceReply::Failure`]，
//! 这样同时运行的其他批次不受影响，由流程层统一判定结果是否可用。

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::{Config, Provider};
use crate::services::prompts;

/// 服务调用的种类，决定失败时的错误文案
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOperation {
    SpellingCorrection,
    FeedbackSummary,
    ExpectedResultCorrection,
}

/// 一次服务调用的失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFailure {
    pub operation: ServiceOperation,
    pub message: String,
}

impl fmt::Display for ServiceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation {
            ServiceOperation::SpellingCorrection => {
                write!(f, "Error al corregir ortografía: {}", self.message)
            }
            ServiceOperation::FeedbackSummary | ServiceOperation::ExpectedResultCorrection => {
                write!(f, "Error: {}", self.message)
            }
        }
    }
}

/// 服务回复：要么是模型原文，要么是失败描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceReply {
    Text(String),
    Failure(ServiceFailure),
}

impl ServiceReply {
    pub fn failure(operation: ServiceOperation, message: impl Into<String>) -> Self {
        ServiceReply::Failure(ServiceFailure {
            operation,
            message: message.into(),
        })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ServiceReply::Failure(_))
    }

    /// 按旧的文本协议渲染（失败时是错误描述字符串）
    pub fn into_text(self) -> String {
        match self {
            ServiceReply::Text(text) => text,
            ServiceReply::Failure(failure) => failure.to_string(),
        }
    }
}

/// 纠错服务能力
///
/// 流程层只依赖这个 trait，测试里可以换成脚本化的实现。
#[async_trait]
pub trait CorrectionService: Send + Sync {
    /// 纠正一批测试用例的拼写，`context` 为用户故事
    async fn correct_spelling(&self, context: &str, batch: &[String]) -> ServiceReply;

    /// 把观察记录总结成一段反馈
    async fn summarize_feedback(&self, observations: &str) -> ServiceReply;

    /// 纠正一批 `"<用例> | <结果>"` 中的预期结果
    async fn correct_expected_results(&self, pairs: &[String]) -> ServiceReply;
}

/// 纠错服务客户端
///
/// 职责：
/// - 按协议构建提示词
/// - 调用 chat completion 接口
/// - 把任何失败转成 [`ServiceReply::Failure`]
pub struct CorrectionClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    item_prefix: String,
    request_timeout: Duration,
}

impl CorrectionClient {
    /// 创建新的纠错客户端
    pub fn new(config: &Config) -> Self {
        Self::with_provider(
            config.provider,
            &config.api_key,
            &config.item_prefix,
            config.request_timeout,
        )
    }

    pub fn with_provider(
        provider: Provider,
        api_key: &str,
        item_prefix: &str,
        request_timeout: Duration,
    ) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(provider.api_base_url());

        Self {
            client: Client::with_config(openai_config),
            model_name: provider.model_name().to_string(),
            item_prefix: item_prefix.to_string(),
            request_timeout,
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// 一条系统消息 + 若干条用户消息，返回去掉首尾空白的回复文本。
    async fn send_to_llm(&self, system_message: &str, user_messages: &[String]) -> Result<String> {
        debug!(
            "调用 LLM API，模型: {}，用户消息 {} 条，共 {} 字符",
            self.model_name,
            user_messages.len(),
            user_messages.iter().map(String::len).sum::<usize>()
        );

        let mut messages = Vec::with_capacity(user_messages.len() + 1);

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::System(system_msg));

        for content in user_messages {
            let user_msg = ChatCompletionRequestUserMessageArgs::default()
                .content(content.as_str())
                .build()?;
            messages.push(ChatCompletionRequestMessage::User(user_msg));
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.3)
            .max_tokens(4096u32)
            .build()?;

        let response = tokio::time::timeout(self.request_timeout, self.client.chat().create(request))
            .await
            .map_err(|_| anyhow::anyhow!("请求超时 ({:?})", self.request_timeout))?
            .map_err(|e| anyhow::anyhow!("LLM API 调用失败: {}", e))?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }

    async fn call(
        &self,
        operation: ServiceOperation,
        system_message: &str,
        user_messages: &[String],
    ) -> ServiceReply {
        match self.send_to_llm(system_message, user_messages).await {
            Ok(text) => ServiceReply::Text(text),
            Err(e) => {
                error!("调用纠错服务失败 ({:?}): {}", operation, e);
                ServiceReply::failure(operation, e.to_string())
            }
        }
    }
}

#[async_trait]
impl CorrectionService for CorrectionClient {
    async fn correct_spelling(&self, context: &str, batch: &[String]) -> ServiceReply {
        let prompt = prompts::build_spelling_prompt(context, batch, &self.item_prefix);
        self.call(
            ServiceOperation::SpellingCorrection,
            prompts::SPELLING_SYSTEM,
            &[prompt],
        )
        .await
    }

    async fn summarize_feedback(&self, observations: &str) -> ServiceReply {
        let prompt = prompts::build_feedback_prompt(observations);
        self.call(
            ServiceOperation::FeedbackSummary,
            prompts::FEEDBACK_SYSTEM,
            &[prompt],
        )
        .await
    }

    async fn correct_expected_results(&self, pairs: &[String]) -> ServiceReply {
        let pairs_text = prompts::flatten_pairs(pairs);
        let messages = prompts::build_expected_results_messages(&pairs_text);
        self.call(
            ServiceOperation::ExpectedResultCorrection,
            prompts::EXPECTED_RESULTS_SYSTEM,
            &messages,
        )
        .await
    }
}
