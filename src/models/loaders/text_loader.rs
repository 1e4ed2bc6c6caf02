use crate::error::{AppResult, FileError};
use crate::models::artifact::{
    CorrectedArtifacts, QaArtifacts, EXPECTED_RESULTS_FILE, FEEDBACK_FILE, REPORT_FILE,
    TEST_CASES_FILE, USER_STORY_FILE,
};
use serde::Serialize;
use std::path::Path;
use tokio::fs;

/// 读取单个文本文件，去掉首尾空白
async fn read_text(path: &Path, label: &'static str) -> AppResult<String> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Err(FileError::NotFound {
            label,
            path: path.display().to_string(),
        }
        .into());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;

    let text = content.trim().to_string();
    tracing::debug!("读取 {} 个字符: {}", text.chars().count(), path.display());

    if text.is_empty() {
        tracing::warn!("{}文件为空: {}", label, path.display());
    }

    Ok(text)
}

async fn write_text(path: &Path, content: &str) -> AppResult<()> {
    fs::write(path, content)
        .await
        .map_err(|source| FileError::WriteFailed {
            path: path.display().to_string(),
            source,
        })?;
    Ok(())
}

/// 从输入目录加载三个输入文件
///
/// 任何一个文件不存在都是致命错误；文件为空只记录警告。
pub async fn load_artifacts(input_dir: &Path) -> AppResult<QaArtifacts> {
    tracing::info!("正在加载输入文件: {}", input_dir.display());

    Ok(QaArtifacts {
        user_story: read_text(&input_dir.join(USER_STORY_FILE), "用户故事").await?,
        test_cases: read_text(&input_dir.join(TEST_CASES_FILE), "测试用例").await?,
        expected_results: read_text(&input_dir.join(EXPECTED_RESULTS_FILE), "预期结果").await?,
    })
}

/// 保存纠正结果，输出目录不存在时自动创建
pub async fn save_artifacts(output_dir: &Path, artifacts: &CorrectedArtifacts) -> AppResult<()> {
    ensure_dir(output_dir).await?;

    let cases_path = output_dir.join(TEST_CASES_FILE);
    write_text(&cases_path, &artifacts.test_cases).await?;
    tracing::info!("测试用例已保存至: {}", cases_path.display());

    let results_path = output_dir.join(EXPECTED_RESULTS_FILE);
    write_text(&results_path, &artifacts.expected_results).await?;
    tracing::info!("预期结果已保存至: {}", results_path.display());

    let feedback_path = output_dir.join(FEEDBACK_FILE);
    write_text(&feedback_path, &artifacts.feedback).await?;
    tracing::info!("反馈已保存至: {}", feedback_path.display());

    Ok(())
}

/// 保存运行报告（JSON）
pub async fn save_report<T: Serialize>(output_dir: &Path, report: &T) -> AppResult<()> {
    ensure_dir(output_dir).await?;
    let path = output_dir.join(REPORT_FILE);
    let json = serde_json::to_string_pretty(report)?;
    write_text(&path, &json).await?;
    tracing::info!("运行报告已保存至: {}", path.display());
    Ok(())
}

async fn ensure_dir(dir: &Path) -> AppResult<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|source| FileError::WriteFailed {
            path: dir.display().to_string(),
            source,
        })?;
    Ok(())
}
