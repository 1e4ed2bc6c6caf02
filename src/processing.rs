//! 文本预处理
//!
//! 负责把原始文本拆成条目、分批、以及把测试用例和预期结果配对。
//! 这里全部是纯函数，不做任何 I/O。

use thiserror::Error;

/// 批大小非法
#[derive(Debug, Error, PartialEq, Eq)]
#[error("批大小必须大于 0")]
pub struct InvalidBatchSize;

/// 将多行文本拆成条目
///
/// 每行去掉首尾空白，丢弃空行。空文本返回空列表。
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// 按固定大小切分条目，保持原顺序
///
/// 最后一批可能不满。空输入返回空列表。
pub fn batch_items<T: Clone>(items: &[T], size: usize) -> Result<Vec<Vec<T>>, InvalidBatchSize> {
    if size == 0 {
        return Err(InvalidBatchSize);
    }
    Ok(items.chunks(size).map(<[T]>::to_vec).collect())
}

/// 将测试用例与预期结果按下标配对为 `"<用例> | <结果>"`
///
/// 两边长度不同时返回 `None`，调用方必须拒绝而不是截断。
pub fn pair_items(cases: &[String], results: &[String]) -> Option<Vec<String>> {
    if cases.len() != results.len() {
        return None;
    }
    Some(
        cases
            .iter()
            .zip(results)
            .map(|(case, result)| format!("{} | {}", case, result))
            .collect(),
    )
}
