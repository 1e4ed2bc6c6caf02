//! 条目数校验
//!
//! 纠正后的条目必须与原始条目一一对应，否则整批结果作废，不做部分替换。

use crate::workflow::report::Rejection;

/// 校验解析出的条目数
///
/// 什么都没解析出来时返回 [`Rejection::NothingExtracted`]，
/// 数量不一致时返回 [`Rejection::CountMismatch`]。
pub fn validate(extracted: Vec<String>, original_count: usize) -> Result<Vec<String>, Rejection> {
    if extracted.is_empty() {
        return Err(Rejection::NothingExtracted {
            expected: original_count,
        });
    }
    if extracted.len() != original_count {
        return Err(Rejection::CountMismatch {
            expected: original_count,
            actual: extracted.len(),
        });
    }
    Ok(extracted)
}
