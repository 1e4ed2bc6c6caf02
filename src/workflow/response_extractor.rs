//! 回复解析
//!
//! 服务回复是逐行的半结构化文本，每行按开头的标记归类：
//!
//! - `OBS...` 观察记录
//! - `<编号前缀>...` / `ExpRes...` 纠正后的条目
//! - 其他行忽略，但计数
//!
//! 测试用例的回复是"合并行"格式 `OBS[n]: 说明, USRNM001 ...`，
//! 条目部分从编号前缀开始截到同一行下一个 `OBS` 之前（或行尾）。

/// 观察记录前缀
pub const OBS_PREFIX: &str = "OBS";
/// 预期结果前缀
pub const EXPECTED_RESULT_PREFIX: &str = "ExpRes";

/// 单行的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyLine<'a> {
    /// 合并行：可能同时带观察记录和条目
    Combined {
        observation: Option<&'a str>,
        item: Option<&'a str>,
    },
    Observation(&'a str),
    Item(&'a str),
    Unrecognized,
}

/// 一次解析的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub observations: Vec<String>,
    pub items: Vec<String>,
    /// 无法识别而被丢弃的非空行数
    pub dropped_lines: usize,
}

impl Extraction {
    /// 观察记录按行拼接
    pub fn observations_text(&self) -> String {
        self.observations.join("\n")
    }

    fn push(&mut self, line: ReplyLine<'_>) {
        match line {
            ReplyLine::Combined { observation, item } => {
                if let Some(observation) = observation {
                    self.observations.push(observation.to_string());
                }
                if let Some(item) = item {
                    self.items.push(item.to_string());
                }
                if observation.is_none() && item.is_none() {
                    self.dropped_lines += 1;
                }
            }
            ReplyLine::Observation(text) => self.observations.push(text.to_string()),
            ReplyLine::Item(text) => self.items.push(text.to_string()),
            ReplyLine::Unrecognized => self.dropped_lines += 1,
        }
    }
}

/// 截取从 `item_prefix` 第一次出现到其后第一个 `obs_prefix`（不含）之间的文本
///
/// 没有后续 `obs_prefix` 时截到行尾。结果去掉末尾空白，所以
/// `USRNM001 x OBS` 得到 `USRNM001 x`，不保留 `OBS` 前的空格
/// （用前瞻正则 `USRNM.*?(?=OBS|$)` 截取会保留这个空格）。
pub fn slice_item<'a>(line: &'a str, obs_prefix: &str, item_prefix: &str) -> Option<&'a str> {
    if item_prefix.is_empty() {
        return None;
    }
    let start = line.find(item_prefix)?;
    let rest = &line[start..];
    let end = if obs_prefix.is_empty() {
        rest.len()
    } else {
        rest[item_prefix.len()..]
            .find(obs_prefix)
            .map(|offset| item_prefix.len() + offset)
            .unwrap_or(rest.len())
    };
    let item = rest[..end].trim_end();
    Some(item)
}

/// 合并行格式的单行分类
pub fn classify_combined<'a>(line: &'a str, obs_prefix: &str, item_prefix: &str) -> ReplyLine<'a> {
    let observation = (!obs_prefix.is_empty() && line.starts_with(obs_prefix)).then_some(line);
    let item = slice_item(line, obs_prefix, item_prefix);
    ReplyLine::Combined { observation, item }
}

/// 键值行格式的单行分类：`<标记><n>: <文本>`
///
/// 以第一个冒号切分，取右侧并去空白；没有冒号时取整行。
pub fn classify_keyed<'a>(line: &'a str, obs_prefix: &str, item_prefix: &str) -> ReplyLine<'a> {
    let value = match line.split_once(':') {
        Some((_, right)) => right.trim(),
        None => line.trim(),
    };
    if line.starts_with(obs_prefix) {
        ReplyLine::Observation(value)
    } else if line.starts_with(item_prefix) {
        ReplyLine::Item(value)
    } else {
        ReplyLine::Unrecognized
    }
}

/// 解析测试用例纠正的回复
pub fn extract_combined<'a, I>(lines: I, obs_prefix: &str, item_prefix: &str) -> Extraction
where
    I: IntoIterator<Item = &'a str>,
{
    let mut extraction = Extraction::default();
    for line in lines.into_iter().filter(|l| !l.trim().is_empty()) {
        extraction.push(classify_combined(line, obs_prefix, item_prefix));
    }
    extraction
}

/// 解析预期结果纠正的回复
pub fn extract_keyed<'a, I>(lines: I, obs_prefix: &str, item_prefix: &str) -> Extraction
where
    I: IntoIterator<Item = &'a str>,
{
    let mut extraction = Extraction::default();
    for line in lines.into_iter().filter(|l| !l.trim().is_empty()) {
        extraction.push(classify_keyed(line, obs_prefix, item_prefix));
    }
    extraction
}
