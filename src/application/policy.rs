//! 写作策略 - 字数目标、迭代上限与上下文截取长度

use crate::domain::novel::SectionKind;

/// 章节写作策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritingPolicy {
    /// 章节最低字数，不足时触发扩写
    pub min_chapter_words: usize,
    /// 每章最多起草次数
    pub max_iterations: u32,
    /// 质量及格分
    pub pass_score: u8,
    /// 开头目标字数
    pub opening_words: usize,
    /// 中间目标字数
    pub middle_words: usize,
    /// 结尾目标字数
    pub ending_words: usize,
    /// 衔接用的前文片段长度（字符）
    pub excerpt_chars: usize,
    /// 写结尾时提供的开头片段长度（字符）
    pub opening_lead_chars: usize,
    /// 摘要请求中正文的最大长度（字符）
    pub summary_input_chars: usize,
}

impl Default for WritingPolicy {
    fn default() -> Self {
        Self {
            min_chapter_words: 4000,
            max_iterations: 3,
            pass_score: 8,
            opening_words: 1500,
            middle_words: 2000,
            ending_words: 1500,
            excerpt_chars: 500,
            opening_lead_chars: 300,
            summary_input_chars: 2000,
        }
    }
}

impl WritingPolicy {
    pub fn target_words(&self, kind: SectionKind) -> usize {
        match kind {
            SectionKind::Opening => self.opening_words,
            SectionKind::Middle => self.middle_words,
            SectionKind::Ending => self.ending_words,
        }
    }
}
