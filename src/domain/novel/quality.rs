//! Novel Context - 质量评估与章节结果

use serde::{Deserialize, Serialize};

use super::{ChapterNumber, NovelError};

/// 评分上下界
pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

/// 单次质量评估结果，只在一轮迭代内使用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityEvaluation {
    /// 1-10 分
    pub score: u8,
    pub feedback: String,
    /// 质量是否达标
    pub passes: bool,
    /// 长度是否达标
    pub length_check: bool,
}

impl QualityEvaluation {
    pub fn validate(&self) -> Result<(), NovelError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&self.score) {
            return Err(NovelError::InvalidEvaluation(format!(
                "评分超出范围 {}-{}: {}",
                MIN_SCORE, MAX_SCORE, self.score
            )));
        }
        Ok(())
    }

    /// 质量达标：评估者判定通过，且评分不低于及格线
    pub fn quality_passed(&self, pass_score: u8) -> bool {
        self.passes && self.score >= pass_score
    }

    /// 接受条件：质量与长度同时达标
    pub fn verdict(&self, pass_score: u8) -> Verdict {
        match (self.quality_passed(pass_score), self.length_check) {
            (true, true) => Verdict::Accept,
            (_, false) => Verdict::Revise(Shortfall::Length),
            (false, true) => Verdict::Revise(Shortfall::Quality),
        }
    }
}

/// 评估后的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Revise(Shortfall),
}

/// 未通过的原因，长度优先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortfall {
    Length,
    Quality,
}

impl Shortfall {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shortfall::Length => "length",
            Shortfall::Quality => "quality",
        }
    }
}

/// 章节最终结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterOutcome {
    /// 通过质量与长度检查
    Accepted,
    /// 达到最大迭代次数后强制接受
    ForceAccepted,
    /// 所有尝试都没有产出草稿
    Failed,
}

impl ChapterOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterOutcome::Accepted => "accepted",
            ChapterOutcome::ForceAccepted => "force_accepted",
            ChapterOutcome::Failed => "failed",
        }
    }

    /// 章节是否已写入存储
    pub fn is_stored(&self) -> bool {
        !matches!(self, ChapterOutcome::Failed)
    }
}

/// 单章写作报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterReport {
    pub number: ChapterNumber,
    pub title: String,
    pub outcome: ChapterOutcome,
    /// 实际进行的起草次数
    pub attempts: u32,
    pub word_count: usize,
    pub last_score: Option<u8>,
    pub last_feedback: Option<String>,
}
