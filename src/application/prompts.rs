//! 提示词
//!
//! 各 Agent 的系统指令以及每一步的用户消息构造。
//! 只负责拼接文本，截取长度由调用方决定。

use crate::domain::novel::{ChapterContent, ChapterNumber, ChapterOutline, NovelOutline};

pub const OUTLINE_INSTRUCTIONS: &str = "\
你是小说大纲创建专家。根据用户的需求创建完整的小说大纲：
- 标题、类型、主题、背景
- 情节概要
- 每章的标题、摘要、关键事件、涉及角色、场景
- 全部角色的名称列表
叙事结构要有清晰的开端、发展和结局，冲突与解决合理。只输出符合要求结构的 JSON。";

pub const CHARACTER_INSTRUCTIONS: &str = "\
你是角色塑造专家。把大纲中的角色名称发展为立体的角色档案：
- 详细背景
- 性格特点
- 内在与外在目标
- 内部与外部冲突
- 在故事中的成长弧线
角色要真实、有缺陷。只输出符合要求结构的 JSON。";

pub const CHAPTER_WRITER_INSTRUCTIONS: &str = "\
你是专业的小说章节撰写人。根据章节大纲和给出的前后文写出完整章节：
- 遵循大纲，保持角色声音一致
- 描写生动，对话、动作与叙述保持平衡
- 每章至少 4000 字，情节丰富、细节充分
只输出符合要求结构的 JSON。";

pub const SECTION_WRITER_INSTRUCTIONS: &str = "\
你是专业的小说分段撰写人，每次只写章节的一个部分：
- 开头：引入场景和角色，设定基调
- 中间：发展冲突，推进事件
- 结尾：给出本章的结局或悬念，为下一章铺垫
与给出的前文无缝衔接，风格一致。只输出符合要求结构的 JSON。";

pub const SUMMARY_INSTRUCTIONS: &str = "\
你是章节摘要专家。针对给出的章节内容：
1. 写一段 200-300 字的摘要，包含关键事件和角色变化
2. 提取章节结尾部分（约 500 字）作为下一章的衔接线索
只输出符合要求结构的 JSON。";

pub const QUALITY_EVALUATOR_INSTRUCTIONS: &str = "\
你负责严格评估小说章节的质量：
1. 给出 1-10 分评分
2. 写出具体反馈（优点与不足）
3. 分数不低于 8 分时 passes 为 true
4. 章节不少于 4000 字时 length_check 为 true
只输出符合要求结构的 JSON。";

/// 章节基本信息，所有起草请求共用
pub fn chapter_brief(number: ChapterNumber, outline: &ChapterOutline) -> String {
    format!(
        "第{}章: {}\n章节摘要: {}\n关键事件: {}\n场景: {}\n涉及角色: {}",
        number,
        outline.title,
        outline.summary,
        outline.key_events.join(", "),
        outline.setting,
        outline.characters_involved.join(", "),
    )
}

/// 上一轮评估的修改意见
fn revision_block(revision_notes: Option<&str>) -> String {
    match revision_notes {
        Some(notes) if !notes.trim().is_empty() => {
            format!("\n\n上一稿未通过评估，本次重写需要解决以下问题：\n{}", notes)
        }
        _ => String::new(),
    }
}

pub fn opening_prompt(
    context: &str,
    brief: &str,
    target_words: usize,
    revision_notes: Option<&str>,
) -> String {
    format!(
        "{context}{brief}{revision}\n\n\
请撰写这一章的开头部分（约{target_words}字）：\n\
- 场景描述\n- 引入主要人物\n- 设定章节基调\n- 引出本章主要事件\n\n\
section_type 填 opening，字数不少于{target_words}字。",
        context = context,
        brief = brief,
        revision = revision_block(revision_notes),
        target_words = target_words,
    )
}

pub fn middle_prompt(
    brief: &str,
    opening_tail: &str,
    target_words: usize,
    revision_notes: Option<&str>,
) -> String {
    format!(
        "{brief}{revision}\n\n本章开头部分的结尾：\n{opening_tail}\n\n\
请接着撰写本章的中间部分（约{target_words}字）：\n\
- 发展主要冲突和事件\n- 展示角色互动\n- 增加紧张度或复杂性\n\n\
section_type 填 middle，字数不少于{target_words}字，衔接流畅。",
        brief = brief,
        revision = revision_block(revision_notes),
        opening_tail = opening_tail,
        target_words = target_words,
    )
}

pub fn ending_prompt(
    brief: &str,
    opening_head: &str,
    middle_tail: &str,
    target_words: usize,
    revision_notes: Option<&str>,
) -> String {
    format!(
        "{brief}{revision}\n\n本章前文片段：\n开头：{opening_head}……\n中间部分结尾：{middle_tail}\n\n\
请完成本章的结尾部分（约{target_words}字）：\n\
- 解决或推进本章的主要冲突\n- 展示角色的反应和情感变化\n- 为下一章埋下伏笔\n\n\
section_type 填 ending，字数不少于{target_words}字，与前文无缝衔接。",
        brief = brief,
        revision = revision_block(revision_notes),
        opening_head = opening_head,
        middle_tail = middle_tail,
        target_words = target_words,
    )
}

pub fn expansion_prompt(
    brief: &str,
    current_words: usize,
    draft_head: &str,
    draft_tail: &str,
    min_words: usize,
    revision_notes: Option<&str>,
) -> String {
    format!(
        "{brief}{revision}\n\n目前章节只有{current_words}字，需要扩写。\n\
开头：{draft_head}……（中间内容省略）……结尾：{draft_tail}\n\n\
请在保持原有情节走向的前提下扩写整章，使总字数达到至少{min_words}字：\n\
- 增加场景描写\n- 扩展角色对话\n- 增加内心活动\n- 丰富情节细节\n\n\
返回扩写后的完整章节。",
        brief = brief,
        revision = revision_block(revision_notes),
        current_words = current_words,
        draft_head = draft_head,
        draft_tail = draft_tail,
        min_words = min_words,
    )
}

pub fn evaluation_prompt(
    number: ChapterNumber,
    outline: &ChapterOutline,
    chapter: &ChapterContent,
    min_words: usize,
) -> String {
    format!(
        "评估第{number}章的质量。\n\n\
章节大纲:\n标题: {title}\n摘要: {summary}\n关键事件: {events}\n\n\
章节标题: {chapter_title}\n字数: {words}\n\n章节内容:\n{content}\n\n\
请重点关注:\n1. 文学质量和吸引力（情节、描写、对话）\n2. 与大纲和人物设定的一致性\n\
3. 内容长度是否至少{min_words}字",
        number = number,
        title = outline.title,
        summary = outline.summary,
        events = outline.key_events.join(", "),
        chapter_title = chapter.title,
        words = chapter.word_count(),
        content = chapter.content,
        min_words = min_words,
    )
}

pub fn summary_prompt(title: &str, content_head: &str, truncated: bool, ending: &str) -> String {
    let ellipsis = if truncated { "……" } else { "" };
    format!(
        "为以下章节创建摘要。\n\n章节标题：{title}\n\n章节内容：\n{content_head}{ellipsis}\n\n\
章节结尾：\n{ending}\n\n请给出：\n1. 简明扼要的摘要（200-300字）\n2. 章节结尾部分（约500字）",
        title = title,
        content_head = content_head,
        ellipsis = ellipsis,
        ending = ending,
    )
}

pub fn character_prompt(outline: &NovelOutline) -> String {
    let chapters: Vec<String> = outline
        .chapters
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "第{}章 {}: {}（涉及角色: {}）",
                i + 1,
                c.title,
                c.summary,
                c.characters_involved.join(", ")
            )
        })
        .collect();

    format!(
        "根据以下大纲开发详细的角色档案。\n\n\
标题: {title}\n类型: {genre}\n主题: {theme}\n背景: {setting}\n情节概要: {plot}\n\
角色: {names}\n\n章节:\n{chapters}\n\n为每个角色输出一份档案，角色名与大纲保持一致。",
        title = outline.title,
        genre = outline.genre,
        theme = outline.theme,
        setting = outline.setting,
        plot = outline.plot_summary,
        names = outline.characters.join(", "),
        chapters = chapters.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline() -> ChapterOutline {
        ChapterOutline {
            title: "开端".to_string(),
            summary: "林远回到山城".to_string(),
            key_events: vec!["抵达".to_string(), "重逢".to_string()],
            characters_involved: vec!["林远".to_string(), "苏晴".to_string()],
            setting: "山城车站".to_string(),
        }
    }

    #[test]
    fn test_chapter_brief_lists_outline_fields() {
        let brief = chapter_brief(ChapterNumber::first(), &outline());
        assert!(brief.starts_with("第1章: 开端"));
        assert!(brief.contains("抵达, 重逢"));
        assert!(brief.contains("林远, 苏晴"));
    }

    #[test]
    fn test_revision_notes_are_optional() {
        let without = middle_prompt("brief", "tail", 2000, None);
        assert!(!without.contains("上一稿未通过评估"));

        let with = middle_prompt("brief", "tail", 2000, Some("对话太少"));
        assert!(with.contains("上一稿未通过评估"));
        assert!(with.contains("对话太少"));

        let blank = middle_prompt("brief", "tail", 2000, Some("  "));
        assert!(!blank.contains("上一稿未通过评估"));
    }
}
