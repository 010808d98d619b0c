//! 文本度量与截取
//!
//! 字数按空白分隔的词元计数；截取按字符（Unicode 标量）计数，
//! 保证不会切断多字节字符。

/// 按空白分隔计数
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// 取开头最多 `max_chars` 个字符
pub fn head_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 取结尾最多 `max_chars` 个字符
pub fn tail_chars(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max_chars - 1) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

/// 文件名中不允许出现的字符
#[inline]
fn is_reserved(ch: char) -> bool {
    matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || ch.is_control()
}

/// 把小说标题转换为安全的文件名（不含扩展名）
///
/// 空白替换为下划线，移除路径分隔符与保留字符；结果为空时返回 `novel`。
pub fn sanitize_file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .filter(|ch| !is_reserved(*ch))
        .map(|ch| if ch.is_whitespace() { '_' } else { ch })
        .collect();
    let stem = stem.trim_matches('.').to_string();

    if stem.is_empty() {
        "novel".to_string()
    } else {
        stem
    }
}
