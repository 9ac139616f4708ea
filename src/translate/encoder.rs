use once_cell::sync::Lazy;
use regex::Regex;

use super::interface::LanguageCode;

static NON_HAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{Han}]+").expect("valid Han script regex"));

/// Separator between the sentence and each character in an extended query
pub const SEGMENT_SEPARATOR: &str = "|";

/// Remove every character outside the Han script
pub fn strip_non_han(text: &str) -> String {
    NON_HAN_RE.replace_all(text, "").into_owned()
}

/// Han characters of `text`, in order, duplicates kept
pub fn han_characters(text: &str) -> Vec<String> {
    strip_non_han(text).chars().map(String::from).collect()
}

/// Build `text|c1|c2|...|cN` so a single provider call covers both the sentence
/// and each of its characters.
///
/// # Example
/// `extended_text("你好，我叫努曼！")` gives `你好，我叫努曼！|你|好|我|叫|努|曼`
pub fn extended_text(text: &str) -> String {
    std::iter::once(text.to_string())
        .chain(han_characters(text))
        .collect::<Vec<_>>()
        .join(SEGMENT_SEPARATOR)
}

/// Text to send to the provider: extended for Chinese sources when asked, otherwise unchanged
pub fn encode(text: &str, extended: bool, from: &LanguageCode) -> String {
    if extended && from.is_chinese() {
        extended_text(text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_text_splits_han_characters() {
        let encoded = encode("你好，我叫努曼！", true, &LanguageCode::chinese());
        assert_eq!(encoded, "你好，我叫努曼！|你|好|我|叫|努|曼");
    }

    #[test]
    fn test_extended_text_segment_count() {
        let text = "我是Numan, 你呢?";
        let encoded = encode(text, true, &LanguageCode::chinese());
        let segments: Vec<&str> = encoded.split('|').collect();

        assert_eq!(segments.len(), 4 + 1);
        assert_eq!(segments[0], text);
        assert_eq!(&segments[1..], &["我", "是", "你", "呢"]);
    }

    #[test]
    fn test_extended_text_keeps_duplicates() {
        let encoded = encode("谢谢", true, &LanguageCode::chinese());
        assert_eq!(encoded, "谢谢|谢|谢");
    }

    #[test]
    fn test_extended_text_without_han() {
        let encoded = encode("hello!", true, &LanguageCode::chinese());
        assert_eq!(encoded, "hello!");
    }

    #[test]
    fn test_not_extended_is_identity() {
        let text = "你好，世界";
        assert_eq!(encode(text, false, &LanguageCode::chinese()), text);
        assert_eq!(encode(text, false, &LanguageCode::english()), text);
    }

    #[test]
    fn test_extended_ignored_for_non_chinese_source() {
        let text = "Hello, my name is Numan!";
        assert_eq!(encode(text, true, &LanguageCode::english()), text);
        assert_eq!(encode("你好", true, &LanguageCode::new("ja")), "你好");
    }

    #[test]
    fn test_strip_non_han() {
        assert_eq!(strip_non_han("a你1好 ！"), "你好");
        assert!(han_characters("abc").is_empty());
    }
}
