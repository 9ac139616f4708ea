//! Decoders turning provider answers into `{translation, transcription}`.
//!
//! The raw provider answer is a positional nested array. It is validated once
//! against [`RawResponse`] and everything after that works on named fields.

use serde_json::Value;
use tracing::debug;

use super::encoder::{han_characters, SEGMENT_SEPARATOR};
use super::interface::{DecodedResult, PinyinLookup, RawDecoded};
use crate::error::TranslateError;

// Positions inside the provider's nested array
const TRANSCRIPT_BASE_INDEX: usize = 0;
const TRANSLATION_BASE_INDEX: usize = 5;
const FRAGMENT_SOURCE_INDEX: usize = 0;
const FRAGMENT_CANDIDATES_INDEX: usize = 2;
const CANDIDATE_TEXT_INDEX: usize = 0;
const TRANSLATION_TRANSCRIPTION_INDEX: usize = 2;
const WORD_TRANSCRIPTION_INDEX: usize = 3;

/// Closing segment of the transcript group
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub translation_transcription: Option<String>,
    pub word_transcription: Option<String>,
}

/// One punctuation-split piece of the sentence with its candidate translations,
/// oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub source: Option<String>,
    pub candidates: Vec<Option<String>>,
    latest: String,
}

impl Fragment {
    /// The provider appends revisions, so the last candidate is the one to use
    pub fn latest(&self) -> &str {
        &self.latest
    }
}

/// Schema of the raw provider response, restricted to what is decoded
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub transcript: TranscriptSegment,
    pub fragments: Vec<Fragment>,
}

impl RawResponse {
    pub fn from_value(raw: &Value) -> Result<Self, TranslateError> {
        let root = raw
            .as_array()
            .ok_or_else(|| TranslateError::malformed("response is not an array"))?;

        let transcript_base = non_empty_group(root, TRANSCRIPT_BASE_INDEX, "transcript")?;
        let closing = transcript_base
            .last()
            .and_then(Value::as_array)
            .ok_or_else(|| {
                TranslateError::malformed("last transcript segment is not an array")
            })?;
        let transcript = TranscriptSegment {
            translation_transcription: optional_str(
                closing,
                TRANSLATION_TRANSCRIPTION_INDEX,
                "translation transcription",
            )?,
            word_transcription: optional_str(closing, WORD_TRANSCRIPTION_INDEX, "word transcription")?,
        };

        let translation_base = non_empty_group(root, TRANSLATION_BASE_INDEX, "translation")?;
        let fragments = translation_base
            .iter()
            .enumerate()
            .map(|(i, entry)| parse_fragment(i, entry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            transcript,
            fragments,
        })
    }

    /// Fragments re-assembled left to right, no separator
    pub fn translation(&self) -> String {
        self.fragments.iter().map(Fragment::latest).collect()
    }
}

fn non_empty_group<'a>(
    root: &'a [Value],
    index: usize,
    name: &str,
) -> Result<&'a Vec<Value>, TranslateError> {
    let group = root
        .get(index)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            TranslateError::malformed(format!("{} group (index {}) is missing", name, index))
        })?;
    if group.is_empty() {
        return Err(TranslateError::malformed(format!(
            "{} group (index {}) is empty",
            name, index
        )));
    }
    Ok(group)
}

fn optional_str(
    segment: &[Value],
    index: usize,
    name: &str,
) -> Result<Option<String>, TranslateError> {
    match segment.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(TranslateError::malformed(format!(
            "{} is not a string: {}",
            name, other
        ))),
    }
}

fn parse_fragment(position: usize, entry: &Value) -> Result<Fragment, TranslateError> {
    let fields = entry.as_array().ok_or_else(|| {
        TranslateError::malformed(format!("fragment {} is not an array", position))
    })?;

    let candidates = fields
        .get(FRAGMENT_CANDIDATES_INDEX)
        .and_then(Value::as_array)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            TranslateError::malformed(format!("fragment {} has no candidates", position))
        })?;

    let candidates: Vec<Option<String>> = candidates
        .iter()
        .map(|c| {
            c.get(CANDIDATE_TEXT_INDEX)
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect();

    let latest = candidates.last().cloned().flatten().ok_or_else(|| {
        TranslateError::malformed(format!(
            "last candidate of fragment {} has no text",
            position
        ))
    })?;

    Ok(Fragment {
        source: fields
            .get(FRAGMENT_SOURCE_INDEX)
            .and_then(Value::as_str)
            .map(str::to_string),
        candidates,
        latest,
    })
}

/// Decode a raw nested-array response
pub fn decode_raw(raw: &Value) -> Result<RawDecoded, TranslateError> {
    let response = RawResponse::from_value(raw)?;
    for fragment in &response.fragments {
        debug!(
            "Fragment '{}': {} candidate(s), using '{}'",
            fragment.source.as_deref().unwrap_or("-"),
            fragment.candidates.len(),
            fragment.latest()
        );
    }

    Ok(RawDecoded {
        translation: response.translation(),
        word_transcription: response.transcript.word_transcription,
        translation_transcription: response.transcript.translation_transcription,
    })
}

/// Upper-case the first character only
pub fn first_capital(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Decode a flat list of translations (sentence first, then one per Han character).
///
/// `pinyin` is the romanization of the whole `original_text`; per-character
/// romanizations are looked up here and fall back to the character itself.
pub fn decode_list(
    translated_texts: &[String],
    pinyin: &str,
    original_text: &str,
    romanizer: &dyn PinyinLookup,
) -> Result<DecodedResult, TranslateError> {
    if translated_texts.is_empty() {
        return Err(TranslateError::TranslationFailed {
            text: original_text.to_string(),
            message: "provider returned no translations".to_string(),
        });
    }

    let translation = first_capital(&translated_texts.join(SEGMENT_SEPARATOR).to_lowercase());

    let mut segments = vec![pinyin.to_string()];
    for character in han_characters(original_text) {
        match romanizer.romanize(&character) {
            Ok(romanized) => segments.push(romanized.trim().to_string()),
            Err(e) => {
                debug!("No pinyin for '{}', keeping the character: {}", character, e);
                segments.push(character);
            }
        }
    }
    let transcription = segments.join(SEGMENT_SEPARATOR).to_lowercase();

    Ok(DecodedResult {
        translation,
        transcription,
    })
}

/// Merge the two transcription sources into the single output field.
///
/// Pairs without romanization (e.g. `en -> fr`) carry neither source and get an
/// empty transcription. An answer with no translation and no transcription at
/// all has nothing to mask and fails.
pub fn normalize(decoded: RawDecoded) -> Result<DecodedResult, TranslateError> {
    let transcription = decoded
        .word_transcription
        .as_deref()
        .filter(|w| !w.is_empty())
        .or(decoded.translation_transcription.as_deref())
        .map(str::to_string);

    if decoded.translation.is_empty() && transcription.as_deref().map_or(true, str::is_empty) {
        return Err(TranslateError::ResultMaskingFailed {
            message: "response carries neither translation nor transcription".to_string(),
            data: serde_json::json!(decoded),
        });
    }

    Ok(DecodedResult {
        translation: decoded.translation,
        transcription: transcription.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Answer for `你好，我叫努曼！！！` with two revisions per fragment
    fn punctuated_response() -> Value {
        json!([
            [
                ["Hello, my name is Numan! ", "你好，我叫努曼！", null, null, 0],
                ["! ", "！", null, null, 0],
                ["! ", "！", null, null, 0],
                ["| You | good | I | call | Nu | Man", "|你|好|我|叫|努|曼", null, null, 0],
                [null, null, null, "Nǐ hǎo, wǒ jiào nǔ màn!!!|Nǐ |hǎo |wǒ |jiào |nǔ |màn"]
            ],
            null,
            "zh-CN",
            null,
            null,
            [
                [
                    "你好，我叫努曼！",
                    null,
                    [
                        ["Hello, my name is Nutum!", 0, true, false],
                        ["Hello, my name is Numan!", 0, true, false]
                    ],
                    [[0, 8]],
                    "你好，我叫努曼！",
                    0,
                    0
                ],
                [
                    "|你|好|我|叫|努|曼",
                    null,
                    [
                        ["| 你 | 好 | | | 叫 | |", 0, true, false],
                        ["| You | good | I | call | Nu | Man", 0, true, false]
                    ],
                    [[0, 12]],
                    "|你|好|我|叫|努|曼",
                    0,
                    0
                ]
            ]
        ])
    }

    fn fragment(candidates: &[&str]) -> Value {
        let candidates: Vec<Value> = candidates.iter().map(|c| json!([c, 0, true, false])).collect();
        json!(["src", null, candidates])
    }

    #[test]
    fn test_decode_raw_takes_last_candidate() {
        let decoded = decode_raw(&punctuated_response()).unwrap();
        assert_eq!(
            decoded.translation,
            "Hello, my name is Numan!| You | good | I | call | Nu | Man"
        );
        assert_eq!(
            decoded.word_transcription.as_deref(),
            Some("Nǐ hǎo, wǒ jiào nǔ màn!!!|Nǐ |hǎo |wǒ |jiào |nǔ |màn")
        );
        assert_eq!(decoded.translation_transcription, None);
    }

    #[test]
    fn test_decode_raw_concatenates_in_order() {
        let raw = json!([
            [[null, null, "tt", "wt"]],
            null,
            null,
            null,
            null,
            [fragment(&["A", "B"]), fragment(&["C"])]
        ]);
        let decoded = decode_raw(&raw).unwrap();
        assert_eq!(decoded.translation, "BC");
        assert_eq!(decoded.word_transcription.as_deref(), Some("wt"));
        assert_eq!(decoded.translation_transcription.as_deref(), Some("tt"));
    }

    #[test]
    fn test_decode_raw_lone_punctuation_fragment() {
        let raw = json!([[[null, null, null, "!"]], null, null, null, null, [fragment(&["!"])]]);
        assert_eq!(decode_raw(&raw).unwrap().translation, "!");
    }

    #[test]
    fn test_decode_raw_short_closing_segment() {
        let raw = json!([[["Hi", "嗨"]], null, null, null, null, [fragment(&["Hi"])]]);
        let decoded = decode_raw(&raw).unwrap();
        assert_eq!(decoded.word_transcription, None);
        assert_eq!(decoded.translation_transcription, None);
    }

    #[test]
    fn test_decode_raw_missing_groups() {
        let missing_translation = json!([[[null, null, null, "x"]]]);
        assert!(matches!(
            decode_raw(&missing_translation),
            Err(TranslateError::MalformedResponse(_))
        ));

        let empty_transcript = json!([[], null, null, null, null, [fragment(&["A"])]]);
        assert!(matches!(
            decode_raw(&empty_transcript),
            Err(TranslateError::MalformedResponse(_))
        ));

        assert!(matches!(
            decode_raw(&json!({"sentences": []})),
            Err(TranslateError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_raw_fragment_without_candidates() {
        let raw = json!([
            [[null, null, null, "x"]],
            null,
            null,
            null,
            null,
            [["src", null, []]]
        ]);
        assert!(matches!(
            decode_raw(&raw),
            Err(TranslateError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_raw_last_candidate_without_text() {
        let raw = json!([
            [[null, null, null, "x"]],
            null,
            null,
            null,
            null,
            [["src", null, [["A", 0], [null, 0]]]]
        ]);
        assert!(matches!(
            decode_raw(&raw),
            Err(TranslateError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_raw_response_keeps_fragment_history() {
        let response = RawResponse::from_value(&punctuated_response()).unwrap();
        assert_eq!(response.fragments.len(), 2);
        assert_eq!(response.fragments[0].candidates.len(), 2);
        assert_eq!(response.fragments[0].source.as_deref(), Some("你好，我叫努曼！"));
        assert_eq!(response.fragments[1].latest(), "| You | good | I | call | Nu | Man");
    }

    struct TablePinyin;

    impl PinyinLookup for TablePinyin {
        fn romanize(&self, text: &str) -> Result<String, anyhow::Error> {
            match text {
                "你" => Ok(" Nǐ ".to_string()),
                "好" => Ok("hǎo".to_string()),
                "努" => Ok("nǔ".to_string()),
                other => Err(anyhow::anyhow!("no reading for {}", other)),
            }
        }
    }

    #[test]
    fn test_decode_list_transcription() {
        let texts = vec!["Hello".to_string(), "I".to_string(), "call".to_string()];
        let result = decode_list(&texts, "nǐ hǎo", "你好", &TablePinyin).unwrap();
        assert_eq!(result.transcription, "nǐ hǎo|nǐ|hǎo");
    }

    #[test]
    fn test_decode_list_single_leading_capital() {
        let texts = vec!["hello".to_string(), "there".to_string()];
        let result = decode_list(&texts, "nǐ hǎo", "你好", &TablePinyin).unwrap();
        assert!(result.translation.starts_with("Hello|there"));

        let texts = vec!["HELLO".to_string(), "You".to_string(), "Good".to_string()];
        let result = decode_list(&texts, "nǐ hǎo", "你好", &TablePinyin).unwrap();
        assert_eq!(result.translation, "Hello|you|good");
    }

    #[test]
    fn test_decode_list_character_fallback() {
        let texts = vec!["Numan".to_string(), "Nu".to_string(), "Man".to_string()];
        let result = decode_list(&texts, "Nǔ Màn", "努曼", &TablePinyin).unwrap();
        assert_eq!(result.transcription, "nǔ màn|nǔ|曼");
    }

    #[test]
    fn test_decode_list_empty() {
        let err = decode_list(&[], "nǐ hǎo", "你好", &TablePinyin).unwrap_err();
        match err {
            TranslateError::TranslationFailed { text, .. } => assert_eq!(text, "你好"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_normalize_prefers_word_transcription() {
        let result = normalize(RawDecoded {
            translation: "Hello".into(),
            word_transcription: Some("Nǐ hǎo".into()),
            translation_transcription: Some("Hēi lóu".into()),
        })
        .unwrap();
        assert_eq!(result.transcription, "Nǐ hǎo");
        assert_eq!(result.translation, "Hello");
    }

    #[test]
    fn test_normalize_falls_back() {
        let result = normalize(RawDecoded {
            translation: "你好".into(),
            word_transcription: None,
            translation_transcription: Some("Nǐ hǎo".into()),
        })
        .unwrap();
        assert_eq!(result.transcription, "Nǐ hǎo");

        let result = normalize(RawDecoded {
            translation: "你好".into(),
            word_transcription: Some(String::new()),
            translation_transcription: Some("Nǐ hǎo".into()),
        })
        .unwrap();
        assert_eq!(result.transcription, "Nǐ hǎo");
    }

    #[test]
    fn test_normalize_without_romanization() {
        // en -> fr answers carry no transcription at all
        let raw = json!([
            [["Bonjour", "Hello", null, null, 10]],
            null,
            "en",
            null,
            null,
            [["Hello", null, [["Bonjour", 0, true, false]]]]
        ]);
        let decoded = decode_raw(&raw).unwrap();
        assert_eq!(decoded.word_transcription, None);
        assert_eq!(decoded.translation_transcription, None);

        let result = normalize(decoded).unwrap();
        assert_eq!(result.translation, "Bonjour");
        assert_eq!(result.transcription, "");
    }

    #[test]
    fn test_normalize_empty_result_keeps_original_data() {
        let err = normalize(RawDecoded {
            translation: String::new(),
            word_transcription: Some(String::new()),
            translation_transcription: None,
        })
        .unwrap_err();
        match err {
            TranslateError::ResultMaskingFailed { data, .. } => {
                assert_eq!(data["translation"], "");
                assert_eq!(data["wordTranscription"], "");
                assert_eq!(data["translationTranscription"], Value::Null);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_first_capital() {
        assert_eq!(first_capital("hello"), "Hello");
        assert_eq!(first_capital(""), "");
        assert_eq!(first_capital("你好"), "你好");
    }
}
