use anyhow::bail;
use pinyin::ToPinyin;

use super::interface::PinyinLookup;

/// Tone-marked pinyin from the `pinyin` crate's bundled readings.
///
/// Han characters become syllables separated by a single space; everything
/// else, including text with no Han at all, is passed through. Only empty
/// input is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinyinRomanizer;

impl PinyinRomanizer {
    pub fn new() -> Self {
        Self
    }
}

impl PinyinLookup for PinyinRomanizer {
    fn romanize(&self, text: &str) -> Result<String, anyhow::Error> {
        if text.trim().is_empty() {
            bail!("cannot romanize empty text");
        }

        let mut out = String::with_capacity(text.len() * 2);
        let mut previous_was_syllable = false;

        for (ch, reading) in text.chars().zip(text.to_pinyin()) {
            match reading {
                Some(p) => {
                    if out.ends_with(|c: char| c.is_alphanumeric()) {
                        out.push(' ');
                    }
                    out.push_str(p.with_tone());
                    previous_was_syllable = true;
                }
                None => {
                    if previous_was_syllable && ch.is_alphanumeric() {
                        out.push(' ');
                    }
                    out.push(ch);
                    previous_was_syllable = false;
                }
            }
        }

        Ok(out)
    }
}
