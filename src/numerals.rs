//! Chinese-numeral decoding collaborator.
//!
//! Source sheets frequently label top-level groups with Chinese numerals
//! (一, 二, 十二, ...). The sequence-code processor only deals in canonical
//! decimal codes, so anything carrying a numeral glyph is routed through a
//! [`NumeralDecoder`] first.

/// Decodes a numeral string into its decimal rendering.
pub trait NumeralDecoder {
    /// Returns the decimal string for `text`, or `None` when the input is
    /// not a well-formed numeral.
    fn decode(&self, text: &str) -> Option<String>;
}

/// Built-in decoder for integer Chinese numerals, covering the glyph set
/// 零一二三四五六七八九 with the 十/百/千 units and 万/亿 section markers.
/// Dotted inputs are decoded segment by segment; segments that are already
/// plain ASCII digits pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChineseNumerals;

impl NumeralDecoder for ChineseNumerals {
    fn decode(&self, text: &str) -> Option<String> {
        if text.is_empty() {
            return None;
        }
        let segments: Vec<String> = text
            .split('.')
            .map(decode_segment)
            .collect::<Option<Vec<_>>>()?;
        Some(segments.join("."))
    }
}

fn decode_segment(segment: &str) -> Option<String> {
    if segment.is_empty() {
        return None;
    }
    if segment.bytes().all(|byte| byte.is_ascii_digit()) {
        return Some(segment.to_string());
    }
    decode_integer(segment).map(|value| value.to_string())
}

fn decode_integer(text: &str) -> Option<u64> {
    let mut total: u64 = 0;
    let mut section: u64 = 0;
    let mut number: u64 = 0;

    for ch in text.chars() {
        if let Some(digit) = digit_value(ch) {
            number = digit;
        } else if let Some(unit) = unit_value(ch) {
            // A bare 十 means "one ten": 十二 is 12.
            if number == 0 && unit == 10 {
                number = 1;
            }
            section += number * unit;
            number = 0;
        } else if let Some(multiplier) = section_value(ch) {
            total += (section + number) * multiplier;
            section = 0;
            number = 0;
        } else {
            return None;
        }
    }

    Some(total + section + number)
}

fn digit_value(ch: char) -> Option<u64> {
    match ch {
        '零' => Some(0),
        '一' => Some(1),
        '二' => Some(2),
        '三' => Some(3),
        '四' => Some(4),
        '五' => Some(5),
        '六' => Some(6),
        '七' => Some(7),
        '八' => Some(8),
        '九' => Some(9),
        _ => None,
    }
}

fn unit_value(ch: char) -> Option<u64> {
    match ch {
        '十' => Some(10),
        '百' => Some(100),
        '千' => Some(1000),
        _ => None,
    }
}

fn section_value(ch: char) -> Option<u64> {
    match ch {
        '万' => Some(10_000),
        '亿' => Some(100_000_000),
        _ => None,
    }
}
