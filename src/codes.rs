//! Sequence-code processing: cleaning, numeral conversion, structural
//! validation, canonical formatting, and the numeric segment comparator used
//! for every ordering decision in the pipeline.

use std::cmp::Ordering;

use crate::numerals::NumeralDecoder;

/// Width the non-leading segments of a canonical code are padded to.
const SEGMENT_WIDTH: usize = 3;

/// Glyphs that mark a label as a Chinese numeral needing decoding.
const CHINESE_NUMERAL_GLYPHS: &str = "零一二三四五六七八九十百千万亿";

/// Normalizes a raw sequence label into its canonical code.
///
/// The label is cleaned of decoration characters, routed through the numeral
/// decoder when it carries Chinese numeral glyphs, validated as dot-separated
/// digit groups, and finally formatted: the first segment keeps its source
/// width, every later segment is zero-padded to width 3. Returns `None` for
/// anything that does not survive those steps.
pub fn normalize(raw: &str, decoder: &dyn NumeralDecoder) -> Option<String> {
    let cleaned = clean_label(raw);
    if cleaned.is_empty() {
        return None;
    }

    let decoded = if contains_chinese_numeral(&cleaned) {
        decoder.decode(&cleaned)?
    } else {
        cleaned
    };

    if !is_valid_code(&decoded) {
        return None;
    }

    Some(format_code(&decoded))
}

/// Strips full- and half-width parentheses, whitespace, and the ideographic
/// comma. Dots are structural and always preserved.
pub fn clean_label(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !matches!(ch, '（' | '）' | '(' | ')' | '、') && !ch.is_whitespace())
        .collect()
}

/// True when any character of `text` is a Chinese numeral glyph.
pub fn contains_chinese_numeral(text: &str) -> bool {
    text.chars().any(|ch| CHINESE_NUMERAL_GLYPHS.contains(ch))
}

/// Structural validity: digit groups separated by single dots, no
/// leading/trailing/double dots.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .split('.')
            .all(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
}

/// Canonical formatting: segment 0 verbatim, segments 1..N zero-padded to
/// width 3. Already-canonical codes come back unchanged.
pub fn format_code(code: &str) -> String {
    code.split('.')
        .enumerate()
        .map(|(index, segment)| {
            if index == 0 || segment.len() >= SEGMENT_WIDTH {
                segment.to_string()
            } else {
                format!("{:0>1$}", segment, SEGMENT_WIDTH)
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Orders two codes segment-wise by numeric value, shorter code first on a
/// shared prefix. Numeric, not lexicographic: `1` < `2` < `10`.
pub fn compare_codes(lhs: &str, rhs: &str) -> Ordering {
    if lhs.is_empty() || rhs.is_empty() {
        return lhs.len().cmp(&rhs.len());
    }

    let mut left = lhs.split('.');
    let mut right = rhs.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => match compare_segments(a, b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            },
        }
    }
}

/// Compares two digit strings by numeric value without parsing, so segment
/// length never overflows an integer type.
fn compare_segments(lhs: &str, rhs: &str) -> Ordering {
    let lhs = lhs.trim_start_matches('0');
    let rhs = rhs.trim_start_matches('0');
    lhs.len().cmp(&rhs.len()).then_with(|| lhs.cmp(rhs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerals::ChineseNumerals;

    fn canonical(raw: &str) -> Option<String> {
        normalize(raw, &ChineseNumerals)
    }

    #[test]
    fn cleans_decoration_characters() {
        assert_eq!(clean_label("（1.2）"), "1.2");
        assert_eq!(clean_label("(3) 、4"), "34");
        assert_eq!(clean_label(" 1 . 1 "), "1.1");
    }

    #[test]
    fn pads_trailing_segments_to_width_three() {
        assert_eq!(canonical("1.10"), Some("1.010".to_string()));
        assert_eq!(canonical("2.100"), Some("2.100".to_string()));
        assert_eq!(canonical("10.20.30"), Some("10.020.030".to_string()));
        assert_eq!(canonical("1"), Some("1".to_string()));
    }

    #[test]
    fn first_segment_keeps_source_width() {
        assert_eq!(canonical("07.1"), Some("07.001".to_string()));
    }

    #[test]
    fn formatting_is_idempotent() {
        let once = canonical("10.20.30").unwrap();
        assert_eq!(canonical(&once), Some(once.clone()));
    }

    #[test]
    fn decodes_chinese_numeral_labels() {
        assert_eq!(canonical("十二"), Some("12".to_string()));
        assert_eq!(canonical("（二）"), Some("2".to_string()));
    }

    #[test]
    fn rejects_malformed_labels() {
        assert_eq!(canonical(""), None);
        assert_eq!(canonical("  "), None);
        assert_eq!(canonical("1..2"), None);
        assert_eq!(canonical(".1"), None);
        assert_eq!(canonical("1.2."), None);
        assert_eq!(canonical("a.1"), None);
        assert_eq!(canonical("合计"), None);
    }

    #[test]
    fn ordering_is_numeric_not_lexicographic() {
        let mut codes = vec!["10", "2", "1"];
        codes.sort_by(|a, b| compare_codes(a, b));
        assert_eq!(codes, vec!["1", "2", "10"]);

        assert_eq!(compare_codes("1.002", "1.010"), Ordering::Less);
        assert_eq!(compare_codes("1", "1.001"), Ordering::Less);
        assert_eq!(compare_codes("1.001", "1.001"), Ordering::Equal);
        assert_eq!(compare_codes("999", "1000"), Ordering::Less);
    }
}
