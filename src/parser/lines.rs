//! Line reconstruction from positioned words.
//!
//! Words arrive in reading order. Two neighbours stay on one line when they
//! share a baseline, or when the first ends at the right margin and the text
//! so far does not end in a terminator (a visually wrapped line). Everything
//! else starts a new line.

use regex::Regex;

use crate::error::Result;

use super::backend::Word;
use super::options::LineConfig;

/// Vertical window of words to consider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineBounds {
    /// Every word on the page
    Page,
    /// Words whose top lies strictly below `y`
    Below(f32),
    /// Words whose top lies strictly between `after` and `before`
    Between {
        /// Upper limit (e.g. previous table's bottom)
        after: f32,
        /// Lower limit (e.g. next table's top)
        before: f32,
    },
}

impl LineBounds {
    /// Whether a word with this top coordinate is inside the window.
    pub fn contains(&self, top: f32) -> bool {
        match *self {
            LineBounds::Page => true,
            LineBounds::Below(y) => top > y,
            LineBounds::Between { after, before } => top > after && top < before,
        }
    }
}

/// Merges a word stream into logical lines.
#[derive(Debug, Clone)]
pub struct LineReconstructor {
    config: LineConfig,
    terminator: Regex,
}

impl LineReconstructor {
    /// Create a reconstructor; fails if the terminator pattern is invalid.
    pub fn new(config: LineConfig) -> Result<Self> {
        let terminator = Regex::new(&config.terminator_pattern)?;
        Ok(Self { config, terminator })
    }

    /// Reconstruct the words inside `bounds` into a text blob with `\n` breaks.
    pub fn reconstruct(&self, words: &[Word], width: f32, height: f32, bounds: LineBounds) -> String {
        let footer_ratio = match bounds {
            LineBounds::Page => self.config.page_footer_ratio,
            _ => self.config.region_footer_ratio,
        };
        let margin = width * self.config.right_margin_ratio;
        let footer_line = height * footer_ratio;

        let mut text = String::new();
        let mut prev: Option<&Word> = None;

        for word in words.iter().filter(|w| bounds.contains(w.top)) {
            if let Some(p) = prev {
                let same_line = (p.top - word.top).abs() <= self.config.same_line_tolerance;
                let wrapped = p.x1 > margin
                    && word.top < footer_line
                    && !self.terminator.is_match(&text);

                if same_line || wrapped {
                    if needs_space(&text, &word.text) {
                        text.push(' ');
                    }
                } else {
                    text.push('\n');
                }
            }
            text.push_str(&word.text);
            prev = Some(word);
        }

        text
    }

    /// Reconstruct and split into trimmed, non-empty lines.
    pub fn lines(&self, words: &[Word], width: f32, height: f32, bounds: LineBounds) -> Vec<String> {
        self.reconstruct(words, width, height, bounds)
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Whether joining `next` onto `text` needs a separating space.
///
/// Chinese and Japanese runs are joined directly; other scripts get a space
/// unless one is already there.
fn needs_space(text: &str, next: &str) -> bool {
    let (Some(last), Some(first)) = (text.chars().last(), next.chars().next()) else {
        return false;
    };
    if last.is_whitespace() || first.is_whitespace() {
        return false;
    }
    !(is_spaceless_script_char(last) || is_spaceless_script_char(first))
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
    // Fullwidth forms (，：（）；)
    || (0xFF00..=0xFFEF).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f32 = 600.0;
    const H: f32 = 800.0;

    fn reconstructor() -> LineReconstructor {
        LineReconstructor::new(LineConfig::default()).unwrap()
    }

    fn word(text: &str, x0: f32, x1: f32, top: f32) -> Word {
        Word::new(text, x0, top, x1, top + 10.0)
    }

    #[test]
    fn test_same_baseline_joins() {
        let words = vec![word("营业", 50.0, 90.0, 100.0), word("收入", 92.0, 130.0, 101.5)];
        assert_eq!(reconstructor().reconstruct(&words, W, H, LineBounds::Page), "营业收入");
    }

    #[test]
    fn test_same_line_tolerance_edge() {
        let at_limit = vec![word("营业", 50.0, 90.0, 100.0), word("收入", 92.0, 130.0, 102.0)];
        assert_eq!(
            reconstructor().lines(&at_limit, W, H, LineBounds::Page),
            vec!["营业收入"]
        );

        let past_limit = vec![word("营业", 50.0, 90.0, 100.0), word("收入", 92.0, 130.0, 102.01)];
        assert_eq!(
            reconstructor().lines(&past_limit, W, H, LineBounds::Page),
            vec!["营业", "收入"]
        );
    }

    #[test]
    fn test_latin_words_get_spaces() {
        let words = vec![word("Total", 50.0, 90.0, 100.0), word("assets", 95.0, 140.0, 100.0)];
        assert_eq!(reconstructor().lines(&words, W, H, LineBounds::Page), vec!["Total assets"]);
    }

    #[test]
    fn test_short_line_breaks() {
        let words = vec![word("第一行", 50.0, 200.0, 100.0), word("第二行", 50.0, 200.0, 120.0)];
        assert_eq!(
            reconstructor().lines(&words, W, H, LineBounds::Page),
            vec!["第一行", "第二行"]
        );
    }

    #[test]
    fn test_wrapped_line_merges() {
        // first line runs into the right margin and does not end a sentence
        let words = vec![
            word("公司主要从事软件开发", 50.0, 560.0, 100.0),
            word("与技术服务。", 50.0, 200.0, 120.0),
            word("下一段", 50.0, 200.0, 140.0),
        ];
        assert_eq!(
            reconstructor().lines(&words, W, H, LineBounds::Page),
            vec!["公司主要从事软件开发与技术服务。", "下一段"]
        );
    }

    #[test]
    fn test_terminator_prevents_merge() {
        let words = vec![
            word("本报告期营业收入为1,024", 50.0, 560.0, 100.0),
            word("万元", 50.0, 100.0, 120.0),
            word("单位：人民币元", 400.0, 560.0, 140.0),
            word("项目", 50.0, 100.0, 160.0),
        ];
        assert_eq!(
            reconstructor().lines(&words, W, H, LineBounds::Page),
            vec!["本报告期营业收入为1,024", "万元", "单位：人民币元", "项目"]
        );
    }

    #[test]
    fn test_footer_zone_is_not_merged() {
        let words = vec![
            word("正文最后一行延伸到页边", 50.0, 560.0, 700.0),
            word("12", 290.0, 310.0, 760.0),
        ];
        assert_eq!(
            reconstructor().lines(&words, W, H, LineBounds::Page),
            vec!["正文最后一行延伸到页边", "12"]
        );
    }

    #[test]
    fn test_bounds_filter_words() {
        let words = vec![
            word("above", 50.0, 100.0, 50.0),
            word("inside", 50.0, 100.0, 150.0),
            word("below", 50.0, 100.0, 300.0),
        ];
        let r = reconstructor();
        assert_eq!(
            r.lines(&words, W, H, LineBounds::Between { after: 100.0, before: 200.0 }),
            vec!["inside"]
        );
        assert_eq!(r.lines(&words, W, H, LineBounds::Below(200.0)), vec!["below"]);
        // strict comparison on both edges
        assert!(r
            .lines(&words, W, H, LineBounds::Between { after: 150.0, before: 300.0 })
            .is_empty());
    }

    #[test]
    fn test_invalid_terminator_pattern() {
        let config = LineConfig {
            terminator_pattern: "(".to_string(),
            ..LineConfig::default()
        };
        assert!(LineReconstructor::new(config).is_err());
    }
}
