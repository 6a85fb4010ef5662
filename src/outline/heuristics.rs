//! Heading acceptance rules and level classification.
//!
//! Each acceptance clause is a [`Rule`]; a [`HeuristicConfig`] is an OR
//! over its rules, gated by a rejection filter and a minimum length.
//! The two built-in configurations are selected by [`HeuristicProfile`].

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::profile::FontProfile;
use crate::model::HeadingLevel;

static DIGITS_AND_DOTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d\.\s]+$").unwrap());
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}\.?$").unwrap());

static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.(\d+\.)*\s+[A-Z]").unwrap());
static KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(Introduction|Overview|Conclusion|References|Acknowledgements|Table of Contents|Revision History)",
    )
    .unwrap()
});
static DIVISION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(Chapter|Section|Part)\s+\d+").unwrap());

static LEVEL_1: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s+").unwrap());
static LEVEL_2: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\s+").unwrap());
static LEVEL_3: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+\s+").unwrap());

/// Texts shorter than this many characters are rejected outright.
const MIN_CHARS: usize = 3;

/// Size ratio over the median that alone marks a heading.
const LARGE_FONT_RATIO: f32 = 1.2;

/// Size ratio over the median a bold block needs under the strict profile.
const BOLD_FONT_RATIO: f32 = 1.05;

/// Which built-in heuristic configuration to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeuristicProfile {
    /// Keyword and numbering patterns, bold needs extra size, padding on both sides
    #[default]
    Strict,
    /// Bold alone suffices, padding on either side
    Relaxed,
}

impl HeuristicProfile {
    /// The rule set for this profile.
    pub fn config(self) -> HeuristicConfig {
        match self {
            HeuristicProfile::Strict => HeuristicConfig::strict(),
            HeuristicProfile::Relaxed => HeuristicConfig::relaxed(),
        }
    }
}

impl fmt::Display for HeuristicProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeuristicProfile::Strict => write!(f, "strict"),
            HeuristicProfile::Relaxed => write!(f, "relaxed"),
        }
    }
}

impl FromStr for HeuristicProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(HeuristicProfile::Strict),
            "relaxed" => Ok(HeuristicProfile::Relaxed),
            other => Err(format!("unknown heuristic profile '{}'", other)),
        }
    }
}

/// Which neighbours must be blank for the padding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    Both,
    Either,
}

/// A block plus the document-order text around it.
#[derive(Debug, Clone, Copy)]
pub struct BlockContext<'a> {
    pub text: &'a str,
    pub font_size: f32,
    pub is_bold: bool,
    /// Previous block's text, empty for the first block
    pub prev_text: &'a str,
    /// Next block's text, empty for the last block
    pub next_text: &'a str,
}

/// One acceptance clause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// `1. Title`, `2.3. Title`: dotted numbers, whitespace, uppercase letter
    Numbered,
    /// Well-known section names such as "Introduction" or "References"
    Keyword,
    /// `Chapter 3`, `Section 2`, `Part 1`
    Division,
    /// Font size above 1.2× the median
    LargeFont,
    /// Bold font, optionally above a ratio of the median
    Bold { min_ratio: Option<f32> },
    /// Blank neighbouring blocks
    Padding(Padding),
    /// Font size above p50
    AboveMedian,
}

impl Rule {
    /// Whether this clause accepts the block.
    pub fn matches(&self, block: &BlockContext<'_>, profile: &FontProfile) -> bool {
        match *self {
            Rule::Numbered => NUMBERED.is_match(block.text),
            Rule::Keyword => KEYWORD.is_match(block.text),
            Rule::Division => DIVISION.is_match(block.text),
            Rule::LargeFont => block.font_size > profile.median() * LARGE_FONT_RATIO,
            Rule::Bold { min_ratio } => {
                block.is_bold
                    && min_ratio.map_or(true, |ratio| block.font_size > profile.median() * ratio)
            }
            Rule::Padding(padding) => {
                let prev_blank = block.prev_text.trim().is_empty();
                let next_blank = block.next_text.trim().is_empty();
                match padding {
                    Padding::Both => prev_blank && next_blank,
                    Padding::Either => prev_blank || next_blank,
                }
            }
            Rule::AboveMedian => block.font_size > profile.p50,
        }
    }
}

/// An explicit heading-acceptance configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicConfig {
    /// Acceptance clauses; any match accepts
    pub rules: Vec<Rule>,
    /// Accepted headings must be strictly longer than this many characters
    pub min_length: usize,
}

impl HeuristicConfig {
    /// Rules used by the folder batch tool.
    pub fn strict() -> Self {
        Self {
            rules: vec![
                Rule::Numbered,
                Rule::Keyword,
                Rule::Division,
                Rule::LargeFont,
                Rule::Bold {
                    min_ratio: Some(BOLD_FONT_RATIO),
                },
                Rule::Padding(Padding::Both),
                Rule::AboveMedian,
            ],
            min_length: 3,
        }
    }

    /// Rules used by the ranking pipeline.
    pub fn relaxed() -> Self {
        Self {
            rules: vec![
                Rule::Numbered,
                Rule::LargeFont,
                Rule::Bold { min_ratio: None },
                Rule::Padding(Padding::Either),
                Rule::AboveMedian,
            ],
            min_length: 3,
        }
    }

    /// Whether the block is a heading under this configuration.
    pub fn is_heading(&self, block: &BlockContext<'_>, profile: &FontProfile) -> bool {
        let text = block.text.trim();
        if is_rejected(text) || text.chars().count() <= self.min_length {
            return false;
        }

        let block = BlockContext { text, ..*block };
        self.rules.iter().any(|rule| rule.matches(&block, profile))
    }
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self::strict()
    }
}

/// Whether the text is a non-heading fragment: bare numbers, a year, or too short.
pub fn is_rejected(text: &str) -> bool {
    let text = text.trim();
    DIGITS_AND_DOTS.is_match(text) || YEAR.is_match(text) || text.chars().count() < MIN_CHARS
}

/// Assign a level to an accepted heading.
///
/// Numbering wins over size: `1. ` is H1, `1.1 ` is H2, `1.1.1 ` is H3.
/// Otherwise the first font hierarchy bucket holding the size decides,
/// falling back to H2.
pub fn classify_level(text: &str, font_size: f32, profile: &FontProfile) -> HeadingLevel {
    let text = text.trim();

    if LEVEL_1.is_match(text) {
        HeadingLevel::H1
    } else if LEVEL_2.is_match(text) {
        HeadingLevel::H2
    } else if LEVEL_3.is_match(text) {
        HeadingLevel::H3
    } else {
        profile.bucket_level(font_size).unwrap_or(HeadingLevel::H2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> FontProfile {
        FontProfile {
            p50: 11.0,
            p75: 12.0,
            p90: 14.0,
            p98: 18.0,
        }
    }

    fn body<'a>(text: &'a str) -> BlockContext<'a> {
        BlockContext {
            text,
            font_size: 11.0,
            is_bold: false,
            prev_text: "Some body text before.",
            next_text: "Some body text after.",
        }
    }

    #[test]
    fn test_rejection_filter() {
        assert!(is_rejected("1.2.3"));
        assert!(is_rejected(" 4 . 5 "));
        assert!(is_rejected("2024"));
        assert!(is_rejected("2024."));
        assert!(is_rejected("ab"));
        assert!(!is_rejected("abc"));
        assert!(!is_rejected("2024 Plan"));
    }

    #[test]
    fn test_numbered_rule() {
        assert!(Rule::Numbered.matches(&body("1. Introduction"), &profile()));
        assert!(Rule::Numbered.matches(&body("2.3. Scope"), &profile()));
        assert!(!Rule::Numbered.matches(&body("2.3 Scope"), &profile()));
        assert!(!Rule::Numbered.matches(&body("1. lowercase start"), &profile()));
    }

    #[test]
    fn test_keyword_and_division_rules() {
        assert!(Rule::Keyword.matches(&body("REFERENCES"), &profile()));
        assert!(Rule::Keyword.matches(&body("Table of Contents"), &profile()));
        assert!(!Rule::Keyword.matches(&body("The Introduction"), &profile()));
        assert!(Rule::Division.matches(&body("chapter 12: Results"), &profile()));
        assert!(!Rule::Division.matches(&body("Chapter Two"), &profile()));
    }

    #[test]
    fn test_font_rules() {
        let mut block = body("Some Heading");
        block.font_size = 13.3;
        assert!(Rule::LargeFont.matches(&block, &profile())); // > 13.2
        block.font_size = 13.2;
        assert!(!Rule::LargeFont.matches(&block, &profile()));
        assert!(Rule::AboveMedian.matches(&block, &profile()));
        block.font_size = 11.0;
        assert!(!Rule::AboveMedian.matches(&block, &profile()));
    }

    #[test]
    fn test_bold_rule_variants() {
        let mut block = body("Bold Heading");
        block.is_bold = true;
        let strict = Rule::Bold {
            min_ratio: Some(BOLD_FONT_RATIO),
        };
        let relaxed = Rule::Bold { min_ratio: None };

        assert!(!strict.matches(&block, &profile()));
        assert!(relaxed.matches(&block, &profile()));

        block.font_size = 11.6;
        assert!(strict.matches(&block, &profile()));
    }

    #[test]
    fn test_padding_rule_variants() {
        let mut block = body("Padded Heading");
        block.prev_text = "  ";
        assert!(!Rule::Padding(Padding::Both).matches(&block, &profile()));
        assert!(Rule::Padding(Padding::Either).matches(&block, &profile()));

        block.next_text = "";
        assert!(Rule::Padding(Padding::Both).matches(&block, &profile()));
    }

    #[test]
    fn test_strict_vs_relaxed() {
        let strict = HeuristicConfig::strict();
        let relaxed = HeuristicConfig::relaxed();

        // Keyword prefix at body size: strict only
        let block = body("Overview of the system");
        assert!(strict.is_heading(&block, &profile()));
        assert!(!relaxed.is_heading(&block, &profile()));

        // Bold at body size: relaxed only
        let mut block = body("Bold body line");
        block.is_bold = true;
        assert!(!strict.is_heading(&block, &profile()));
        assert!(relaxed.is_heading(&block, &profile()));

        // First block of the document: relaxed only
        let mut block = body("Opening line");
        block.prev_text = "";
        assert!(!strict.is_heading(&block, &profile()));
        assert!(relaxed.is_heading(&block, &profile()));
    }

    #[test]
    fn test_length_gate() {
        let config = HeuristicConfig::strict();
        let mut block = body("Intro");
        block.font_size = 20.0;
        assert!(config.is_heading(&block, &profile()));

        // Three characters pass the rejection filter but not the length gate
        let mut block = body("Abc");
        block.font_size = 20.0;
        assert!(!config.is_heading(&block, &profile()));
    }

    #[test]
    fn test_plain_body_text_is_not_heading() {
        let block = body("This is an ordinary sentence of body text.");
        assert!(!HeuristicConfig::strict().is_heading(&block, &profile()));
        assert!(!HeuristicConfig::relaxed().is_heading(&block, &profile()));
    }

    #[test]
    fn test_classify_level_by_numbering() {
        assert_eq!(classify_level("1. Introduction", 9.0, &profile()), HeadingLevel::H1);
        assert_eq!(classify_level("1.1 Background", 30.0, &profile()), HeadingLevel::H2);
        assert_eq!(classify_level("1.1.1 Detail", 30.0, &profile()), HeadingLevel::H3);
    }

    #[test]
    fn test_classify_level_by_size() {
        assert_eq!(classify_level("Scope", 16.0, &profile()), HeadingLevel::H1);
        assert_eq!(classify_level("Scope", 13.0, &profile()), HeadingLevel::H2);
        assert_eq!(classify_level("Scope", 11.5, &profile()), HeadingLevel::H3);
        // outside every bucket
        assert_eq!(classify_level("Scope", 30.0, &profile()), HeadingLevel::H2);
        assert_eq!(classify_level("Scope", 8.0, &profile()), HeadingLevel::H2);
        // dotted level-two numbering is not a numbering match
        assert_eq!(classify_level("1.1. Scope", 16.0, &profile()), HeadingLevel::H1);
    }

    #[test]
    fn test_profile_from_str() {
        assert_eq!("Relaxed".parse::<HeuristicProfile>(), Ok(HeuristicProfile::Relaxed));
        assert_eq!("strict".parse::<HeuristicProfile>(), Ok(HeuristicProfile::Strict));
        assert!("loose".parse::<HeuristicProfile>().is_err());
        assert_eq!(HeuristicProfile::Relaxed.to_string(), "relaxed");
    }
}
