//! Ordered shape rules for the pattern-based extractors.
//!
//! Every rule table is evaluated top to bottom; the first rule that claims a
//! span wins and later rules cannot reuse it.

use cardex_core::util::{MIN_CARD_YEAR, remove_phrase};
use cardex_core::{
    CardNumberClass, CardNumberToken, ProductionCodeToken, SerialToken, Token, YearToken,
    push_unique,
};
use regex::Regex;
use std::ops::Range;

use super::vocabulary;

/// Highest print run a serial may carry.
pub const MAX_PRINT_RUN: u32 = 9999;

const SLASH_SERIAL_CONFIDENCE: u8 = 95;
const PHRASE_SERIAL_CONFIDENCE: u8 = 85;
const YEAR_CONFIDENCE: u8 = 90;
pub const PRODUCTION_CODE_CONFIDENCE: u8 = 98;

/// (class, pattern, base confidence), most specific first. Bare numbers
/// come last because they collide with years and serials.
const CARD_NUMBER_RULES: &[(CardNumberClass, &str, u8)] = &[
    (
        CardNumberClass::ComplexHyphenated,
        r"\b[a-z0-9]+-[a-z0-9]+-[a-z0-9]+\b",
        95,
    ),
    (
        CardNumberClass::StandardHyphenated,
        r"\b[a-z]{2,6}-[a-z0-9]{1,6}\b",
        90,
    ),
    (
        CardNumberClass::SimpleHyphenated,
        r"\b[a-z0-9]{1,4}-[0-9]{1,4}[a-z]?\b",
        85,
    ),
    (
        CardNumberClass::LettersNumbers,
        r"\b[a-z]{1,4}[0-9]{1,4}[a-z]?\b",
        85,
    ),
    (CardNumberClass::NumbersLetters, r"\b[0-9]{1,4}[a-z]{1,2}\b", 80),
    (CardNumberClass::PureNumeric, r"\b[0-9]{1,3}\b", 70),
];

struct CardNumberRule {
    class: CardNumberClass,
    matcher: Regex,
    confidence: u8,
}

/// What a rule does with a match it found.
enum Verdict {
    Accept,
    /// Claim the span without producing a token.
    Block,
    /// Leave the span for later rules.
    Skip,
}

/// Compiled regex tables for card numbers, years, serials and production codes.
pub struct QueryRules {
    card_numbers: Vec<CardNumberRule>,
    year: Regex,
    slash_serial: Regex,
    phrase_serial: Regex,
    production_code: Regex,
}

impl QueryRules {
    /// Compile every rule table.
    ///
    /// # Errors
    /// Returns an error if a built-in pattern fails to compile.
    pub fn compile() -> Result<Self, regex::Error> {
        let card_numbers = CARD_NUMBER_RULES
            .iter()
            .map(|(class, pattern, confidence)| {
                Ok(CardNumberRule {
                    class: *class,
                    matcher: Regex::new(pattern)?,
                    confidence: *confidence,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            card_numbers,
            year: Regex::new(r"\b([0-9]{4})\b")?,
            slash_serial: Regex::new(r"/\s*([0-9]{1,6})\b")?,
            phrase_serial: Regex::new(
                r"(?:^|[^a-z0-9])((?:numbered|serial(?:ed)?|#'?d)(?:\s+to)?|to)\s+([0-9]{1,6})\b",
            )?,
            production_code: Regex::new(r"\b(cmp[0-9]{6})\b")?,
        })
    }

    /// Years in `[1887, max_year]`. Digits after a slash are print runs.
    #[must_use]
    pub fn extract_years(&self, query: &str, max_year: i32) -> Vec<Token<YearToken>> {
        let lower = query.to_lowercase();
        let serial_spans: Vec<Range<usize>> = self
            .slash_serial
            .find_iter(&lower)
            .map(|m| m.range())
            .collect();
        let mut years = Vec::new();
        for caps in self.year.captures_iter(&lower) {
            let Some(m) = caps.get(1) else { continue };
            if serial_spans
                .iter()
                .any(|r| r.start <= m.start() && m.end() <= r.end)
            {
                continue;
            }
            let Ok(year) = m.as_str().parse::<i32>() else {
                continue;
            };
            if (MIN_CARD_YEAR..=max_year).contains(&year) {
                push_unique(
                    &mut years,
                    Token::new(YearToken { year }, YEAR_CONFIDENCE, m.as_str()),
                );
            }
        }
        years
    }

    /// Print runs from `/n` and phrases like "numbered n" or "#d n".
    #[must_use]
    pub fn extract_serials(&self, query: &str, max_year: i32) -> Vec<Token<SerialToken>> {
        let lower = query.to_lowercase();
        let mut serials = Vec::new();

        for caps in self.slash_serial.captures_iter(&lower) {
            let (Some(all), Some(n)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Some(print_run) = parse_print_run(n.as_str()) {
                push_unique(
                    &mut serials,
                    Token::new(SerialToken { print_run }, SLASH_SERIAL_CONFIDENCE, all.as_str()),
                );
            }
        }

        for caps in self.phrase_serial.captures_iter(&lower) {
            let (Some(phrase), Some(n)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let Some(print_run) = parse_print_run(n.as_str()) else {
                continue;
            };
            // "2019 to 2021" is a year range, not a print run.
            if n.as_str().len() == 4
                && i32::try_from(print_run)
                    .is_ok_and(|y| (MIN_CARD_YEAR..=max_year).contains(&y))
            {
                continue;
            }
            let span = &lower[phrase.start()..n.end()];
            push_unique(
                &mut serials,
                Token::new(SerialToken { print_run }, PHRASE_SERIAL_CONFIDENCE, span),
            );
        }
        serials
    }

    /// Production codes (`CMP` + 6 digits), uppercased.
    #[must_use]
    pub fn extract_production_codes(&self, query: &str) -> Vec<Token<ProductionCodeToken>> {
        let lower = query.to_lowercase();
        let mut codes = Vec::new();
        for m in self.production_code.find_iter(&lower) {
            push_unique(
                &mut codes,
                Token::new(
                    ProductionCodeToken {
                        code: m.as_str().to_uppercase(),
                    },
                    PRODUCTION_CODE_CONFIDENCE,
                    m.as_str(),
                ),
            );
        }
        codes
    }

    /// Card numbers, evaluated rule by rule over a masked copy of the query.
    #[must_use]
    pub fn extract_card_numbers(&self, query: &str) -> Vec<Token<CardNumberToken>> {
        let masked = self.mask_non_card_numbers(&query.to_lowercase());
        let mut claimed: Vec<Range<usize>> = Vec::new();
        let mut tokens = Vec::new();

        for rule in &self.card_numbers {
            for m in rule.matcher.find_iter(&masked) {
                let range = m.range();
                if claimed
                    .iter()
                    .any(|c| c.start < range.end && range.start < c.end)
                {
                    continue;
                }
                match judge(rule.class, m.as_str()) {
                    Verdict::Skip => {}
                    Verdict::Block => claimed.push(range),
                    Verdict::Accept => {
                        claimed.push(range);
                        push_unique(
                            &mut tokens,
                            Token::new(
                                CardNumberToken {
                                    pattern: m.as_str().to_uppercase(),
                                    pattern_class: rule.class,
                                },
                                rule.confidence,
                                m.as_str(),
                            ),
                        );
                    }
                }
            }
        }
        tokens
    }

    /// Blank out serials, production codes and vocabulary phrases so their
    /// digits and hyphens are not read as card numbers.
    fn mask_non_card_numbers(&self, lower: &str) -> String {
        let mut masked = lower.to_string();
        let mut ranges: Vec<Range<usize>> = Vec::new();
        ranges.extend(self.slash_serial.find_iter(lower).map(|m| m.range()));
        ranges.extend(
            self.phrase_serial
                .captures_iter(lower)
                .filter_map(|c| Some(c.get(1)?.start()..c.get(2)?.end())),
        );
        ranges.extend(self.production_code.find_iter(lower).map(|m| m.range()));
        for range in ranges {
            masked.replace_range(range.clone(), &" ".repeat(range.len()));
        }
        for phrase in vocabulary::all_card_type_phrases()
            .chain(vocabulary::COLOR_KEYWORDS.iter().copied())
            .filter(|p| p.contains('-'))
        {
            masked = remove_phrase(&masked, phrase);
        }
        masked
    }
}

fn parse_print_run(digits: &str) -> Option<u32> {
    digits
        .parse::<u32>()
        .ok()
        .filter(|n| (1..=MAX_PRINT_RUN).contains(n))
}

fn judge(class: CardNumberClass, text: &str) -> Verdict {
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    match class {
        CardNumberClass::ComplexHyphenated | CardNumberClass::StandardHyphenated => {
            if has_digit || initials_code(text) {
                Verdict::Accept
            } else {
                Verdict::Skip
            }
        }
        CardNumberClass::SimpleHyphenated => {
            // Season ranges such as 2020-21.
            let left = text.split('-').next().unwrap_or_default();
            if left.len() == 4 && left.chars().all(|c| c.is_ascii_digit()) {
                Verdict::Block
            } else {
                Verdict::Accept
            }
        }
        CardNumberClass::NumbersLetters => {
            if ["st", "nd", "rd", "th"].iter().any(|s| text.ends_with(s)) {
                Verdict::Block
            } else {
                Verdict::Accept
            }
        }
        CardNumberClass::LettersNumbers | CardNumberClass::PureNumeric => {
            if text.len() == 4 && text.chars().all(|c| c.is_ascii_digit()) {
                Verdict::Block
            } else {
                Verdict::Accept
            }
        }
    }
}

/// Letter-only hyphenated codes like `cpa-sk`: a 2-4 letter prefix and a
/// suffix of at most 3 letters.
fn initials_code(text: &str) -> bool {
    let parts: Vec<&str> = text.split('-').collect();
    let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
        return false;
    };
    (2..=4).contains(&first.len()) && (1..=3).contains(&last.len())
}
