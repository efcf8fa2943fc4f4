//! Typed, confidence-scored facts extracted from a free-text query.

use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// Highest confidence a token may carry.
pub const MAX_CONFIDENCE: u8 = 100;

/// A single extracted fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token<T> {
    pub value: T,
    /// 0..=100
    pub confidence: u8,
    /// The part of the query that produced this token.
    pub matched_span: String,
}

impl<T> Token<T> {
    #[must_use]
    pub fn new(value: T, confidence: u8, matched_span: impl Into<String>) -> Self {
        Self {
            value,
            confidence: confidence.min(MAX_CONFIDENCE),
            matched_span: matched_span.into(),
        }
    }

    /// Number of words in the matched span.
    #[must_use]
    pub fn span_words(&self) -> usize {
        self.matched_span.split_whitespace().count()
    }
}

/// Stable identity used to deduplicate tokens of the same variant.
pub trait Identity {
    type Key: Eq + Hash + Clone;

    fn identity(&self) -> Self::Key;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerToken {
    pub player_id: i64,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: Option<String>,
    pub total_card_count: u32,
    pub is_hall_of_fame: bool,
}

impl PlayerToken {
    /// Lowercased first, last and nickname components.
    #[must_use]
    pub fn name_components(&self) -> Vec<String> {
        let mut parts = vec![self.first_name.to_lowercase(), self.last_name.to_lowercase()];
        if let Some(nick) = &self.nickname {
            parts.push(nick.to_lowercase());
        }
        parts
    }
}

impl Identity for PlayerToken {
    type Key = i64;

    fn identity(&self) -> i64 {
        self.player_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamToken {
    pub team_id: i64,
    pub name: String,
    pub city: String,
    pub mascot: Option<String>,
    pub abbreviation: Option<String>,
}

impl TeamToken {
    /// Lowercased words of the team name, city and mascot.
    #[must_use]
    pub fn name_words(&self) -> Vec<String> {
        let mut words: Vec<String> = self
            .name
            .split_whitespace()
            .chain(self.city.split_whitespace())
            .chain(self.mascot.iter().flat_map(|m| m.split_whitespace()))
            .map(str::to_lowercase)
            .collect();
        words.sort();
        words.dedup();
        words
    }
}

impl Identity for TeamToken {
    type Key = i64;

    fn identity(&self) -> i64 {
        self.team_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetToken {
    pub series_id: i64,
    pub series_name: String,
    pub set_name: String,
    pub manufacturer_name: String,
    pub year: Option<i32>,
}

impl Identity for SetToken {
    type Key = i64;

    fn identity(&self) -> i64 {
        self.series_id
    }
}

/// Shape class of a card number, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardNumberClass {
    ComplexHyphenated,
    StandardHyphenated,
    SimpleHyphenated,
    LettersNumbers,
    NumbersLetters,
    PureNumeric,
}

impl CardNumberClass {
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::ComplexHyphenated => "complex_hyphenated",
            Self::StandardHyphenated => "standard_hyphenated",
            Self::SimpleHyphenated => "simple_hyphenated",
            Self::LettersNumbers => "letters_numbers",
            Self::NumbersLetters => "numbers_letters",
            Self::PureNumeric => "pure_numeric",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardNumberToken {
    /// Uppercased card number as it appeared.
    pub pattern: String,
    pub pattern_class: CardNumberClass,
}

impl Identity for CardNumberToken {
    type Key = String;

    fn identity(&self) -> String {
        self.pattern.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearToken {
    pub year: i32,
}

impl Identity for YearToken {
    type Key = i32;

    fn identity(&self) -> i32 {
        self.year
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialToken {
    pub print_run: u32,
}

impl Identity for SerialToken {
    type Key = u32;

    fn identity(&self) -> u32 {
        self.print_run
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCodeToken {
    pub code: String,
}

impl Identity for ProductionCodeToken {
    type Key = String;

    fn identity(&self) -> String {
        self.code.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelToken {
    pub color_id: i64,
    pub color_name: String,
    pub hex_value: Option<String>,
}

impl Identity for ParallelToken {
    type Key = i64;

    fn identity(&self) -> i64 {
        self.color_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertToken {
    pub series_id: i64,
    pub series_name: String,
}

impl Identity for InsertToken {
    type Key = i64;

    fn identity(&self) -> i64 {
        self.series_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordToken {
    pub keyword: String,
}

impl Identity for KeywordToken {
    type Key = String;

    fn identity(&self) -> String {
        self.keyword.clone()
    }
}

/// Card-type flags are a set of booleans, not a token list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTypeFlags {
    pub rookie: bool,
    pub autograph: bool,
    pub short_print: bool,
    pub relic: bool,
}

impl CardTypeFlags {
    /// Number of flags set.
    #[must_use]
    pub fn count(&self) -> usize {
        [self.rookie, self.autograph, self.short_print, self.relic]
            .iter()
            .filter(|f| **f)
            .count()
    }

    #[must_use]
    pub fn any(&self) -> bool {
        self.count() > 0
    }
}

/// One filterable dimension of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Player,
    Team,
    Set,
    CardNumber,
    Year,
    Serial,
    ProductionCode,
    Parallel,
    Insert,
    CardType,
    Keyword,
}

impl Facet {
    pub const ALL: [Self; 11] = [
        Self::Player,
        Self::Team,
        Self::Set,
        Self::CardNumber,
        Self::Year,
        Self::Serial,
        Self::ProductionCode,
        Self::Parallel,
        Self::Insert,
        Self::CardType,
        Self::Keyword,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::Player => "player",
            Self::Team => "team",
            Self::Set => "set",
            Self::CardNumber => "card_number",
            Self::Year => "year",
            Self::Serial => "serial",
            Self::ProductionCode => "production_code",
            Self::Parallel => "parallel",
            Self::Insert => "insert",
            Self::CardType => "card_type",
            Self::Keyword => "keywords",
        }
    }

    /// Facets naming a catalog entity rather than narrowing one.
    #[must_use]
    pub const fn is_entity_name(&self) -> bool {
        matches!(self, Self::Player | Self::Team | Self::Set)
    }

    /// Facets that narrow a listing down to individual cards.
    #[must_use]
    pub const fn is_narrowing(&self) -> bool {
        matches!(
            self,
            Self::Year
                | Self::CardNumber
                | Self::Serial
                | Self::ProductionCode
                | Self::CardType
                | Self::Parallel
                | Self::Insert
        )
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every token extracted from one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub players: Vec<Token<PlayerToken>>,
    pub teams: Vec<Token<TeamToken>>,
    pub sets: Vec<Token<SetToken>>,
    pub card_numbers: Vec<Token<CardNumberToken>>,
    pub years: Vec<Token<YearToken>>,
    pub serials: Vec<Token<SerialToken>>,
    pub production_codes: Vec<Token<ProductionCodeToken>>,
    pub parallels: Vec<Token<ParallelToken>>,
    pub inserts: Vec<Token<InsertToken>>,
    pub card_types: CardTypeFlags,
    pub keywords: Vec<Token<KeywordToken>>,
}

impl TokenSet {
    /// Whether a facet carries at least one token (or flag).
    #[must_use]
    pub fn has(&self, facet: Facet) -> bool {
        match facet {
            Facet::Player => !self.players.is_empty(),
            Facet::Team => !self.teams.is_empty(),
            Facet::Set => !self.sets.is_empty(),
            Facet::CardNumber => !self.card_numbers.is_empty(),
            Facet::Year => !self.years.is_empty(),
            Facet::Serial => !self.serials.is_empty(),
            Facet::ProductionCode => !self.production_codes.is_empty(),
            Facet::Parallel => !self.parallels.is_empty(),
            Facet::Insert => !self.inserts.is_empty(),
            Facet::CardType => self.card_types.any(),
            Facet::Keyword => !self.keywords.is_empty(),
        }
    }

    /// Drop every token of a facet.
    pub fn clear(&mut self, facet: Facet) {
        match facet {
            Facet::Player => self.players.clear(),
            Facet::Team => self.teams.clear(),
            Facet::Set => self.sets.clear(),
            Facet::CardNumber => self.card_numbers.clear(),
            Facet::Year => self.years.clear(),
            Facet::Serial => self.serials.clear(),
            Facet::ProductionCode => self.production_codes.clear(),
            Facet::Parallel => self.parallels.clear(),
            Facet::Insert => self.inserts.clear(),
            Facet::CardType => self.card_types = CardTypeFlags::default(),
            Facet::Keyword => self.keywords.clear(),
        }
    }

    /// Non-empty facets in canonical order.
    #[must_use]
    pub fn active_facets(&self) -> Vec<Facet> {
        Facet::ALL.into_iter().filter(|f| self.has(*f)).collect()
    }

    /// Count of non-empty variants; each set card-type flag counts once.
    #[must_use]
    pub fn active_type_count(&self) -> usize {
        self.active_facets()
            .iter()
            .map(|f| match f {
                Facet::CardType => self.card_types.count(),
                _ => 1,
            })
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active_type_count() == 0
    }

    /// Highest confidence among a facet's tokens.
    #[must_use]
    pub fn best_confidence(&self, facet: Facet) -> Option<u8> {
        fn best<T>(tokens: &[Token<T>]) -> Option<u8> {
            tokens.iter().map(|t| t.confidence).max()
        }
        match facet {
            Facet::Player => best(&self.players),
            Facet::Team => best(&self.teams),
            Facet::Set => best(&self.sets),
            Facet::CardNumber => best(&self.card_numbers),
            Facet::Year => best(&self.years),
            Facet::Serial => best(&self.serials),
            Facet::ProductionCode => best(&self.production_codes),
            Facet::Parallel => best(&self.parallels),
            Facet::Insert => best(&self.inserts),
            Facet::Keyword => best(&self.keywords),
            Facet::CardType => None,
        }
    }
}

/// Insert a token unless one with the same identity exists; on collision
/// the higher-confidence token is kept.
pub fn push_unique<T: Identity>(tokens: &mut Vec<Token<T>>, token: Token<T>) {
    let key = token.value.identity();
    if let Some(existing) = tokens.iter_mut().find(|t| t.value.identity() == key) {
        if token.confidence > existing.confidence {
            *existing = token;
        }
    } else {
        tokens.push(token);
    }
}

/// Highest-confidence token of a list; ties keep the earliest.
#[must_use]
pub fn strongest<T>(tokens: &[Token<T>]) -> Option<&Token<T>> {
    tokens
        .iter()
        .reduce(|best, t| if t.confidence > best.confidence { t } else { best })
}
