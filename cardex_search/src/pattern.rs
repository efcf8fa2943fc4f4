//! Token set classification.

use cardex_core::{Facet, Pattern, Shape, Strategy, TokenSet};

/// Confidence every set card-type flag contributes.
pub const CARD_TYPE_CONFIDENCE: u8 = 90;
const PRODUCTION_CODE_CONFIDENCE: u8 = 98;
const DEFAULT_SINGLE_CONFIDENCE: u8 = 80;

/// Classifies a [`TokenSet`] into a shape, strategy and confidence.
///
/// Pure: the same token set always yields the same pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternRecognizer;

impl PatternRecognizer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn recognize(&self, tokens: &TokenSet) -> Pattern {
        let active_type_count = tokens.active_type_count();
        let shape = Shape::from_count(active_type_count);
        if shape == Shape::Empty {
            return Pattern::empty();
        }

        let facets = tokens.active_facets();
        let strategy = select_strategy(shape, &facets);
        let confidence = if shape == Shape::Single {
            single_confidence(tokens, facets[0])
        } else {
            combined_confidence(tokens, &facets, active_type_count)
        };

        Pattern {
            shape,
            strategy,
            confidence,
            active_type_count,
        }
    }
}

/// Ordered strategy table; the final arm is the default.
fn select_strategy(shape: Shape, facets: &[Facet]) -> Strategy {
    let has = |facet: Facet| facets.contains(&facet);
    match (shape, facets) {
        (Shape::Empty, _) => Strategy::NoResults,
        (Shape::Single, [only]) => single_facet_strategy(*only),
        (_, [Facet::Player, Facet::CardNumber]) => Strategy::PlayerCardNumber,
        _ if has(Facet::Year)
            && has(Facet::Set)
            && !has(Facet::Player)
            && !has(Facet::CardNumber) =>
        {
            Strategy::SetYearBrowse
        }
        _ => Strategy::MultiFilter,
    }
}

const fn single_facet_strategy(facet: Facet) -> Strategy {
    match facet {
        Facet::ProductionCode => Strategy::SeriesByCode,
        Facet::Player => Strategy::PlayerListing,
        Facet::CardNumber => Strategy::CardNumberSearch,
        Facet::Year => Strategy::YearBrowse,
        Facet::Set => Strategy::SetBrowse,
        Facet::Team => Strategy::TeamBrowse,
        Facet::CardType => Strategy::CardTypeBrowse,
        Facet::Parallel => Strategy::ParallelBrowse,
        Facet::Serial => Strategy::SerialBrowse,
        Facet::Insert => Strategy::InsertBrowse,
        Facet::Keyword => Strategy::KeywordBrowse,
    }
}

/// The facet's own best token; card-type flags carry no token confidence.
fn single_confidence(tokens: &TokenSet, facet: Facet) -> u8 {
    match facet {
        Facet::ProductionCode => PRODUCTION_CODE_CONFIDENCE,
        _ => tokens
            .best_confidence(facet)
            .unwrap_or(DEFAULT_SINGLE_CONFIDENCE)
            .min(100),
    }
}

const fn count_bonus(active_type_count: usize) -> u32 {
    match active_type_count {
        0 | 1 => 0,
        2 => 5,
        3 => 7,
        _ => 10,
    }
}

/// Average of the best token per facet, each card-type flag counting as one
/// contribution, plus a bonus that grows with the number of facets.
fn combined_confidence(tokens: &TokenSet, facets: &[Facet], active_type_count: usize) -> u8 {
    let contributions: Vec<u32> = facets
        .iter()
        .flat_map(|facet| match facet {
            Facet::CardType => {
                vec![u32::from(CARD_TYPE_CONFIDENCE); tokens.card_types.count()]
            }
            other => tokens
                .best_confidence(*other)
                .map(u32::from)
                .into_iter()
                .collect(),
        })
        .collect();
    if contributions.is_empty() {
        return 0;
    }

    let n = u32::try_from(contributions.len()).unwrap_or(u32::MAX);
    let average = (contributions.iter().sum::<u32>() + n / 2) / n;
    let total = (average + count_bonus(active_type_count)).min(100);
    u8::try_from(total).unwrap_or(100)
}
