use cardex_core::{SearchConfig, TokenSet};
use std::collections::HashSet;

use tracing::debug;

/// Drop parallel tokens whose words are already explained by a matched
/// name: a surname like "White" must not also filter by colour.
///
/// A player only claims its name words when the match is strong (at or
/// above the strong-match confidence, or matched by two or more words).
/// Any matched team claims its name, city and mascot words.
pub fn resolve_collisions(tokens: &mut TokenSet, config: &SearchConfig) {
    if tokens.parallels.is_empty() {
        return;
    }

    let mut claimed: HashSet<String> = HashSet::new();
    for player in &tokens.players {
        if player.confidence >= config.strong_match_confidence || player.span_words() >= 2 {
            claimed.extend(player.value.name_components());
        }
    }
    for team in &tokens.teams {
        claimed.extend(team.value.name_words());
    }
    if claimed.is_empty() {
        return;
    }

    tokens.parallels.retain(|parallel| {
        let explained = parallel
            .matched_span
            .split_whitespace()
            .all(|w| claimed.contains(&w.to_lowercase()));
        if explained {
            debug!(
                "Dropping parallel '{}': '{}' is part of a matched name",
                parallel.value.color_name, parallel.matched_span
            );
        }
        !explained
    });
}
