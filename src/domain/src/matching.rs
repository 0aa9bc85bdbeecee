//! Fuzzy resolution of a spoken phrase against hub entities.

use crate::entities::hub_entity::HubEntity;

/// A candidate must score strictly above this to be selected.
pub const MATCH_THRESHOLD: u8 = 50;

/// Lower-cases, turns punctuation into spaces, and sorts the tokens so that
/// "temperature outside" and "outside temperature" compare equal.
pub fn token_sort_key(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Similarity of two phrases on a 0-100 scale, compared on their token-sort
/// keys as `2 * M / (len_a + len_b)` where `M` is the number of characters
/// the two keys share in order.
pub fn match_score(spoken: &str, candidate: &str) -> u8 {
    let left: Vec<char> = token_sort_key(spoken).chars().collect();
    let right: Vec<char> = token_sort_key(candidate).chars().collect();
    if left.is_empty() || right.is_empty() {
        return 0;
    }
    let matched = common_subsequence_len(&left, &right);
    let ratio = 2.0 * matched as f64 / (left.len() + right.len()) as f64;
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

// Longest common subsequence; single row of the DP table.
fn common_subsequence_len(left: &[char], right: &[char]) -> usize {
    let mut row = vec![0usize; right.len() + 1];
    for &l in left {
        let mut diagonal = 0;
        for (j, &r) in right.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if l == r {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[right.len()]
}

/// Picks the entity with the strictly highest score above
/// [`MATCH_THRESHOLD`] among those whose domain is allowed.
///
/// Each candidate is scored on its `friendly_name` and then on its raw
/// `entity_id`; ties keep the first-seen entity.
pub fn best_match<'a, I>(spoken: &str, candidates: I, allowed_domains: &[&str]) -> Option<(&'a HubEntity, u8)>
where
    I: IntoIterator<Item = &'a HubEntity>,
{
    let mut best_score = MATCH_THRESHOLD;
    let mut best = None;

    for entity in candidates {
        if !allowed_domains.contains(&entity.domain()) {
            continue;
        }
        let by_name = entity
            .declared_name()
            .map(|name| match_score(spoken, name))
            .unwrap_or(0);
        let by_id = match_score(spoken, &entity.entity_id);
        let score = by_name.max(by_id);
        if score > best_score {
            best_score = score;
            best = Some(entity);
        }
    }

    best.map(|entity| (entity, best_score))
}
