use std::cmp::Ordering;

use serde::Serialize;

/// Stored averages are on a 0-10 scale; the leaderboard shows 0-100.
pub const DISPLAY_SCALE: f64 = 10.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedEntry<T> {
    /// 1-based position. Ties keep input order and still get distinct ranks.
    pub rank: usize,
    pub score: f64,
    pub item: T,
}

/// Ranked submissions followed by the ones nobody has judged yet.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Leaderboard<T> {
    pub ranked: Vec<RankedEntry<T>>,
    /// Kept in input order and never given a rank or a score.
    pub unscored: Vec<T>,
}

/// Rank items by their stored average score, highest first.
///
/// Items whose average is missing (or not a finite number) are placed in the
/// `unscored` section instead of receiving a made-up score.
pub fn rank<T, I, F>(items: I, average_of: F) -> Leaderboard<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> Option<f64>,
{
    let mut scored = Vec::new();
    let mut unscored = Vec::new();

    for item in items {
        match average_of(&item).filter(|avg| avg.is_finite()) {
            Some(avg) => scored.push((avg * DISPLAY_SCALE, item)),
            None => unscored.push(item),
        }
    }

    // `sort_by` is stable, so exact ties keep their input order.
    scored.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    let ranked = scored
        .into_iter()
        .enumerate()
        .map(|(idx, (score, item))| RankedEntry {
            rank: idx + 1,
            score,
            item,
        })
        .collect();

    Leaderboard { ranked, unscored }
}
