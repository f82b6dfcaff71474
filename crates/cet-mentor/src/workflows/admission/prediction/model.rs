//! The deterministic heuristics behind every shortlist: a linear score-to-rank
//! proxy and a four-band admission probability curve. Directional guidance
//! only; nothing here is statistically calibrated.

/// Converts a raw CET score into an estimated competitive rank.
///
/// Fixed linear proxy: `max(1, floor((200 - score) * 500))`. Higher scores
/// map to lower (better) ranks. Callers validate the score range first.
pub fn estimated_rank(score: f64) -> u32 {
    let rank = ((200.0 - score) * 500.0).floor();
    if rank < 1.0 {
        1
    } else {
        rank as u32
    }
}

/// Admission likelihood for a candidate rank against a historical cutoff.
///
/// Band boundaries and integer-floor arithmetic are load-bearing: results
/// must match the published predictor exactly. The outcome is clamped to
/// [1, 99] so the service never claims certainty either way.
pub fn admission_probability(estimated_rank: u32, cutoff_rank: u32) -> u8 {
    let est = i64::from(estimated_rank);
    let cut = i64::from(cutoff_rank);

    let raw = if est <= cut {
        // At or above the cutoff: safe admit, small bonus for extra margin.
        85 + ((cut - est) / 100).min(15)
    } else if est <= cut + 2_000 {
        // Competitive zone.
        60 + (2_000 - (est - cut)) / 100
    } else if est <= cut + 5_000 {
        // Reach zone.
        30 + (5_000 - (est - cut)) / 200
    } else {
        // Long shot, floored at 5 before the final clamp.
        (30 - (est - cut - 5_000) / 300).max(5)
    };

    raw.clamp(1, 99) as u8
}
