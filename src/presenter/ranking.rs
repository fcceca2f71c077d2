use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedContribution<'a> {
    pub feature: &'a str,
    pub weight: f64,
}

/// Orders contributions by descending `|weight|` and keeps the first `limit`.
///
/// Equal magnitudes are ordered by feature name so the output does not depend
/// on map iteration order.
pub fn rank_contributions(
    contributions: &HashMap<String, f64>,
    limit: usize,
) -> Vec<RankedContribution<'_>> {
    let mut ranked: Vec<RankedContribution<'_>> = contributions
        .iter()
        .map(|(feature, weight)| RankedContribution {
            feature: feature.as_str(),
            weight: *weight,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.weight
            .abs()
            .total_cmp(&a.weight.abs())
            .then_with(|| a.feature.cmp(b.feature))
    });
    ranked.truncate(limit);
    ranked
}
