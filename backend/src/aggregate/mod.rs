//! Reduce normalized climbs into [`ClimbingStats`].
//!
//! Sends are split into two buckets by route type: boulder-tagged climbs and
//! everything else ("wall" climbs). Each bucket keeps its hardest send. The
//! first climb seen wins a tie, matching a stable `max`.

use std::cmp::Ordering;

use crate::error::AggregateError;
use crate::models::{Climb, ClimbingStats, ClimbingSummary};

/// Compute statistics over `climbs`.
///
/// Fails only when a bucket mixes route and boulder grades, since those
/// cannot be ranked against each other.
pub fn aggregate(climbs: &[Climb]) -> Result<ClimbingStats, AggregateError> {
    let hardest_boulder_problem = hardest(climbs.iter().filter(|c| c.sent && c.is_boulder()))?;
    let hardest_wall_problem = hardest(climbs.iter().filter(|c| c.sent && !c.is_boulder()))?;

    Ok(ClimbingStats {
        total_feet: total_feet(climbs),
        total_climbs: climbs.len(),
        avg_rating: average_rating(climbs),
        hardest_boulder_problem: hardest_boulder_problem.cloned(),
        hardest_wall_problem: hardest_wall_problem.cloned(),
    })
}

/// Pair `climbs` with their statistics.
pub fn summarize(climbs: Vec<Climb>) -> Result<ClimbingSummary, AggregateError> {
    let stats = aggregate(&climbs)?;
    Ok(ClimbingSummary { climbs, stats })
}

/// Sum of the lengths that are present.
pub fn total_feet(climbs: &[Climb]) -> u64 {
    climbs
        .iter()
        .filter_map(|c| c.length)
        .map(u64::from)
        .sum()
}

/// Mean community rating, `0.0` for an empty slice.
pub fn average_rating(climbs: &[Climb]) -> f64 {
    let sum: f64 = climbs.iter().map(|c| c.community_rating).sum();
    sum / climbs.len().max(1) as f64
}

/// Hardest climb of an iterator; the earliest of equal grades wins.
pub fn hardest<'a, I>(climbs: I) -> Result<Option<&'a Climb>, AggregateError>
where
    I: IntoIterator<Item = &'a Climb>,
{
    let mut best: Option<&Climb> = None;
    for climb in climbs {
        best = match best {
            None => Some(climb),
            Some(current) => {
                let ordering = climb.grade.try_cmp(&current.grade).map_err(|source| {
                    AggregateError::MixedGradeFamilies {
                        first: current.route.clone(),
                        second: climb.route.clone(),
                        source,
                    }
                })?;
                if ordering == Ordering::Greater {
                    Some(climb)
                } else {
                    Some(current)
                }
            }
        };
    }
    Ok(best)
}
