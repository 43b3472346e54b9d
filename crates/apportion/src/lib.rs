//! Integer percentage apportionment for per-option response tallies.
//!
//! Converts raw counts into whole percentages that sum to exactly 100 for
//! any positive total, using round-half-up with an overshoot damping step
//! and a largest-remainder fallback. All arithmetic happens in integer
//! centipercent (hundredths of a percent), which realizes two decimal
//! digits of precision without floating-point comparisons.

use std::collections::BTreeMap;

/// Centipercent per whole percentage point.
const SCALE: u64 = 100;

/// Computes display percentages for `counts`, one entry per option in
/// option-index order.
///
/// Guarantees, for a positive total: same length as the input, every entry
/// in `0..=100`, and a sum of exactly 100. A zero total yields an all-zero
/// vector of the same length; counts of zero are rendered as 0%, never
/// hidden. The function is pure: identical input always produces identical
/// output.
///
/// Entries sharing an identical raw percentage form a tie group and are
/// rounded up or down together wherever possible. The one exception is a
/// tie group larger than the remaining point budget: the sum-to-100
/// guarantee outranks group atomicity there, and the leftover points go to
/// the group's lowest option indices. Three equal counts therefore resolve
/// to `[34, 33, 33]`.
pub fn percentages(counts: &[u64]) -> Vec<u8> {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    let raw: Vec<u64> = counts
        .iter()
        .map(|&count| raw_centipercent(count, total))
        .collect();

    let rounded: Vec<u64> = raw.iter().map(|&value| round_half_up(value)).collect();
    let rounded_sum: u64 = rounded.iter().sum();
    if rounded_sum == 100 {
        return narrow(rounded);
    }

    if rounded_sum > 100 {
        // Many entries rounding up at once can overshoot 100 by up to 3
        // points for the supported option counts. Damping each fractional
        // part by 2/3 pulls the re-rounded sum back under; the factor is
        // load-bearing for that bound and must not be changed.
        let corrected: Vec<u64> = raw
            .iter()
            .map(|&value| round_half_up(value - (value % SCALE) * 2 / 3))
            .collect();
        if corrected.iter().sum::<u64>() == 100 {
            return narrow(corrected);
        }
    }

    largest_remainder(&raw)
}

/// `100 * count / total` in centipercent, rounded half-up.
fn raw_centipercent(count: u64, total: u64) -> u64 {
    let numerator = count as u128 * 10_000;
    ((numerator * 2 + total as u128) / (total as u128 * 2)) as u64
}

fn round_half_up(centipercent: u64) -> u64 {
    (centipercent + SCALE / 2) / SCALE
}

fn narrow(values: Vec<u64>) -> Vec<u8> {
    values.into_iter().map(|value| value as u8).collect()
}

/// Distributes the points left over after flooring, whole tie group by
/// whole tie group, largest fractional remainder first.
fn largest_remainder(raw: &[u64]) -> Vec<u8> {
    let mut out: Vec<u64> = raw.iter().map(|&value| value / SCALE).collect();
    let floor_sum: u64 = out.iter().sum();
    let mut budget = 100u64.saturating_sub(floor_sum);

    // Entries with identical raw values round together.
    let mut members_by_raw: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
    for (index, &value) in raw.iter().enumerate() {
        members_by_raw.entry(value).or_default().push(index);
    }

    let mut groups: Vec<(u64, Vec<usize>)> = members_by_raw.into_iter().collect();
    groups.sort_by(|a, b| (b.0 % SCALE, b.0).cmp(&(a.0 % SCALE, a.0)));

    let mut skipped: Option<Vec<usize>> = None;
    for (raw_value, members) in &groups {
        if budget == 0 {
            break;
        }
        // A remainder of exactly zero never earns a bonus point.
        if raw_value % SCALE == 0 {
            continue;
        }
        if members.len() as u64 <= budget {
            for &index in members {
                out[index] += 1;
            }
            budget -= members.len() as u64;
        } else if skipped.is_none() {
            skipped = Some(members.clone());
        }
    }

    // A tie group wider than the remaining budget is the one place the
    // sum-to-100 guarantee outranks group atomicity: leftover points go to
    // the group's lowest option indices.
    if budget > 0 {
        if let Some(mut members) = skipped {
            members.sort_unstable();
            for &index in members.iter().take(budget as usize) {
                out[index] += 1;
            }
        }
    }

    narrow(out)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
