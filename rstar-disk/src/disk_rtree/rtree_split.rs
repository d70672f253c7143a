//! R*-style node splitting.
//!
//! An overflowing node holds `capacity + 1` entries. The split axis is the
//! one whose candidate distributions have the smallest total margin; along
//! that axis the distribution with the least overlap between the two groups
//! wins, with total area breaking ties. Each group keeps at least
//! `min_entries` entries.
//!
//! With a single dimension there is no axis to choose, so the entries are
//! sorted by `(low, high)` and cut in half, the first group taking the extra
//! entry when the count is odd.
//!
//! Sorting is stable and every tie resolves to the lowest axis, sort order
//! and split position, so the same input always yields the same groups.

use std::cmp::Ordering;

use crate::geometry::HyperRectangle;

/// Splits `entries` into two groups. `bounds` gives the rectangle of an
/// entry (a zero-area box for a point).
pub fn split<T>(
    entries: Vec<T>,
    bounds: impl Fn(&T) -> HyperRectangle,
    dimension: usize,
    min_entries: usize,
) -> (Vec<T>, Vec<T>) {
    let rects: Vec<HyperRectangle> = entries.iter().map(&bounds).collect();
    let n = rects.len();
    if n < 2 {
        return (entries, Vec::new());
    }

    let (order, at) = if dimension <= 1 {
        let mid = (n + 1) / 2;
        log::debug!("split {} entries in half at {} (single axis)", n, mid);
        (sorted_order(&rects, 0, SortKey::Lower), mid)
    } else {
        let min_entries = min_entries.clamp(1, n / 2);
        let axis = choose_split_axis(&rects, dimension, min_entries);
        let (order, at) = choose_split_index(&rects, axis, min_entries);
        log::debug!(
            "split {} entries on axis {} into {} and {}",
            n,
            axis,
            at,
            n - at
        );
        (order, at)
    };

    partition(entries, &order, at)
}

#[derive(Clone, Copy)]
enum SortKey {
    Lower,
    Upper,
}

const SORT_KEYS: [SortKey; 2] = [SortKey::Lower, SortKey::Upper];

/// Entry indices sorted along `axis` by lower bound then upper bound, or
/// by upper bound then lower bound.
fn sorted_order(rects: &[HyperRectangle], axis: usize, key: SortKey) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rects.len()).collect();
    order.sort_by(|&a, &b| {
        let (ra, rb) = (&rects[a], &rects[b]);
        let by_low = ra.low()[axis].total_cmp(&rb.low()[axis]);
        let by_high = ra.high()[axis].total_cmp(&rb.high()[axis]);
        match key {
            SortKey::Lower => by_low.then(by_high),
            SortKey::Upper => by_high.then(by_low),
        }
    });
    order
}

/// Bounds of every prefix and suffix of `order`: `prefix[i]` covers
/// `order[..i]`, `suffix[i]` covers `order[i..]`.
fn group_bounds(
    rects: &[HyperRectangle],
    order: &[usize],
) -> (Vec<HyperRectangle>, Vec<HyperRectangle>) {
    let n = order.len();
    let dimension = rects[order[0]].dimension();

    let mut prefix = Vec::with_capacity(n + 1);
    let mut acc = HyperRectangle::new(dimension);
    prefix.push(acc.clone());
    for &i in order {
        acc.expand(&rects[i]);
        prefix.push(acc.clone());
    }

    let mut suffix = vec![HyperRectangle::new(dimension); n + 1];
    let mut acc = HyperRectangle::new(dimension);
    for pos in (0..n).rev() {
        acc.expand(&rects[order[pos]]);
        suffix[pos] = acc.clone();
    }
    (prefix, suffix)
}

/// Valid sizes of the first group.
fn split_positions(n: usize, min_entries: usize) -> std::ops::RangeInclusive<usize> {
    min_entries..=(n - min_entries)
}

fn choose_split_axis(rects: &[HyperRectangle], dimension: usize, min_entries: usize) -> usize {
    let n = rects.len();
    let mut best_axis = 0;
    let mut best_margin = f64::INFINITY;

    for axis in 0..dimension {
        let mut margin_sum = 0.0;
        for key in SORT_KEYS {
            let order = sorted_order(rects, axis, key);
            let (prefix, suffix) = group_bounds(rects, &order);
            for at in split_positions(n, min_entries) {
                margin_sum += prefix[at].margin() + suffix[at].margin();
            }
        }
        if margin_sum < best_margin {
            best_margin = margin_sum;
            best_axis = axis;
        }
    }
    best_axis
}

fn choose_split_index(
    rects: &[HyperRectangle],
    axis: usize,
    min_entries: usize,
) -> (Vec<usize>, usize) {
    let n = rects.len();
    let mut best: Option<(Vec<usize>, usize)> = None;
    let mut best_overlap = f64::INFINITY;
    let mut best_area = f64::INFINITY;

    for key in SORT_KEYS {
        let order = sorted_order(rects, axis, key);
        let (prefix, suffix) = group_bounds(rects, &order);
        let mut chosen = None;
        for at in split_positions(n, min_entries) {
            let overlap = prefix[at].overlap(&suffix[at]);
            let area = prefix[at].area() + suffix[at].area();
            let better = match overlap.total_cmp(&best_overlap) {
                Ordering::Less => true,
                Ordering::Equal => area < best_area,
                Ordering::Greater => false,
            };
            if better {
                best_overlap = overlap;
                best_area = area;
                chosen = Some(at);
            }
        }
        if let Some(at) = chosen {
            best = Some((order, at));
        }
    }

    best.unwrap_or_else(|| ((0..n).collect(), n / 2))
}

fn partition<T>(entries: Vec<T>, order: &[usize], at: usize) -> (Vec<T>, Vec<T>) {
    let mut slots: Vec<Option<T>> = entries.into_iter().map(Some).collect();
    let mut take = |idx: &[usize]| -> Vec<T> {
        idx.iter().filter_map(|&i| slots[i].take()).collect()
    };
    let first = take(&order[..at]);
    let second = take(&order[at..]);
    (first, second)
}
