//! Load balancing among equally scored lineups.
//!
//! Runs after the search, one performed dance at a time. The dance's
//! positions are re-matched with the Hungarian method. Each edge costs its
//! negated objective gain, followed by the dancer's load as one extra,
//! lowest level. The minimum-cost matching keeps the best score the dance
//! can reach, and among matchings with that score it gives positions to
//! dancers who hold the fewest so far.

use super::index::ModelIndex;
use crate::model::{AssignmentModel, Score, VarId};
use std::collections::BTreeMap;

/// Best lineup for one dance, or `None` if its positions cannot all be
/// filled.
///
/// Only the dance's own at-most-one constraints are respected, so callers
/// must use it on single-dance components only.
pub(crate) fn rebalance(
    model: &AssignmentModel,
    index: &ModelIndex,
    dance: usize,
    loads: &[u32],
) -> Option<Vec<VarId>> {
    let slots = &model.dances[dance].slots;
    let mut columns: BTreeMap<usize, usize> = BTreeMap::new();
    for &s in slots {
        for &id in &index.slot_vars[s] {
            let next = columns.len();
            columns.entry(model.var(id).dancer).or_insert(next);
        }
    }

    // cost[row][column], None where the dancer is not a candidate
    let mut cost: Vec<Vec<Option<(Score, VarId)>>> = vec![vec![None; columns.len()]; slots.len()];
    for (row, &s) in slots.iter().enumerate() {
        for &id in &index.slot_vars[s] {
            let dancer = model.var(id).dancer;
            let edge = edge_cost(index, id, loads[dancer]);
            let cell = &mut cost[row][columns[&dancer]];
            if cell.as_ref().map_or(true, |(best, _)| edge < *best) {
                *cell = Some((edge, id));
            }
        }
    }

    let levels = index.criteria.len() + 1;
    let assignment = hungarian(&cost, levels)?;
    let mut chosen: Vec<VarId> = assignment
        .into_iter()
        .enumerate()
        .filter_map(|(row, column)| cost[row][column].as_ref().map(|(_, id)| *id))
        .collect();
    chosen.sort_unstable();
    (chosen.len() == slots.len()).then_some(chosen)
}

fn edge_cost(index: &ModelIndex, id: VarId, load: u32) -> Score {
    let mut levels: Vec<i64> = index.gains[id.0].levels().iter().map(|g| -g).collect();
    levels.push(i64::from(load));
    Score::from(levels)
}

/// Minimum-cost assignment of every row to a distinct column.
///
/// Costs are compared lexicographically. Returns the column of each row,
/// or `None` when no complete assignment exists.
fn hungarian(cost: &[Vec<Option<(Score, VarId)>>], levels: usize) -> Option<Vec<usize>> {
    let rows = cost.len();
    let columns = cost.first().map_or(0, Vec::len);
    if rows > columns {
        return None;
    }

    // 1-based; row 0 and column 0 are sentinels
    let zero = Score::zero(levels);
    let mut u = vec![zero.clone(); rows + 1];
    let mut v = vec![zero.clone(); columns + 1];
    let mut owner = vec![0usize; columns + 1];
    let mut way = vec![0usize; columns + 1];

    for row in 1..=rows {
        owner[0] = row;
        let mut j0 = 0;
        let mut slack: Vec<Option<Score>> = vec![None; columns + 1];
        let mut used = vec![false; columns + 1];
        loop {
            used[j0] = true;
            let i0 = owner[j0];
            let mut delta: Option<Score> = None;
            let mut j1 = 0;
            for j in 1..=columns {
                if used[j] {
                    continue;
                }
                if let Some((edge, _)) = &cost[i0 - 1][j - 1] {
                    let mut reduced = edge.clone();
                    reduced.sub(&u[i0]);
                    reduced.sub(&v[j]);
                    if slack[j].as_ref().map_or(true, |s| reduced < *s) {
                        slack[j] = Some(reduced);
                        way[j] = j0;
                    }
                }
                if let Some(s) = &slack[j] {
                    if delta.as_ref().map_or(true, |d| s < d) {
                        delta = Some(s.clone());
                        j1 = j;
                    }
                }
            }
            let delta = delta?;
            for j in 0..=columns {
                if used[j] {
                    u[owner[j]].add(&delta);
                    v[j].sub(&delta);
                } else if let Some(s) = &mut slack[j] {
                    s.sub(&delta);
                }
            }
            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; rows];
    for j in 1..=columns {
        if owner[j] != 0 {
            assignment[owner[j] - 1] = j - 1;
        }
    }
    Some(assignment)
}
