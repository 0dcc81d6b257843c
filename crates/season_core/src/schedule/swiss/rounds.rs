//! Round assignment: split the oriented matches into rounds where every team
//! plays exactly once.
//!
//! Each round is a perfect matching over the still-unscheduled matches. A
//! random greedy pass covers most teams; every team it leaves uncovered is
//! then reached through an augmenting path (BFS alternating unused and matched
//! edges, ending at another uncovered team) and the path is flipped.

use rand::seq::SliceRandom;
use rand::Rng;

use super::graph::Arc;

fn other_end(arc: Arc, v: usize) -> usize {
    if arc.0 == v {
        arc.1
    } else {
        arc.0
    }
}

/// Partition `arcs` into `round_count` perfect matchings over `vertices` teams.
/// Returns arc indices per round, or `None` if some round could not be completed.
pub fn schedule_rounds<R: Rng + ?Sized>(
    vertices: usize,
    arcs: &[Arc],
    round_count: usize,
    rng: &mut R,
) -> Option<Vec<Vec<usize>>> {
    if vertices % 2 != 0 || arcs.len() != round_count * vertices / 2 {
        return None;
    }

    let mut used = vec![false; arcs.len()];
    let mut rounds = Vec::with_capacity(round_count);
    for round in 0..round_count {
        let Some(chosen) = match_round(vertices, arcs, &used, rng) else {
            log::debug!("round {} could not be completed", round + 1);
            return None;
        };
        for &i in &chosen {
            used[i] = true;
        }
        rounds.push(chosen);
    }
    Some(rounds)
}

/// One perfect matching among the unused arcs.
fn match_round<R: Rng + ?Sized>(
    vertices: usize,
    arcs: &[Arc],
    used: &[bool],
    rng: &mut R,
) -> Option<Vec<usize>> {
    let mut available: Vec<usize> = (0..arcs.len()).filter(|&i| !used[i]).collect();
    available.shuffle(rng);

    let mut adjacency = vec![Vec::new(); vertices];
    for &i in &available {
        let (a, b) = arcs[i];
        adjacency[a].push(i);
        adjacency[b].push(i);
    }

    let mut mate: Vec<Option<usize>> = vec![None; vertices];
    for &i in &available {
        let (a, b) = arcs[i];
        if mate[a].is_none() && mate[b].is_none() {
            mate[a] = Some(i);
            mate[b] = Some(i);
        }
    }

    for v in 0..vertices {
        if mate[v].is_none() && !augment(v, arcs, &adjacency, &mut mate) {
            return None;
        }
    }

    let mut chosen: Vec<usize> = Vec::with_capacity(vertices / 2);
    for (v, m) in mate.iter().enumerate() {
        let i = (*m)?;
        if arcs[i].0 == v {
            chosen.push(i);
        }
    }
    Some(chosen)
}

/// Grow the matching by one pair through an alternating path from `root`.
fn augment(root: usize, arcs: &[Arc], adjacency: &[Vec<usize>], mate: &mut [Option<usize>]) -> bool {
    let vertices = adjacency.len();
    let mut visited = vec![false; vertices];
    // parent[y] = (outer vertex that reached y, unmatched arc used)
    let mut parent: Vec<Option<(usize, usize)>> = vec![None; vertices];
    let mut queue = std::collections::VecDeque::new();
    visited[root] = true;
    queue.push_back(root);

    while let Some(x) = queue.pop_front() {
        for &i in &adjacency[x] {
            if mate[x] == Some(i) {
                continue;
            }
            let y = other_end(arcs[i], x);
            if visited[y] {
                continue;
            }
            match mate[y] {
                None => {
                    parent[y] = Some((x, i));
                    flip(y, arcs, &parent, mate);
                    return true;
                }
                Some(j) => {
                    let z = other_end(arcs[j], y);
                    if visited[z] {
                        continue;
                    }
                    visited[y] = true;
                    visited[z] = true;
                    parent[y] = Some((x, i));
                    queue.push_back(z);
                }
            }
        }
    }
    false
}

/// Swap matched and unmatched arcs along the path ending at free vertex `end`.
fn flip(end: usize, arcs: &[Arc], parent: &[Option<(usize, usize)>], mate: &mut [Option<usize>]) {
    let mut y = end;
    while let Some((x, i)) = parent[y] {
        let previous = mate[x];
        mate[y] = Some(i);
        mate[x] = Some(i);
        match previous {
            Some(j) => y = other_end(arcs[j], x),
            None => break,
        }
    }
}
