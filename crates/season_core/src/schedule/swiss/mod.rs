//! # Swiss League-Phase Draw
//!
//! Three phases, each working on integer team handles (indices into the
//! validated team list):
//!
//! 1. **Opponent assignment**: random pot-constrained pairing until every team
//!    has `opponents_per_pot` opponents from each pot (bounded retries).
//! 2. **Orientation**: Euler circuits over the pairing graph give every team
//!    as many home as away matches.
//! 3. **Round assignment**: perfect matchings, one per round (bounded retries;
//!    exhaustion restarts from phase 1).

pub mod graph;
pub mod rounds;

use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::config::SwissConfig;
use crate::error::{Result, SeasonError};
use crate::models::{Fixture, SwissTeam, TeamId};

pub use graph::{Arc, PairingGraph};
pub use rounds::schedule_rounds;

/// Validated draw input with integer handles for pots and countries.
#[derive(Debug, Clone)]
pub struct DrawField {
    ids: Vec<TeamId>,
    pot: Vec<usize>,
    country: Vec<usize>,
    pots: Vec<Vec<usize>>,
    country_count: usize,
}

impl DrawField {
    pub fn new(teams: &[SwissTeam], config: &SwissConfig) -> Result<Self> {
        let pot_count = config.pot_count as usize;
        let mut seen = HashSet::with_capacity(teams.len());
        let mut pots = vec![Vec::new(); pot_count];
        let mut country_handles: HashMap<&str, usize> = HashMap::new();
        let mut pot = Vec::with_capacity(teams.len());
        let mut country = Vec::with_capacity(teams.len());

        for (handle, team) in teams.iter().enumerate() {
            if !seen.insert(team.id) {
                return Err(SeasonError::DuplicateTeam { team: team.id });
            }
            if team.pot == 0 || team.pot as usize > pot_count {
                return Err(SeasonError::UnknownPot { team: team.id, pot: team.pot });
            }
            let p = team.pot as usize - 1;
            pots[p].push(handle);
            pot.push(p);
            let next = country_handles.len();
            country.push(*country_handles.entry(team.country.as_str()).or_insert(next));
        }

        for (p, members) in pots.iter().enumerate() {
            if members.len() != config.pot_size {
                return Err(SeasonError::InvalidPotSize {
                    pot: (p + 1) as u8,
                    expected: config.pot_size,
                    found: members.len(),
                });
            }
        }

        Ok(Self { ids: teams.iter().map(|t| t.id).collect(), pot, country, pots, country_count: country_handles.len() })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn team_id(&self, handle: usize) -> TeamId {
        self.ids[handle]
    }

    pub fn pot_of(&self, handle: usize) -> usize {
        self.pot[handle]
    }

    pub fn country_of(&self, handle: usize) -> usize {
        self.country[handle]
    }
}

/// Per-team counters while assigning opponents.
struct PairingTally {
    from_pot: Vec<Vec<usize>>,
    from_country: Vec<Vec<usize>>,
}

impl PairingTally {
    fn new(teams: usize, pots: usize, countries: usize) -> Self {
        Self { from_pot: vec![vec![0; pots]; teams], from_country: vec![vec![0; countries]; teams] }
    }

    fn record(&mut self, field: &DrawField, a: usize, b: usize) {
        self.from_pot[a][field.pot_of(b)] += 1;
        self.from_pot[b][field.pot_of(a)] += 1;
        self.from_country[a][field.country_of(b)] += 1;
        self.from_country[b][field.country_of(a)] += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct SwissDraw {
    config: SwissConfig,
}

impl SwissDraw {
    pub fn new(config: SwissConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SwissConfig {
        &self.config
    }

    /// Full draw: fixtures with round numbers and `start + (round - 1) * interval` dates.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        teams: &[SwissTeam],
        start: NaiveDate,
        interval: Duration,
        rng: &mut R,
    ) -> Result<Vec<Fixture>> {
        let field = DrawField::new(teams, &self.config)?;
        let rounds = self.draw_rounds(&field, rng)?;

        let mut fixtures = Vec::with_capacity(rounds.iter().map(Vec::len).sum());
        for (r, round) in rounds.iter().enumerate() {
            let date = interval
                .checked_mul(r as i32)
                .and_then(|offset| start.checked_add_signed(offset))
                .ok_or_else(|| SeasonError::InvalidConfig(format!("round {} date out of range", r + 1)))?;
            for &(home, away) in round {
                fixtures.push(Fixture {
                    round: (r + 1) as u32,
                    date,
                    home_team_id: field.team_id(home),
                    away_team_id: field.team_id(away),
                });
            }
        }
        Ok(fixtures)
    }

    /// Phases 1-3 on handles: one list of (home, away) arcs per round.
    pub fn draw_rounds<R: Rng + ?Sized>(&self, field: &DrawField, rng: &mut R) -> Result<Vec<Vec<Arc>>> {
        self.config.validate()?;
        let round_count = self.config.opponents_per_team();

        for attempt in 1..=self.config.draw_attempts {
            let graph = self.pair_opponents(field, rng)?;
            let arcs = graph.euler_orientation();

            for scheduling in 1..=self.config.scheduling_attempts {
                if let Some(rounds) = schedule_rounds(field.len(), &arcs, round_count, rng) {
                    log::info!(
                        "swiss draw complete: {} matches in {} rounds (draw attempt {}, scheduling attempt {})",
                        arcs.len(),
                        round_count,
                        attempt,
                        scheduling
                    );
                    return Ok(rounds
                        .into_iter()
                        .map(|round| round.into_iter().map(|i| arcs[i]).collect())
                        .collect());
                }
            }
            log::debug!(
                "draw attempt {}: no round assignment after {} tries, re-pairing",
                attempt,
                self.config.scheduling_attempts
            );
        }

        Err(SeasonError::DrawExhausted { attempts: self.config.draw_attempts })
    }

    /// Phase 1: opponent assignment with bounded retries.
    pub fn pair_opponents<R: Rng + ?Sized>(&self, field: &DrawField, rng: &mut R) -> Result<PairingGraph> {
        for attempt in 1..=self.config.pairing_attempts {
            if let Some(graph) = self.try_pairing(field, rng) {
                log::debug!("opponents assigned on pairing attempt {}", attempt);
                return Ok(graph);
            }
        }
        Err(SeasonError::DrawExhausted { attempts: self.config.pairing_attempts })
    }

    fn try_pairing<R: Rng + ?Sized>(&self, field: &DrawField, rng: &mut R) -> Option<PairingGraph> {
        let n = field.len();
        let per_pot = self.config.opponents_per_pot;
        let per_team = self.config.opponents_per_team();
        let max_country = self.config.max_opponents_per_country;

        let mut graph = PairingGraph::new(n);
        let mut tally = PairingTally::new(n, field.pots.len(), field.country_count);

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        for &team in &order {
            for p in 0..field.pots.len() {
                let needed = per_pot.saturating_sub(tally.from_pot[team][p]);
                let slots = per_team.saturating_sub(graph.degree(team));
                let take = needed.min(slots);
                if take == 0 {
                    continue;
                }

                let team_pot = field.pot_of(team);
                let team_country = field.country_of(team);
                let mut candidates: Vec<usize> = field.pots[p]
                    .iter()
                    .copied()
                    .filter(|&c| {
                        c != team
                            && graph.degree(c) < per_team
                            && tally.from_pot[c][team_pot] < per_pot
                            && tally.from_country[team][field.country_of(c)] < max_country
                            && tally.from_country[c][team_country] < max_country
                            && !graph.has_edge(team, c)
                    })
                    .collect();
                candidates.shuffle(rng);

                for c in candidates.into_iter().take(take) {
                    graph.add_edge(team, c);
                    tally.record(field, team, c);
                }
            }
        }

        if (0..n).all(|t| graph.degree(t) == per_team) {
            Some(graph)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const COUNTRIES: [&str; 12] = ["ENG", "ESP", "GER", "ITA", "FRA", "POR", "NED", "BEL", "SCO", "AUT", "CZE", "SUI"];

    /// 36 teams, ids 1..=36, pot = ((id - 1) / 9) + 1, three per country.
    fn league_phase_teams() -> Vec<SwissTeam> {
        (0..36u32)
            .map(|i| SwissTeam::new(i + 1, (i / 9) as u8 + 1, COUNTRIES[(i as usize * 7) % 12]))
            .collect()
    }

    fn pot_of(teams: &[SwissTeam], id: TeamId) -> u8 {
        teams.iter().find(|t| t.id == id).map(|t| t.pot).unwrap()
    }

    fn country_of(teams: &[SwissTeam], id: TeamId) -> &str {
        teams.iter().find(|t| t.id == id).map(|t| t.country.as_str()).unwrap()
    }

    #[test]
    fn test_rejects_wrong_pot_size() {
        let mut teams = league_phase_teams();
        teams[0].pot = 2;
        let err = DrawField::new(&teams, &SwissConfig::default()).unwrap_err();
        assert!(matches!(err, SeasonError::InvalidPotSize { pot: 1, expected: 9, found: 8 }));
    }

    #[test]
    fn test_rejects_unknown_pot_and_duplicates() {
        let mut teams = league_phase_teams();
        teams[3].pot = 5;
        assert!(matches!(DrawField::new(&teams, &SwissConfig::default()), Err(SeasonError::UnknownPot { .. })));

        let mut teams = league_phase_teams();
        teams[3].id = teams[4].id;
        assert!(matches!(DrawField::new(&teams, &SwissConfig::default()), Err(SeasonError::DuplicateTeam { .. })));
    }

    #[test]
    fn test_pairing_constraints() {
        let teams = league_phase_teams();
        let draw = SwissDraw::default();
        let field = DrawField::new(&teams, draw.config()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2026);
        let graph = draw.pair_opponents(&field, &mut rng).unwrap();

        assert_eq!(graph.edge_count(), 144);
        for t in 0..field.len() {
            assert_eq!(graph.degree(t), 8);
            let mut per_pot = [0; 4];
            let mut per_country: HashMap<usize, usize> = HashMap::new();
            for n in graph.neighbors(t) {
                assert_ne!(n, t);
                per_pot[field.pot_of(n)] += 1;
                *per_country.entry(field.country_of(n)).or_default() += 1;
            }
            assert_eq!(per_pot, [2, 2, 2, 2]);
            assert!(per_country.values().all(|&c| c <= 2));
        }
    }

    #[test]
    fn test_full_draw_properties() {
        let teams = league_phase_teams();
        let start = NaiveDate::from_ymd_opt(2026, 9, 16).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(36);
        let fixtures = SwissDraw::default().generate(&teams, start, Duration::days(14), &mut rng).unwrap();

        assert_eq!(fixtures.len(), 144);

        let mut home: HashMap<TeamId, usize> = HashMap::new();
        let mut away: HashMap<TeamId, usize> = HashMap::new();
        let mut pairs = HashSet::new();
        for f in &fixtures {
            *home.entry(f.home_team_id).or_default() += 1;
            *away.entry(f.away_team_id).or_default() += 1;
            let key = (f.home_team_id.min(f.away_team_id), f.home_team_id.max(f.away_team_id));
            assert!(pairs.insert(key), "pair drawn twice");
            assert_eq!(f.date, start + Duration::days(14 * (f.round as i64 - 1)));
        }
        for team in &teams {
            assert_eq!(home[&team.id], 4);
            assert_eq!(away[&team.id], 4);

            let opponents: Vec<TeamId> = fixtures.iter().filter_map(|f| f.opponent_of(team.id)).collect();
            assert_eq!(opponents.len(), 8);
            for pot in 1..=4 {
                assert_eq!(opponents.iter().filter(|&&o| pot_of(&teams, o) == pot).count(), 2);
            }
            for country in COUNTRIES {
                assert!(opponents.iter().filter(|&&o| country_of(&teams, o) == country).count() <= 2);
            }
        }

        for round in 1..=8 {
            let mut seen = HashSet::new();
            for f in fixtures.iter().filter(|f| f.round == round) {
                assert!(seen.insert(f.home_team_id));
                assert!(seen.insert(f.away_team_id));
            }
            assert_eq!(seen.len(), 36);
        }
    }

    #[test]
    fn test_exhaustion_surfaces_as_draw_error() {
        // Every team in one country: nobody can reach 8 opponents with max 2 per country.
        let teams: Vec<SwissTeam> =
            (0..36u32).map(|i| SwissTeam::new(i + 1, (i / 9) as u8 + 1, "ENG")).collect();
        let config = SwissConfig { pairing_attempts: 3, draw_attempts: 2, ..SwissConfig::default() };
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let err = SwissDraw::new(config)
            .generate(&teams, NaiveDate::from_ymd_opt(2026, 9, 16).unwrap(), Duration::days(7), &mut rng)
            .unwrap_err();
        assert!(matches!(err, SeasonError::DrawExhausted { attempts: 3 }));
        assert!(err.is_retryable());
    }
}
