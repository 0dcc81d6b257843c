use super::*;
use crate::config::{MatchEngineConfig, ShootoutConfig};
use crate::models::{CompetitionKind, EventMetadata, EventType, Mentality, Position};
use crate::standings::StandingsTable;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

const LEAGUE: u32 = 9;
const HOME: u32 = 1;
const AWAY: u32 = 2;
const MATCH: u32 = 500;

fn lineup(first_player: u32) -> Vec<RosterEntry> {
    [
        Position::GK,
        Position::LB,
        Position::CB,
        Position::CB,
        Position::RB,
        Position::CM,
        Position::CM,
        Position::CAM,
        Position::LW,
        Position::RW,
        Position::ST,
    ]
    .iter()
    .enumerate()
    .map(|(i, &position)| RosterEntry::new(first_player + i as u32, position))
    .collect()
}

fn keeper_stats(player: &mut PlayerRecord, conceded: u8) {
    player.goals_conceded += u32::from(conceded);
    if conceded == 0 {
        player.clean_sheets += 1;
    }
}

/// Store holding one played league match with every side effect applied.
fn played_league_match(record: MatchRecord) -> MemoryStore {
    let mut store = MemoryStore::new();
    let discipline = DisciplineConfig::default();

    for (side, conceded) in [(&record.home, record.away_score), (&record.away, record.home_score)] {
        for entry in &side.lineup {
            let mut player = PlayerRecord::new(entry.player_id, side.team_id, entry.position);
            player.appearances = 1;
            if entry.position.is_goalkeeper() {
                keeper_stats(&mut player, conceded);
            }
            store.insert_player(player);
        }
    }
    for detail in record.events.iter().filter_map(|e| e.substitution_detail()) {
        store.insert_player(PlayerRecord::new(detail.player_in, HOME, detail.position));
    }
    for event in &record.events {
        let Some(id) = affected_player(event) else { continue };
        let mut player = store.player(id).cloned().unwrap();
        apply_event(&mut player, event, record.id, &discipline);
        store.insert_player(player);
    }

    let mut table = StandingsTable::new(LEAGUE, &[HOME, AWAY, 3, 4]).unwrap();
    table.apply(&LeagueResult::from_match(&record)).unwrap();
    store.insert_standings(table);
    store.insert_match(record);
    store
}

fn simulated_match(seed: u64) -> MatchRecord {
    let mut record = MatchRecord::new(
        MATCH,
        CompetitionKind::League(LEAGUE),
        1,
        SideSetup::new(HOME, 62.0, lineup(100)),
        SideSetup::new(AWAY, 58.0, lineup(200)),
    );
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let result = MatchEngine::default().simulate(&record.home.sheet(), &record.away.sheet(), &mut rng);
    record.record_result(result.home_goals, result.away_goals, result.events);
    record
}

/// Counters every player record must agree with after any resimulation.
fn assert_players_match_events(store: &MemoryStore) {
    let record = store.match_record(MATCH).unwrap();
    let mut expected: HashMap<PlayerId, (u32, u32, u32, u32, u32)> = HashMap::new();
    for event in &record.events {
        let Some(id) = affected_player(event) else { continue };
        let entry = expected.entry(id).or_default();
        match event.event_type {
            EventType::Goal => entry.0 += 1,
            EventType::OwnGoal => entry.1 += 1,
            EventType::Assist => entry.2 += 1,
            EventType::YellowCard => entry.3 += 1,
            EventType::RedCard => entry.4 += 1,
            _ => {}
        }
    }
    for player in store.players() {
        let counts = expected.get(&player.player_id).copied().unwrap_or_default();
        assert_eq!(
            (player.goals, player.own_goals, player.assists, player.yellow_cards, player.red_cards),
            counts,
            "player {}",
            player.player_id
        );
        assert_eq!(player.suspensions.len() as u32, player.red_cards);
    }

    let (home_goals, away_goals) = record.score();
    for (keeper, conceded) in [(100, away_goals), (200, home_goals)] {
        let player = store.player(keeper).unwrap();
        assert_eq!(player.goals_conceded, u32::from(conceded));
        assert_eq!(player.clean_sheets, u32::from(conceded == 0));
    }
}

#[test]
fn test_cutoff_at_full_time_changes_nothing() {
    for seed in 0..20 {
        let record = simulated_match(seed);
        let mut store = played_league_match(record.clone());
        let table_before = store.standings(LEAGUE).cloned().unwrap();

        let request = ResimRequest::unchanged(&record, 90);
        let mut rng = ChaCha8Rng::seed_from_u64(seed + 1000);
        let outcome = ResimulationEngine::default().resimulate(&mut store, &request, &mut rng).unwrap();

        assert_eq!(outcome.final_score, record.score());
        assert!(outcome.removed_events.is_empty());
        assert!(outcome.new_events.is_empty());
        assert!(!outcome.standings_updated);
        assert_eq!(store.standings(LEAGUE), Some(&table_before));
        assert_eq!(store.match_record(MATCH).unwrap().events, record.events);
        assert_players_match_events(&store);
    }
}

#[test]
fn test_earlier_cutoff_replaces_the_tail() {
    for seed in 0..30 {
        let record = simulated_match(seed);
        let mut store = played_league_match(record.clone());
        let cutoff = 20 + (seed as u8 * 7) % 60;

        let request = ResimRequest::unchanged(&record, cutoff);
        let mut rng = ChaCha8Rng::seed_from_u64(seed + 2000);
        let outcome = ResimulationEngine::default().resimulate(&mut store, &request, &mut rng).unwrap();

        let stored = store.match_record(MATCH).unwrap();
        assert_eq!(stored.score(), outcome.final_score);
        assert_eq!(score_from_events(&stored.events, HOME, AWAY), outcome.final_score);
        assert!(stored.events.windows(2).all(|w| w[0].minute <= w[1].minute));

        // every event past the cutoff came from the new remainder
        let after: Vec<&MatchEvent> = stored.events.iter().filter(|e| e.is_after(cutoff)).collect();
        assert_eq!(after.len(), outcome.new_events.len());
        assert!(after.iter().all(|e| outcome.new_events.contains(e)));
        assert!(outcome.removed_events.iter().all(|e| e.is_after(cutoff)));
        assert_eq!(
            outcome.score_at_cutoff,
            score_from_events(record.events.iter().filter(|e| !e.is_after(cutoff)), HOME, AWAY)
        );

        let table = store.standings(LEAGUE).unwrap();
        let home_row = table.row(HOME).unwrap();
        assert_eq!(home_row.played, 1);
        assert_eq!(home_row.goals_for, u32::from(outcome.final_score.0));
        assert_eq!(home_row.goals_against, u32::from(outcome.final_score.1));
        assert_eq!(outcome.standings_updated, outcome.final_score != record.score());

        assert_players_match_events(&store);
    }
}

#[test]
fn test_repeated_resimulation_stays_consistent() {
    let record = simulated_match(77);
    let mut store = played_league_match(record.clone());
    let engine = ResimulationEngine::default();
    let mut rng = ChaCha8Rng::seed_from_u64(78);

    for cutoff in [70, 30, 55, 0, 89] {
        let request = ResimRequest::unchanged(&record, cutoff);
        engine.resimulate(&mut store, &request, &mut rng).unwrap();
        assert_players_match_events(&store);
    }
    let table = store.standings(LEAGUE).unwrap();
    assert_eq!(table.ranked().iter().map(|r| r.played).sum::<u32>(), 2);
}

#[test]
fn test_dismissed_player_stays_off_after_cutoff() {
    let mut record = MatchRecord::new(
        MATCH,
        CompetitionKind::League(LEAGUE),
        1,
        SideSetup::new(HOME, 60.0, lineup(100)),
        SideSetup::new(AWAY, 60.0, lineup(200)),
    );
    // the home striker is sent off before the cutoff
    record.record_result(0, 0, vec![MatchEvent::new(12, EventType::RedCard, HOME, Some(110))]);
    let mut store = played_league_match(record.clone());

    let config = MatchEngineConfig {
        home_base_xg: 6.0,
        yellow_card_lambda: 6.0,
        ..Default::default()
    };
    let engine = ResimulationEngine::with_engine(
        MatchEngine::with_configs(config, ShootoutConfig::default()),
        DisciplineConfig::default(),
    );

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let outcome = engine.resimulate(&mut store, &ResimRequest::unchanged(&record, 30), &mut rng).unwrap();
    assert!(outcome.new_events.iter().all(|e| e.player_id != Some(110)));

    let striker = store.player(110).unwrap();
    assert_eq!(striker.red_cards, 1);
    assert_eq!(striker.suspensions.len(), 1);
}

#[test]
fn test_erased_card_lifts_suspension_and_injury() {
    let mut record = MatchRecord::new(
        MATCH,
        CompetitionKind::League(LEAGUE),
        1,
        SideSetup::new(HOME, 60.0, lineup(100)),
        SideSetup::new(AWAY, 60.0, lineup(200)),
    );
    let injury = MatchEvent::new(70, EventType::Injury, AWAY, Some(203)).with_metadata(EventMetadata {
        injury: Some(crate::models::InjuryDetail { kind: crate::models::InjuryKind::Groin, weeks: 2 }),
        ..Default::default()
    });
    record.record_result(
        1,
        0,
        vec![
            MatchEvent::new(50, EventType::Goal, HOME, Some(110)),
            MatchEvent::new(65, EventType::RedCard, AWAY, Some(202)),
            injury,
        ],
    );
    let mut store = played_league_match(record.clone());
    assert!(store.player(202).unwrap().is_suspended());
    assert!(store.player(203).unwrap().is_injured());

    // goalless remainder so the erased goal is not replaced
    let config = MatchEngineConfig {
        home_base_xg: 0.0,
        away_base_xg: 0.0,
        strength_xg_weight: 0.0,
        yellow_card_lambda: 0.0,
        direct_red_chance: 0.0,
        injury_chance: 0.0,
        ..Default::default()
    };
    let engine = ResimulationEngine::with_engine(
        MatchEngine::with_configs(config, ShootoutConfig::default()),
        DisciplineConfig::default(),
    );
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let outcome = engine.resimulate(&mut store, &ResimRequest::unchanged(&record, 45), &mut rng).unwrap();

    assert_eq!(outcome.removed_events.len(), 3);
    assert_eq!(outcome.final_score, (0, 0));
    assert!(outcome.standings_updated);
    assert!(!store.player(202).unwrap().is_suspended());
    assert!(!store.player(203).unwrap().is_injured());
    assert_eq!(store.player(110).unwrap().goals, 0);

    // away keeper gets the clean sheet back
    let keeper = store.player(200).unwrap();
    assert_eq!((keeper.goals_conceded, keeper.clean_sheets), (0, 1));

    let table = store.standings(LEAGUE).unwrap();
    assert_eq!(table.row(HOME).unwrap().drawn, 1);
    assert_eq!(table.row(AWAY).unwrap().points, 1);
    assert_players_match_events(&store);
}

#[test]
fn test_failure_rolls_everything_back() {
    let mut record = MatchRecord::new(
        MATCH,
        CompetitionKind::League(LEAGUE),
        1,
        SideSetup::new(HOME, 60.0, lineup(100)),
        SideSetup::new(AWAY, 60.0, lineup(200)),
    );
    record.record_result(1, 0, vec![MatchEvent::new(10, EventType::Goal, HOME, Some(110))]);
    let mut store = played_league_match(record.clone());
    // a table that never saw this result cannot have it reverted
    store.insert_standings(StandingsTable::new(LEAGUE, &[HOME, AWAY]).unwrap());
    let before = store.clone();

    let config = MatchEngineConfig {
        home_base_xg: 15.0,
        ..Default::default()
    };
    let engine = ResimulationEngine::with_engine(
        MatchEngine::with_configs(config, ShootoutConfig::default()),
        DisciplineConfig::default(),
    );
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let err = engine.resimulate(&mut store, &ResimRequest::unchanged(&record, 0), &mut rng).unwrap_err();

    assert!(matches!(err, SeasonError::StandingsUnderflow { .. }));
    assert_eq!(store.match_record(MATCH), before.match_record(MATCH));
    assert_eq!(store.player(110), before.player(110));
    assert_eq!(store.player(200), before.player(200));
    assert_eq!(store.standings(LEAGUE), before.standings(LEAGUE));
}

#[test]
fn test_missing_player_is_skipped() {
    let mut record = MatchRecord::new(
        MATCH,
        CompetitionKind::Cup(3),
        1,
        SideSetup::new(HOME, 60.0, lineup(100)),
        SideSetup::new(AWAY, 60.0, lineup(200)),
    );
    record.record_result(1, 0, vec![MatchEvent::new(60, EventType::Goal, HOME, Some(999))]);
    let mut store = MemoryStore::new();
    store.insert_match(record.clone());

    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let outcome =
        ResimulationEngine::default().resimulate(&mut store, &ResimRequest::unchanged(&record, 30), &mut rng).unwrap();
    assert!(outcome.skipped_players.contains(&999));
    assert!(!outcome.standings_updated);
    assert!(store.match_record(MATCH).unwrap().events.iter().all(|e| e.player_id != Some(999)));
}

#[test]
fn test_substitution_and_tactics_are_recorded() {
    let record = simulated_match(11);
    let mut store = played_league_match(record.clone());
    store.insert_player(PlayerRecord::new(300, HOME, Position::ST));

    let mut request = ResimRequest::unchanged(&record, 60);
    request.substitutions.push(Substitution {
        team_id: HOME,
        player_off: 110,
        player_on: RosterEntry::new(300, Position::ST),
    });
    request.home_tactics = Some(Tactics { formation: "4-3-3".into(), mentality: Mentality::Attacking });

    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let outcome = ResimulationEngine::default().resimulate(&mut store, &request, &mut rng).unwrap();

    let sub = outcome.new_events.iter().find(|e| e.event_type == EventType::Substitution).unwrap();
    assert_eq!((sub.minute, sub.player_id, sub.player_in()), (60, Some(110), Some(300)));
    assert!(outcome.new_events.iter().filter(|e| e.minute > 60).all(|e| e.player_id != Some(110)));
    assert_eq!(store.player(300).unwrap().appearances, 1);

    let stored = store.match_record(MATCH).unwrap();
    assert_eq!(stored.home.tactics.formation, "4-3-3");
    assert_eq!(stored.away.tactics, Tactics::default());
}

#[test]
fn test_earlier_substitution_holds_on_resimulation() {
    let mut record = MatchRecord::new(
        MATCH,
        CompetitionKind::League(LEAGUE),
        1,
        SideSetup::new(HOME, 60.0, lineup(100)),
        SideSetup::new(AWAY, 60.0, lineup(200)),
    );
    // striker 110 makes way for 300 on the hour
    record.record_result(0, 0, vec![MatchEvent::substitution(60, HOME, 110, RosterEntry::new(300, Position::ST))]);

    let config = MatchEngineConfig {
        home_base_xg: 8.0,
        yellow_card_lambda: 6.0,
        ..Default::default()
    };
    let engine = ResimulationEngine::with_engine(
        MatchEngine::with_configs(config, ShootoutConfig::default()),
        DisciplineConfig::default(),
    );

    let mut replacement_involved = false;
    for seed in 0..40 {
        let mut store = played_league_match(record.clone());
        assert_eq!(store.player(300).unwrap().appearances, 1);

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let outcome = engine.resimulate(&mut store, &ResimRequest::unchanged(&record, 75), &mut rng).unwrap();
        assert!(outcome.new_events.iter().all(|e| e.player_id != Some(110)));
        replacement_involved |= outcome.new_events.iter().any(|e| e.player_id == Some(300));

        let stored = store.match_record(MATCH).unwrap();
        assert_eq!(stored.events[0].player_in(), Some(300));
        let finishing = stored.sheet_at(HOME, 90).unwrap();
        assert!(finishing.roster.iter().any(|p| p.player_id == 300));
        assert!(finishing.roster.iter().all(|p| p.player_id != 110));
        assert_eq!(store.player(300).unwrap().appearances, 1);
        assert_players_match_events(&store);
    }
    assert!(replacement_involved);
}

#[test]
fn test_resimulation_before_substitution_undoes_it() {
    let mut record = MatchRecord::new(
        MATCH,
        CompetitionKind::Cup(3),
        1,
        SideSetup::new(HOME, 60.0, lineup(100)),
        SideSetup::new(AWAY, 60.0, lineup(200)),
    );
    record.record_result(0, 0, vec![MatchEvent::substitution(60, HOME, 110, RosterEntry::new(300, Position::ST))]);
    let mut store = played_league_match(record.clone());

    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let outcome =
        ResimulationEngine::default().resimulate(&mut store, &ResimRequest::unchanged(&record, 45), &mut rng).unwrap();

    assert_eq!(outcome.removed_events.len(), 1);
    assert!(outcome.new_events.iter().all(|e| e.player_id != Some(300)));
    assert_eq!(store.player(300).unwrap().appearances, 0);
    let stored = store.match_record(MATCH).unwrap();
    assert!(stored.sheet_at(HOME, 90).unwrap().roster.iter().any(|p| p.player_id == 110));
}

#[test]
fn test_request_validation() {
    let record = simulated_match(1);
    let mut store = played_league_match(record.clone());
    let engine = ResimulationEngine::default();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let late = ResimRequest::unchanged(&record, 91);
    assert!(matches!(engine.resimulate(&mut store, &late, &mut rng), Err(SeasonError::InvalidCutoff { minute: 91, .. })));

    let mut wrong_side = ResimRequest::unchanged(&record, 45);
    wrong_side.away = TeamSheet::bare(77, 50.0);
    assert!(matches!(
        engine.resimulate(&mut store, &wrong_side, &mut rng),
        Err(SeasonError::TeamNotInMatch { team: 77, .. })
    ));

    let missing = ResimRequest::new(404, 45, TeamSheet::bare(HOME, 1.0), TeamSheet::bare(AWAY, 1.0));
    assert!(matches!(engine.resimulate(&mut store, &missing, &mut rng), Err(SeasonError::MatchNotFound(404))));

    let unplayed = MatchRecord::new(
        501,
        CompetitionKind::League(LEAGUE),
        2,
        SideSetup::new(HOME, 1.0, vec![]),
        SideSetup::new(AWAY, 1.0, vec![]),
    );
    store.insert_match(unplayed.clone());
    let request = ResimRequest::unchanged(&unplayed, 45);
    assert!(matches!(engine.resimulate(&mut store, &request, &mut rng), Err(SeasonError::MatchNotPlayed(501))));
}
