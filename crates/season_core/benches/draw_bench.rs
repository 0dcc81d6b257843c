use chrono::{Duration, NaiveDate};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

use season_core::models::{Position, RosterEntry, SwissTeam, TeamSheet};
use season_core::{MatchEngine, RoundRobinScheduler, SwissConfig, SwissDraw};

const COUNTRIES: [&str; 12] = ["ENG", "ESP", "GER", "ITA", "FRA", "POR", "NED", "BEL", "SCO", "AUT", "SUI", "CZE"];

fn league_phase() -> Vec<SwissTeam> {
    (0..36u32).map(|i| SwissTeam::new(i + 1, (i / 9) as u8 + 1, COUNTRIES[(i as usize * 7) % 12])).collect()
}

fn sheet(team: u32) -> TeamSheet {
    let positions = [
        Position::GK,
        Position::LB,
        Position::CB,
        Position::CB,
        Position::RB,
        Position::CDM,
        Position::CM,
        Position::CAM,
        Position::LW,
        Position::RW,
        Position::ST,
    ];
    let roster = positions.iter().enumerate().map(|(i, &p)| RosterEntry::new(team * 100 + i as u32, p)).collect();
    TeamSheet::new(team, 60.0, roster)
}

fn bench_swiss_draw(c: &mut Criterion) {
    let teams = league_phase();
    let draw = SwissDraw::new(SwissConfig::default());
    let start = NaiveDate::from_ymd_opt(2025, 9, 16).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(36);

    c.bench_function("swiss_draw_36", |b| {
        b.iter(|| {
            let fixtures = draw.generate(black_box(&teams), start, Duration::weeks(2), &mut rng).unwrap();
            black_box(fixtures.len());
        })
    });
}

fn bench_round_robin(c: &mut Criterion) {
    let teams: Vec<u32> = (1..=20).collect();
    let start = NaiveDate::from_ymd_opt(2025, 8, 16).unwrap();
    let dates: Vec<NaiveDate> = (0..38).map(|w| start + Duration::weeks(w)).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(20);

    c.bench_function("round_robin_20", |b| {
        b.iter(|| {
            let fixtures = RoundRobinScheduler::new().generate(black_box(&teams), &dates, &mut rng).unwrap();
            black_box(fixtures.len());
        })
    });
}

fn bench_match_engine(c: &mut Criterion) {
    let engine = MatchEngine::default();
    let home = sheet(1);
    let away = sheet(2);
    let mut rng = ChaCha8Rng::seed_from_u64(90);

    c.bench_function("simulate_match_with_events", |b| {
        b.iter(|| {
            let result = engine.simulate(black_box(&home), black_box(&away), &mut rng);
            black_box(result.events.len());
        })
    });

    c.bench_function("penalty_shootout", |b| {
        b.iter(|| {
            let result = engine.penalty_shootout(&home, &away, &mut rng);
            black_box(result.winner_id());
        })
    });
}

criterion_group!(benches, bench_swiss_draw, bench_round_robin, bench_match_engine);
criterion_main!(benches);
