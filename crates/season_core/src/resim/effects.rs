//! Side effects of match events on player records.
//!
//! `revert_event` undoes exactly what `apply_event` did for the same event,
//! so an event list can be replaced without rebuilding a player's season.

use crate::config::DisciplineConfig;
use crate::models::{EventType, InjuryRecord, MatchEvent, MatchId, PlayerId, PlayerRecord, Suspension};

/// Player whose record an event changes. Substitutions credit the player
/// coming on.
pub fn affected_player(event: &MatchEvent) -> Option<PlayerId> {
    match event.event_type {
        EventType::Substitution => event.player_in(),
        _ => event.player_id,
    }
}

pub fn apply_event(record: &mut PlayerRecord, event: &MatchEvent, match_id: MatchId, discipline: &DisciplineConfig) {
    match event.event_type {
        EventType::Goal => record.goals += 1,
        EventType::OwnGoal => record.own_goals += 1,
        EventType::Assist => record.assists += 1,
        EventType::YellowCard => record.yellow_cards += 1,
        EventType::RedCard => {
            record.red_cards += 1;
            let matches_remaining = if event.is_second_yellow() {
                discipline.second_yellow_ban
            } else {
                discipline.direct_red_ban
            };
            record.suspensions.push(Suspension { match_id, minute: event.minute, matches_remaining });
        }
        EventType::Injury => {
            if let Some(detail) = event.injury() {
                record.injury = Some(InjuryRecord { match_id, minute: event.minute, kind: detail.kind, weeks: detail.weeks });
            }
        }
        EventType::Substitution => record.appearances += 1,
    }
}

pub fn revert_event(record: &mut PlayerRecord, event: &MatchEvent, match_id: MatchId) {
    match event.event_type {
        EventType::Goal => record.goals = record.goals.saturating_sub(1),
        EventType::OwnGoal => record.own_goals = record.own_goals.saturating_sub(1),
        EventType::Assist => record.assists = record.assists.saturating_sub(1),
        EventType::YellowCard => record.yellow_cards = record.yellow_cards.saturating_sub(1),
        EventType::RedCard => {
            record.red_cards = record.red_cards.saturating_sub(1);
            record.suspensions.retain(|s| !(s.match_id == match_id && s.minute == event.minute));
        }
        EventType::Injury => {
            let caused_here = record.injury.map_or(false, |i| i.match_id == match_id && i.minute == event.minute);
            if caused_here {
                record.injury = None;
            }
        }
        EventType::Substitution => record.appearances = record.appearances.saturating_sub(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventMetadata, InjuryDetail, InjuryKind, Position, SubstitutionDetail};

    fn player() -> PlayerRecord {
        PlayerRecord::new(7, 1, Position::CB)
    }

    #[test]
    fn test_red_card_suspension_follows_card() {
        let discipline = DisciplineConfig::default();
        let mut record = player();
        let direct = MatchEvent::new(40, EventType::RedCard, 1, Some(7));
        let second = MatchEvent::new(70, EventType::RedCard, 1, Some(7))
            .with_metadata(EventMetadata { second_yellow: Some(true), ..Default::default() });

        apply_event(&mut record, &direct, 100, &discipline);
        apply_event(&mut record, &second, 101, &discipline);
        assert_eq!(record.red_cards, 2);
        assert_eq!(record.suspensions.len(), 2);
        assert_eq!(record.suspensions[0].matches_remaining, 3);
        assert_eq!(record.suspensions[1].matches_remaining, 1);
        assert!(record.is_suspended());

        revert_event(&mut record, &direct, 100);
        assert_eq!(record.red_cards, 1);
        assert_eq!(record.suspensions, vec![Suspension { match_id: 101, minute: 70, matches_remaining: 1 }]);
    }

    #[test]
    fn test_injury_cleared_only_by_its_own_event() {
        let discipline = DisciplineConfig::default();
        let mut record = player();
        let injury = MatchEvent::new(60, EventType::Injury, 1, Some(7)).with_metadata(EventMetadata {
            injury: Some(InjuryDetail { kind: InjuryKind::Hamstring, weeks: 4 }),
            ..Default::default()
        });
        apply_event(&mut record, &injury, 100, &discipline);
        assert_eq!(record.injury.map(|i| i.weeks), Some(4));

        // same minute, different match: not ours
        revert_event(&mut record, &injury, 99);
        assert!(record.is_injured());

        revert_event(&mut record, &injury, 100);
        assert!(!record.is_injured());
    }

    #[test]
    fn test_substitution_credits_incoming_player() {
        let event = MatchEvent::new(60, EventType::Substitution, 1, Some(7))
            .with_metadata(EventMetadata { substitution: Some(SubstitutionDetail { player_in: 12, position: Position::ST }), ..Default::default() });
        assert_eq!(affected_player(&event), Some(12));

        let mut incoming = PlayerRecord::new(12, 1, Position::ST);
        apply_event(&mut incoming, &event, 100, &DisciplineConfig::default());
        assert_eq!(incoming.appearances, 1);
        revert_event(&mut incoming, &event, 100);
        assert_eq!(incoming.appearances, 0);
    }

    #[test]
    fn test_counters_round_trip() {
        let discipline = DisciplineConfig::default();
        let mut record = player();
        let events = [
            MatchEvent::new(5, EventType::Goal, 1, Some(7)),
            MatchEvent::new(9, EventType::Assist, 1, Some(7)),
            MatchEvent::new(15, EventType::OwnGoal, 1, Some(7)),
            MatchEvent::new(20, EventType::YellowCard, 1, Some(7)),
        ];
        for event in &events {
            apply_event(&mut record, event, 1, &discipline);
        }
        assert_eq!((record.goals, record.assists, record.own_goals, record.yellow_cards), (1, 1, 1, 1));
        for event in &events {
            revert_event(&mut record, event, 1);
        }
        assert_eq!(record, player());
    }
}
