//! Standings and statistics.
//!
//! Derives from tournament state:
//! - Ranked standings with shared ranks for ties
//! - Tournament winners (everyone at rank 1)
//! - Per-player win/loss/draw records
//! - Career statistics across tournaments

use std::collections::HashMap;

use crate::models::{
    PlayerCareer, PlayerId, PlayerRef, Standing, Tournament, TournamentStatus, WinLossRecord,
};

/// Competition ranks ("1224") for values already sorted in descending order.
pub fn competition_ranks(sorted_points: &[f64]) -> Vec<u32> {
    let mut ranks = Vec::with_capacity(sorted_points.len());
    for (i, points) in sorted_points.iter().enumerate() {
        let rank = if i > 0 && sorted_points[i - 1] == *points {
            ranks[i - 1]
        } else {
            i as u32 + 1
        };
        ranks.push(rank);
    }
    ranks
}

/// Results recorded so far for each player of a tournament.
pub fn player_records(tournament: &Tournament) -> HashMap<PlayerId, WinLossRecord> {
    let mut records: HashMap<PlayerId, WinLossRecord> = tournament
        .roster()
        .iter()
        .map(|p| (p.id.clone(), WinLossRecord::default()))
        .collect();

    for game in tournament.rounds().iter().flat_map(|r| r.matches()) {
        for player in game.players() {
            if let (Some(code), Some(record)) = (game.result_for(player), records.get_mut(player))
            {
                record.add(code);
            }
        }
    }

    records
}

/// Standings of a tournament, live or final.
pub fn rank(tournament: &Tournament) -> Vec<Standing> {
    rank_roster(tournament.roster(), &player_records(tournament))
}

fn rank_roster(roster: &[PlayerRef], records: &HashMap<PlayerId, WinLossRecord>) -> Vec<Standing> {
    let mut players: Vec<&PlayerRef> = roster.iter().collect();
    players.sort_by(|a, b| {
        b.points()
            .total_cmp(&a.points())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });

    let points: Vec<f64> = players.iter().map(|p| p.points()).collect();
    let ranks = competition_ranks(&points);

    players
        .into_iter()
        .zip(ranks)
        .map(|(player, rank)| Standing {
            player: player.clone(),
            rank,
            points: player.points(),
            record: records.get(&player.id).copied().unwrap_or_default(),
        })
        .collect()
}

/// Every player at rank 1.
pub fn tournament_winners(tournament: &Tournament) -> Vec<PlayerRef> {
    rank(tournament)
        .into_iter()
        .take_while(|s| s.rank == 1)
        .map(|s| s.player)
        .collect()
}

/// Career statistics over a set of tournaments.
///
/// Titles only count for finished tournaments; matches and points count
/// everything recorded so far. Sorted by titles, then points.
pub fn aggregate_careers(tournaments: &[Tournament]) -> Vec<PlayerCareer> {
    let mut careers: HashMap<PlayerId, PlayerCareer> = HashMap::new();

    for tournament in tournaments {
        let records = player_records(tournament);
        for player in tournament.roster() {
            let career = careers
                .entry(player.id.clone())
                .or_insert_with(|| PlayerCareer::new(player.id.clone(), player.name.clone()));
            career.name = player.name.clone();
            career.participations += 1;
            career.points += player.points();
            career.matches_played += records
                .get(&player.id)
                .map_or(0, WinLossRecord::total_games);
        }

        if tournament.status() == TournamentStatus::Finished {
            for winner in tournament_winners(tournament) {
                if let Some(career) = careers.get_mut(&winner.id) {
                    career.titles += 1;
                }
            }
        }
    }

    let mut careers: Vec<PlayerCareer> = careers.into_values().collect();
    careers.sort_by(|a, b| {
        b.titles
            .cmp(&a.titles)
            .then_with(|| b.points.total_cmp(&a.points))
            .then_with(|| a.name.cmp(&b.name))
    });
    careers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Advance, MatchRef, Outcome};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scored_roster(points: &[f64]) -> Vec<PlayerRef> {
        points
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let mut player = PlayerRef::new(format!("AB{:05}", i + 1), format!("Player {}", i + 1));
                player.add_points(p);
                player
            })
            .collect()
    }

    fn launched(players: usize, rounds: u32, seed: u64) -> (Tournament, StdRng) {
        let mut t = Tournament::new("tournament_1_lyon_2025-09-01", "Lyon", rounds).unwrap();
        for i in 1..=players {
            t.add_player(PlayerRef::new(format!("AB{:05}", i), format!("Player {}", i)))
                .unwrap();
        }
        let mut rng = StdRng::seed_from_u64(seed);
        t.launch(&mut rng).unwrap();
        (t, rng)
    }

    fn play_round(t: &mut Tournament, outcome: Outcome) {
        let round = t.current_round().unwrap();
        let number = round.number;
        let open: Vec<usize> = round
            .matches()
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_resolved())
            .map(|(i, _)| i)
            .collect();
        for index in open {
            t.record_result(MatchRef::new(number, index), outcome).unwrap();
        }
    }

    #[test]
    fn test_competition_ranks() {
        assert_eq!(competition_ranks(&[3.0, 3.0, 2.0, 1.0]), vec![1, 1, 3, 4]);
        assert_eq!(competition_ranks(&[2.5, 2.0, 2.0, 2.0, 0.5]), vec![1, 2, 2, 2, 5]);
        assert!(competition_ranks(&[]).is_empty());
    }

    #[test]
    fn test_rank_shares_tied_places() {
        let roster = scored_roster(&[2.0, 3.0, 1.0, 0.0, 2.0, 3.0, 2.0, 1.0, 0.0]);
        let standings = rank_roster(&roster, &HashMap::new());

        let summary: Vec<(u32, f64)> = standings.iter().map(|s| (s.rank, s.points)).collect();
        assert_eq!(
            summary,
            vec![
                (1, 3.0),
                (1, 3.0),
                (3, 2.0),
                (3, 2.0),
                (3, 2.0),
                (6, 1.0),
                (6, 1.0),
                (8, 0.0),
                (8, 0.0),
            ]
        );
    }

    #[test]
    fn test_rank_orders_ties_by_name() {
        let mut roster = scored_roster(&[1.0, 1.0]);
        roster[0].name = "Zoe".to_string();
        roster[1].name = "Anna".to_string();

        let standings = rank_roster(&roster, &HashMap::new());
        assert_eq!(standings[0].player.name, "Anna");
        assert_eq!(standings[0].rank, standings[1].rank);
    }

    #[test]
    fn test_winners_after_all_draws_is_everyone() {
        let (mut t, mut rng) = launched(8, 1, 5);
        play_round(&mut t, Outcome::Draw);
        assert_eq!(t.advance_round(&mut rng).unwrap(), Advance::Finished);

        let winners = tournament_winners(&t);
        assert_eq!(winners.len(), 8);
        assert!(rank(&t).iter().all(|s| s.rank == 1 && s.points == 0.5));
    }

    #[test]
    fn test_single_winner() {
        let (mut t, mut rng) = launched(8, 3, 9);
        for _ in 0..3 {
            play_round(&mut t, Outcome::Win);
            t.advance_round(&mut rng).unwrap();
        }

        let standings = rank(&t);
        let top = standings.iter().filter(|s| s.rank == 1).count();
        let winners = tournament_winners(&t);
        assert_eq!(winners.len(), top);
        assert!(winners.iter().all(|w| w.points() == standings[0].points));
    }

    #[test]
    fn test_player_records_include_byes() {
        let (mut t, mut rng) = launched(9, 2, 1);
        let first_bye = t.current_round().unwrap().bye().unwrap().clone();
        play_round(&mut t, Outcome::Win);
        t.advance_round(&mut rng).unwrap();

        let records = player_records(&t);
        assert_eq!(records.len(), 9);
        assert_eq!(records[&first_bye].byes, 1);

        let totals: u32 = records.values().map(|r| r.total_games()).sum();
        // Round 1 played, round 2 only has its bye resolved.
        assert_eq!(totals, 9 + 1);

        let wins: u32 = records.values().map(|r| r.wins).sum();
        let losses: u32 = records.values().map(|r| r.losses).sum();
        assert_eq!(wins, 4);
        assert_eq!(losses, 4);
    }

    #[test]
    fn test_standings_survive_round_trip() {
        let (mut t, mut rng) = launched(9, 3, 21);
        play_round(&mut t, Outcome::Win);
        t.advance_round(&mut rng).unwrap();
        t.record_result(MatchRef::new(2, 0), Outcome::Draw).unwrap();

        let json = serde_json::to_string(&t).unwrap();
        let back: Tournament = serde_json::from_str(&json).unwrap();

        assert_eq!(back.status(), t.status());
        assert_eq!(rank(&back), rank(&t));
    }

    #[test]
    fn test_aggregate_careers_counts_titles_only_when_finished() {
        let (mut finished, mut rng) = launched(8, 1, 3);
        play_round(&mut finished, Outcome::Draw);
        finished.advance_round(&mut rng).unwrap();

        let (mut running, _) = launched(8, 2, 4);
        play_round(&mut running, Outcome::Draw);

        let careers = aggregate_careers(&[finished, running]);
        assert_eq!(careers.len(), 8);
        for career in &careers {
            assert_eq!(career.participations, 2);
            assert_eq!(career.titles, 1);
            assert_eq!(career.matches_played, 2);
            assert_eq!(career.points, 1.0);
        }
    }

    #[test]
    fn test_aggregate_careers_empty() {
        assert!(aggregate_careers(&[]).is_empty());
    }
}
