//! Rank submitted pitches by a popularity-weighted score.
//!
//! The weighted score is `average * log10(votes + 1)`: a pitch with a handful of
//! perfect ratings should not outrank one with a slightly lower average and broad
//! support. Ties fall back to the most recent vote, then to the pitch id, so the
//! order is total and reproducible.
//!
//! Sorting always uses the unrounded score. Rounding only happens when the
//! entry is built for display.

use crate::pagination::{Page, Pagination};
use crate::{Category, PitchRecord, PitchWithTeam, TeamSummary, VoteRecord};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

/// A submitted pitch with every live vote cast on it.
#[derive(Debug, Clone)]
pub struct PitchVotes {
    pub pitch: PitchRecord,
    pub team: TeamSummary,
    pub votes: Vec<VoteRecord>,
}

impl PitchVotes {
    pub fn new(pitch_with_team: PitchWithTeam, votes: Vec<VoteRecord>) -> Self {
        Self {
            pitch: pitch_with_team.pitch,
            team: pitch_with_team.team,
            votes,
        }
    }
}

/// Aggregated rating state of a single pitch, unrounded.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_votes: usize,
    pub weighted_score: f64,
    /// `None` sorts below every real timestamp.
    pub most_recent_vote: Option<DateTime<Utc>>,
}

/// Reduce a vote list to its summary. No votes gives an all-zero summary.
pub fn summarize_votes(votes: &[VoteRecord]) -> RatingSummary {
    let total_votes = votes.len();
    let average_rating = if total_votes == 0 {
        0.0
    } else {
        votes.iter().map(|v| f64::from(v.rating)).sum::<f64>() / total_votes as f64
    };
    RatingSummary {
        average_rating,
        total_votes,
        weighted_score: weighted_score(average_rating, total_votes),
        most_recent_vote: votes.iter().map(|v| v.updated_at).max(),
    }
}

/// `average * log10(count + 1)`.
pub fn weighted_score(average_rating: f64, vote_count: usize) -> f64 {
    average_rating * ((vote_count + 1) as f64).log10()
}

/// Round half up to the given number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPitch {
    pub id: u32,
    pub title: String,
    pub category: Category,
    pub created_at: DateTime<Utc>,
}

/// A ranked row, with display rounding applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub team: TeamSummary,
    pub pitch: LeaderboardPitch,
    pub average_rating: f64,
    pub total_votes: usize,
    pub weighted_score: f64,
    pub most_recent_vote_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPage {
    pub entries: Vec<LeaderboardEntry>,
    pub total_pages: usize,
    pub current_page: u32,
    pub total: usize,
}

impl From<Page<LeaderboardEntry>> for LeaderboardPage {
    fn from(page: Page<LeaderboardEntry>) -> Self {
        Self {
            entries: page.items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            total: page.total,
        }
    }
}

struct Ranked {
    item: PitchVotes,
    summary: RatingSummary,
}

/// Leaderboard order: score desc, most recent vote desc, pitch id asc.
fn compare_ranked(a: &Ranked, b: &Ranked) -> Ordering {
    b.summary
        .weighted_score
        .total_cmp(&a.summary.weighted_score)
        .then_with(|| b.summary.most_recent_vote.cmp(&a.summary.most_recent_vote))
        .then_with(|| a.item.pitch.pitch_id.cmp(&b.item.pitch.pitch_id))
}

fn into_entry(ranked: Ranked) -> LeaderboardEntry {
    let Ranked { item, summary } = ranked;
    LeaderboardEntry {
        team: item.team,
        pitch: LeaderboardPitch {
            id: item.pitch.pitch_id,
            title: item.pitch.title,
            category: item.pitch.category,
            created_at: item.pitch.created_at,
        },
        average_rating: round_to(summary.average_rating, 1),
        total_votes: summary.total_votes,
        weighted_score: round_to(summary.weighted_score, 2),
        most_recent_vote_timestamp: summary.most_recent_vote,
    }
}

/// Summarize and sort every pitch. The result is the full leaderboard, unpaginated.
pub fn rank_pitches(pitches: Vec<PitchVotes>) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<Ranked> = pitches
        .into_par_iter()
        .map(|item| {
            let summary = summarize_votes(&item.votes);
            Ranked { item, summary }
        })
        .collect();

    ranked.sort_by(compare_ranked);
    ranked.into_iter().map(into_entry).collect()
}

/// Rank every pitch and cut out the requested page.
pub fn compute_leaderboard(pitches: Vec<PitchVotes>, pagination: Pagination) -> LeaderboardPage {
    let count = pitches.len();
    let page: LeaderboardPage = pagination.paginate(rank_pitches(pitches)).into();
    log::debug!(
        "Ranked {count} pitches, returning page {}/{} with {} entries",
        page.current_page,
        page.total_pages,
        page.entries.len()
    );
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PitchStatus;
    use chrono::{TimeDelta, TimeZone};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn create_test_pitch(pitch_id: u32, votes: &[(u8, i64)]) -> PitchVotes {
        let created_at = base_time() - TimeDelta::days(30);
        let pitch = PitchRecord {
            pitch_id,
            team_id: pitch_id + 100,
            title: format!("Pitch {pitch_id}"),
            demo_link: format!("https://demo.example.com/pitch{pitch_id}"),
            deck_url: format!("https://deck.example.com/pitch{pitch_id}"),
            category: Category::Other,
            status: PitchStatus::Submitted,
            created_at,
            updated_at: created_at,
        };
        let votes = votes
            .iter()
            .enumerate()
            .map(|(i, &(rating, minutes))| {
                let at = base_time() + TimeDelta::minutes(minutes);
                VoteRecord {
                    vote_id: pitch_id * 1000 + i as u32,
                    pitch_id,
                    reviewer_id: i as u32 + 1,
                    rating,
                    created_at: at,
                    updated_at: at,
                }
            })
            .collect();
        PitchVotes {
            pitch,
            team: TeamSummary {
                id: pitch_id + 100,
                name: format!("Team {pitch_id}"),
            },
            votes,
        }
    }

    fn ids(entries: &[LeaderboardEntry]) -> Vec<u32> {
        entries.iter().map(|e| e.pitch.id).collect()
    }

    #[test_log::test]
    fn test_zero_votes_scores_zero() {
        let summary = summarize_votes(&[]);
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.weighted_score, 0.0);
        assert_eq!(summary.total_votes, 0);
        assert_eq!(summary.most_recent_vote, None);
    }

    #[test_log::test]
    fn test_round_to() {
        assert_eq!(round_to(4.666_666, 1), 4.7);
        assert_eq!(round_to(2.809_6, 2), 2.81);
        assert_eq!(round_to(1.505_15, 2), 1.51);
        assert_eq!(round_to(0.25, 1), 0.3);
        assert_eq!(round_to(0.0, 2), 0.0);
    }

    #[test_log::test]
    fn test_weighted_score_is_monotonic() {
        for count in 1..50 {
            let mut previous = weighted_score(1.0, count);
            for tenth in 11..=50 {
                let score = weighted_score(f64::from(tenth) / 10.0, count);
                assert!(score >= previous);
                previous = score;
            }
        }
        for tenth in 10..=50 {
            let average = f64::from(tenth) / 10.0;
            let mut previous = weighted_score(average, 0);
            for count in 1..200 {
                let score = weighted_score(average, count);
                assert!(score >= previous);
                previous = score;
            }
        }
    }

    #[test_log::test]
    fn test_volume_beats_single_perfect_vote() {
        let a = create_test_pitch(1, &[(5, 0), (5, 1), (4, 2)]);
        let b = create_test_pitch(2, &[(5, 3)]);

        let entries = rank_pitches(vec![b, a]);

        assert_eq!(ids(&entries), vec![1, 2]);
        assert_eq!(entries[0].average_rating, 4.7);
        assert_eq!(entries[0].weighted_score, 2.81);
        assert_eq!(entries[0].total_votes, 3);
        assert_eq!(entries[1].average_rating, 5.0);
        assert_eq!(entries[1].weighted_score, 1.51);
    }

    #[test_log::test]
    fn test_tie_broken_by_most_recent_vote() {
        // Same ratings, so identical unrounded scores
        let c = create_test_pitch(3, &[(5, 0), (4, 90)]);
        let d = create_test_pitch(4, &[(4, 10), (5, 20)]);

        let entries = rank_pitches(vec![d, c]);

        assert_eq!(entries[0].weighted_score, entries[1].weighted_score);
        assert_eq!(ids(&entries), vec![3, 4]);
        assert_eq!(
            entries[0].most_recent_vote_timestamp,
            Some(base_time() + TimeDelta::minutes(90))
        );
    }

    #[test_log::test]
    fn test_full_tie_broken_by_pitch_id() {
        let entries = rank_pitches(vec![
            create_test_pitch(9, &[(3, 5)]),
            create_test_pitch(2, &[(3, 5)]),
            create_test_pitch(5, &[(3, 5)]),
        ]);
        assert_eq!(ids(&entries), vec![2, 5, 9]);
    }

    #[test_log::test]
    fn test_unvoted_pitches_sort_last() {
        let entries = rank_pitches(vec![
            create_test_pitch(1, &[]),
            create_test_pitch(2, &[(1, 0)]),
            create_test_pitch(3, &[]),
        ]);
        assert_eq!(ids(&entries), vec![2, 1, 3]);
        assert_eq!(entries[1].weighted_score, 0.0);
        assert_eq!(entries[1].most_recent_vote_timestamp, None);
    }

    #[test_log::test]
    fn test_sort_uses_unrounded_score() {
        // 7/3 * log10(4) = 1.4048 and 2 * log10(5) = 1.3979, both display as 1.40
        let higher = create_test_pitch(1, &[(2, 0), (2, 0), (3, 0)]);
        let newer = create_test_pitch(2, &[(2, 60), (2, 60), (2, 60), (2, 60)]);

        let entries = rank_pitches(vec![newer, higher]);

        assert_eq!(entries[0].weighted_score, 1.4);
        assert_eq!(entries[1].weighted_score, 1.4);
        assert_eq!(ids(&entries), vec![1, 2]);
    }

    #[test_log::test]
    fn test_exact_tie_with_different_votes_uses_recency() {
        let older = create_test_pitch(1, &[(5, 0), (5, 0), (5, 0), (4, 0), (4, 0)]);
        let newer = create_test_pitch(2, &[(5, 100), (5, 100), (5, 100), (5, 100), (3, 100)]);

        let entries = rank_pitches(vec![older, newer]);

        assert_eq!(ids(&entries), vec![2, 1]);
    }

    #[test_log::test]
    fn test_ranking_is_reproducible() {
        let build = || {
            (1..=40)
                .map(|id| {
                    let votes: Vec<(u8, i64)> = (0..(id % 6))
                        .map(|i| (((id + i) % 5 + 1) as u8, i64::from(id % 3)))
                        .collect();
                    create_test_pitch(id, &votes)
                })
                .collect::<Vec<_>>()
        };
        let first = rank_pitches(build());
        let mut reversed = build();
        reversed.reverse();
        let second = rank_pitches(reversed);
        assert_eq!(first, second);
    }

    #[test_log::test]
    fn test_compute_leaderboard_pages() {
        let pitches: Vec<PitchVotes> = (1..=7)
            .map(|id| create_test_pitch(id, &[(((id % 5) + 1) as u8, i64::from(id))]))
            .collect();
        let full = rank_pitches(pitches.clone());

        let mut rebuilt = Vec::new();
        for page in 1..=3 {
            let result = compute_leaderboard(pitches.clone(), Pagination::new(page, 3));
            assert_eq!(result.total, 7);
            assert_eq!(result.total_pages, 3);
            assert_eq!(result.current_page, page);
            rebuilt.extend(result.entries);
        }
        assert_eq!(rebuilt, full);
    }

    #[test_log::test]
    fn test_compute_leaderboard_honors_large_limit() {
        let pitches: Vec<PitchVotes> = (1..=150).map(|id| create_test_pitch(id, &[])).collect();
        let result = compute_leaderboard(pitches, Pagination::new(1, 200));
        assert_eq!(result.total, 150);
        assert_eq!(result.total_pages, 1);
        assert_eq!(result.entries.len(), 150);
    }

    #[test_log::test]
    fn test_entry_serializes_camel_case() {
        let entries = rank_pitches(vec![create_test_pitch(1, &[(4, 0)])]);
        let json = serde_json::to_value(&entries[0]).unwrap();
        assert_eq!(json["team"]["name"], "Team 1");
        assert_eq!(json["pitch"]["category"], "other");
        assert!(json["pitch"]["createdAt"].is_string());
        assert_eq!(json["totalVotes"], 1);
        assert_eq!(json["averageRating"], 4.0);
        assert!(json["mostRecentVoteTimestamp"].is_string());
    }
}
