use std::cmp::Reverse;

use crate::model::{LeaderboardEntry, LevelProgress, TelegramId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderRow {
    pub rank: u32,
    pub entry: LeaderboardEntry,
    pub is_me: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LeaderboardView {
    pub rows: Vec<LeaderRow>,
    /// The viewer's own row when they are outside the listed top entries.
    pub pinned_me: Option<LeaderRow>,
    pub level: Option<LevelSummary>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LevelSummary {
    pub current: String,
    pub next: Option<String>,
    pub percent: f64,
    pub remaining: u64,
}

impl LevelSummary {
    pub fn caption(&self) -> String {
        match &self.next {
            Some(next) => format!(
                "{}% · {} points to reach {}",
                self.percent.round(),
                self.remaining,
                next
            ),
            None => "Max level reached 🌊".to_string(),
        }
    }
}

/// Rows ordered by rank, ties by balance then id. Entries without a rank take
/// their listing position, so a rebuild over the same data is identical.
pub fn build(entries: &[LeaderboardEntry], progress: Option<&LevelProgress>, me: Option<TelegramId>) -> LeaderboardView {
    let mut rows: Vec<LeaderRow> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| LeaderRow {
            rank: e.rank.unwrap_or(i as u32 + 1),
            entry: e.clone(),
            is_me: me.is_some_and(|id| id == e.telegram_id),
        })
        .collect();
    rows.sort_by_key(|r| (r.rank, Reverse(r.entry.balance), r.entry.telegram_id));

    let listed = rows.iter().any(|r| r.is_me);
    let pinned_me = match (listed, progress.and_then(|p| p.my_rank.as_ref())) {
        (false, Some(mine)) => Some(LeaderRow {
            rank: mine.rank.unwrap_or(0),
            entry: mine.clone(),
            is_me: true,
        }),
        _ => None,
    };

    let level = progress.map(|p| LevelSummary {
        current: p.current_level.clone(),
        next: p.next_level.clone(),
        percent: p.progress.clamp(0.0, 100.0),
        remaining: p.remaining,
    });

    LeaderboardView {
        rows,
        pinned_me,
        level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: TelegramId, rank: Option<u32>, balance: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            telegram_id: id,
            name: format!("user{}", id),
            country_flag: "🇬🇭".into(),
            balance,
            referrals: 0,
        }
    }

    #[test]
    fn rebuild_over_same_data_is_identical() {
        let data = vec![entry(3, Some(2), 50), entry(1, Some(1), 90), entry(2, Some(2), 70)];
        let a = build(&data, None, Some(2));
        let b = build(&data, None, Some(2));
        assert_eq!(a, b);
        let order: Vec<TelegramId> = a.rows.iter().map(|r| r.entry.telegram_id).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert!(a.rows[1].is_me);
    }

    #[test]
    fn unranked_entries_keep_listing_position() {
        let data = vec![entry(9, None, 10), entry(8, None, 99)];
        let v = build(&data, None, None);
        assert_eq!(v.rows[0].entry.telegram_id, 9);
        assert_eq!(v.rows[1].rank, 2);
    }

    #[test]
    fn viewer_outside_top_list_is_pinned() {
        let data = vec![entry(1, Some(1), 90)];
        let progress = LevelProgress {
            current_level: "Blue Seed".into(),
            next_level: Some("Blue Wave".into()),
            progress: 42.4,
            remaining: 580,
            my_rank: Some(entry(7, Some(42), 12)),
        };
        let v = build(&data, Some(&progress), Some(7));
        assert_eq!(v.pinned_me.as_ref().unwrap().rank, 42);
        assert_eq!(
            v.level.unwrap().caption(),
            "42% · 580 points to reach Blue Wave"
        );

        let listed = build(&data, Some(&progress), Some(1));
        assert!(listed.pinned_me.is_none());
    }
}
