use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankTier {
    pub name: &'static str,
    pub threshold: u64,
}

pub const RANK_TIERS: &[RankTier] = &[
    RankTier { name: "Newbie", threshold: 0 },
    RankTier { name: "Puzzle Apprentice", threshold: 1_000 },
    RankTier { name: "Riddle Solver", threshold: 2_500 },
    RankTier { name: "Logic Luminary", threshold: 5_000 },
    RankTier { name: "Brainiac", threshold: 10_000 },
    RankTier { name: "Puzzle Master", threshold: 20_000 },
    RankTier { name: "Grandmaster", threshold: 50_000 },
    RankTier { name: "Rankle Legend", threshold: 100_000 },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankInfo {
    pub current_rank: RankTier,
    pub next_rank: Option<RankTier>,
    /// Percent of the way to the next tier.
    pub progress: u8,
    pub is_max_rank: bool,
}

pub fn rank_for_score(total_score: u64) -> RankInfo {
    let index = RANK_TIERS
        .iter()
        .rposition(|tier| total_score >= tier.threshold)
        .unwrap_or(0);
    let current_rank = RANK_TIERS[index];
    let next_rank = RANK_TIERS.get(index + 1).copied();

    let progress = match next_rank {
        Some(next) => {
            let span = (next.threshold - current_rank.threshold) as f64;
            let into = (total_score - current_rank.threshold) as f64;
            (into / span * 100.0).round().min(100.0) as u8
        }
        None => 100,
    };

    RankInfo {
        current_rank,
        next_rank,
        progress,
        is_max_rank: next_rank.is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_players_are_newbies() {
        let info = rank_for_score(0);
        assert_eq!(info.current_rank.name, "Newbie");
        assert_eq!(info.next_rank.map(|r| r.name), Some("Puzzle Apprentice"));
        assert_eq!(info.progress, 0);
        assert!(!info.is_max_rank);
    }

    #[test]
    fn progress_within_tier() {
        let info = rank_for_score(1_750);
        assert_eq!(info.current_rank.name, "Puzzle Apprentice");
        assert_eq!(info.progress, 50);
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(rank_for_score(2_500).current_rank.name, "Riddle Solver");
        assert_eq!(rank_for_score(2_499).current_rank.name, "Puzzle Apprentice");
    }

    #[test]
    fn top_tier_is_max() {
        let info = rank_for_score(250_000);
        assert_eq!(info.current_rank.name, "Rankle Legend");
        assert!(info.is_max_rank);
        assert_eq!(info.progress, 100);
        assert_eq!(info.next_rank, None);
    }
}
