use std::cmp::Reverse;

use crate::types::{Candidate, RankingMethod};

/// Ordered view over a run's candidates
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// Passing candidates best-first, then disqualified ones in issue order
    pub ordered: Vec<Candidate>,
    /// The first `top_n` passing candidates
    pub top: Vec<Candidate>,
}

/// Rank candidates. Sorting is stable, so ties keep issue order and ranking
/// an already ranked list changes nothing.
pub fn rank(candidates: &[Candidate], method: RankingMethod, top_n: usize) -> Ranking {
    let (mut passing, disqualified): (Vec<Candidate>, Vec<Candidate>) =
        candidates.iter().cloned().partition(Candidate::is_passing);

    match method {
        RankingMethod::RuleOnly => passing.sort_by_key(|c| Reverse(c.rule_rank_key())),
        RankingMethod::RulePlusLlmHardGate => passing.sort_by_key(|c| Reverse(c.final_score)),
    }

    let top = passing.iter().take(top_n).cloned().collect();
    let mut ordered = passing;
    ordered.extend(disqualified);
    Ranking { ordered, top }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DisqualifyReason;
    use pixel_score::{ColorStatistics, EdgeStatistics, compose_score};

    fn scored(id: u32, score: u8) -> Candidate {
        let mut candidate = Candidate::new(id, "p", "s");
        let mut pixel = compose_score(&ColorStatistics::default(), &EdgeStatistics::default());
        pixel.score = score;
        candidate.pixel_score = Some(pixel);
        candidate.final_score = i32::from(score);
        candidate
    }

    fn ids(candidates: &[Candidate]) -> Vec<u32> {
        candidates.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_rule_only_orders_by_pixel_score() {
        let mut unscored = Candidate::new(4, "p", "s");
        unscored.final_score = 0;
        let mut failed = Candidate::new(5, "p", "s");
        failed.disqualify(DisqualifyReason::NoImage { message: "x".into() });
        let candidates = vec![scored(1, 40), scored(2, 72), scored(3, 40), unscored, failed];

        let ranking = rank(&candidates, RankingMethod::RuleOnly, 2);
        assert_eq!(ids(&ranking.ordered), vec![2, 1, 3, 4, 5]);
        assert_eq!(ids(&ranking.top), vec![2, 1]);
    }

    #[test]
    fn test_gated_orders_by_final_score() {
        let mut a = scored(1, 80);
        a.final_score = 60;
        let mut b = scored(2, 50);
        b.final_score = 75;
        let mut c = scored(3, 90);
        c.disqualify(DisqualifyReason::JudgeFailed { message: "timeout".into() });
        let ranking = rank(&[a, b, c], RankingMethod::RulePlusLlmHardGate, 3);
        assert_eq!(ids(&ranking.ordered), vec![2, 1, 3]);
        assert_eq!(ids(&ranking.top), vec![2, 1]);
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let candidates = vec![scored(1, 10), scored(2, 90), scored(3, 90), scored(4, 55)];
        let once = rank(&candidates, RankingMethod::RuleOnly, 3);
        let twice = rank(&once.ordered, RankingMethod::RuleOnly, 3);
        assert_eq!(once, twice);
        assert_eq!(ids(&once.ordered), vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_top_never_includes_disqualified() {
        let mut bad = scored(1, 99);
        bad.disqualify(DisqualifyReason::CommercialGate {
            rule_score: 99,
            min_rule_score: 100,
        });
        let ranking = rank(&[bad], RankingMethod::RuleOnly, 3);
        assert!(ranking.top.is_empty());
        assert_eq!(ranking.ordered.len(), 1);
    }
}
