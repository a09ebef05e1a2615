use crate::models::{Outcome, VoteRecord};
use serde::Serialize;

/// Per-outcome counts for one decision. The four real outcomes are always
/// present; `other` holds votes with a missing or unknown outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VoteTally {
    pub approve: usize,
    pub disapprove: usize,
    pub abstain: usize,
    pub no_vote: usize,
    pub other: usize,
}

impl VoteTally {
    pub fn get(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Approve => self.approve,
            Outcome::Disapprove => self.disapprove,
            Outcome::Abstain => self.abstain,
            Outcome::NoVote => self.no_vote,
            Outcome::Other => self.other,
        }
    }

    fn slot(&mut self, outcome: Outcome) -> &mut usize {
        match outcome {
            Outcome::Approve => &mut self.approve,
            Outcome::Disapprove => &mut self.disapprove,
            Outcome::Abstain => &mut self.abstain,
            Outcome::NoVote => &mut self.no_vote,
            Outcome::Other => &mut self.other,
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        *self.slot(outcome) += 1;
    }

    pub fn total(&self) -> usize {
        Outcome::ALL.iter().map(|outcome| self.get(*outcome)).sum()
    }

    /// Counts in display order, `other` last.
    pub fn entries(&self) -> Vec<(Outcome, usize)> {
        Outcome::ALL.iter().map(|outcome| (*outcome, self.get(*outcome))).collect()
    }
}

pub fn tally(votes: &[VoteRecord]) -> VoteTally {
    tally_outcomes(votes.iter().map(|vote| vote.outcome))
}

pub fn tally_outcomes<I>(outcomes: I) -> VoteTally
where
    I: IntoIterator<Item = Outcome>,
{
    let mut counts = VoteTally::default();
    for outcome in outcomes {
        counts.record(outcome);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn votes(outcomes: &[Outcome]) -> Vec<VoteRecord> {
        outcomes
            .iter()
            .enumerate()
            .map(|(i, outcome)| VoteRecord {
                voter_id: format!("m{}", i),
                voter_name: format!("Member {}", i),
                outcome: *outcome,
            })
            .collect()
    }

    #[test]
    fn empty_input_is_all_zero() {
        let counts = tally(&[]);
        assert_eq!(counts, VoteTally::default());
        for outcome in [Outcome::Approve, Outcome::Disapprove, Outcome::Abstain, Outcome::NoVote] {
            assert_eq!(counts.get(outcome), 0);
        }
    }

    #[test]
    fn three_way_split() {
        let counts = tally(&votes(&[Outcome::Approve, Outcome::Disapprove, Outcome::Abstain]));
        assert_eq!(
            counts,
            VoteTally { approve: 1, disapprove: 1, abstain: 1, no_vote: 0, other: 0 }
        );
    }

    #[test]
    fn counts_sum_to_input_length() {
        let input = votes(&[
            Outcome::Approve,
            Outcome::Approve,
            Outcome::NoVote,
            Outcome::Other,
            Outcome::Abstain,
            Outcome::Disapprove,
        ]);
        assert_eq!(tally(&input).total(), input.len());
        assert_eq!(tally(&input).other, 1);
    }

    #[test]
    fn order_does_not_matter() {
        let mut input = votes(&[Outcome::Approve, Outcome::NoVote, Outcome::Approve, Outcome::Abstain]);
        let forward = tally(&input);
        input.reverse();
        assert_eq!(tally(&input), forward);
    }

    #[test]
    fn entries_follow_display_order() {
        let counts = tally(&votes(&[Outcome::NoVote, Outcome::Approve]));
        let entries = counts.entries();
        assert_eq!(entries[0], (Outcome::Approve, 1));
        assert_eq!(entries[3], (Outcome::NoVote, 1));
        assert_eq!(entries.len(), 5);
    }
}
