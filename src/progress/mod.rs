pub mod attendance;
pub mod member;
pub mod policy;
pub mod seats;
pub mod tally;

use crate::error::Result;
use crate::models::{SeatPosition, VoteRecord};
use serde::Serialize;

// Everything the vote detail view needs for one vote item
#[derive(Debug, Clone, Serialize)]
pub struct VoteReport {
    pub topic: String,
    pub tally: tally::VoteTally,
    pub total_seats: usize,
    pub seats: Vec<SeatPosition>,
}

pub fn build_vote_report(
    topic: &str,
    votes: &[VoteRecord],
    total_seats: usize,
    cluster: bool,
) -> Result<VoteReport> {
    let seats = if cluster {
        seats::layout_seats(&seats::cluster_by_outcome(votes), total_seats)?
    } else {
        seats::layout_seats(votes, total_seats)?
    };

    Ok(VoteReport {
        topic: topic.to_string(),
        tally: tally::tally(votes),
        total_seats,
        seats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Outcome;

    #[test]
    fn report_for_small_vote() {
        let votes: Vec<VoteRecord> = [Outcome::Approve, Outcome::Disapprove, Outcome::Abstain]
            .iter()
            .enumerate()
            .map(|(i, outcome)| VoteRecord {
                voter_id: format!("m{}", i),
                voter_name: format!("Member {}", i),
                outcome: *outcome,
            })
            .collect();

        let report = build_vote_report("Budget", &votes, 5, false).unwrap();

        assert_eq!(report.tally.approve, 1);
        assert_eq!(report.tally.disapprove, 1);
        assert_eq!(report.tally.abstain, 1);
        assert_eq!(report.tally.no_vote, 0);
        assert_eq!(report.seats.len(), 5);
        assert_eq!(report.seats.iter().filter(|s| s.record.outcome == Outcome::Other).count(), 2);
    }

    #[test]
    fn clustered_report_keeps_tally() {
        let votes: Vec<VoteRecord> = [Outcome::NoVote, Outcome::Approve]
            .iter()
            .map(|outcome| VoteRecord {
                voter_id: outcome.to_string(),
                voter_name: String::new(),
                outcome: *outcome,
            })
            .collect();

        let report = build_vote_report("Budget", &votes, 10, true).unwrap();
        assert_eq!(report.seats[0].record.outcome, Outcome::Approve);
        assert_eq!(report.tally.total(), 2);
    }

    #[test]
    fn report_rejects_overfull_vote() {
        let votes = vec![
            VoteRecord { voter_id: "a".into(), voter_name: "A".into(), outcome: Outcome::Approve };
            3
        ];
        assert!(build_vote_report("Budget", &votes, 2, false).is_err());
    }
}
