use crate::models::{AttendanceRecord, MeetingAggregate, Outcome};
use crate::progress::attendance::{self, AttendanceBreakdown, LeavePolicy};
use crate::progress::tally::{self, VoteTally};
use serde::Serialize;

/// One member's own vote on one vote item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberVote {
    pub meeting_id: String,
    pub meeting_title: String,
    pub topic: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberStats {
    pub member_id: String,
    pub meetings: MeetingAggregate,
    pub missed: usize,
    pub attendance: AttendanceBreakdown,
    pub votes: VoteTally,
    pub motions_proposed: usize,
}

impl MemberStats {
    pub fn new(
        member_id: &str,
        attendance_records: &[AttendanceRecord],
        votes: &[MemberVote],
        motions_proposed: usize,
        policy: LeavePolicy,
    ) -> Self {
        let meetings = attendance::aggregate(attendance_records, policy);

        Self {
            member_id: member_id.to_string(),
            meetings,
            missed: attendance::missed_with(attendance_records, policy),
            attendance: AttendanceBreakdown::from_records(attendance_records),
            votes: tally::tally_outcomes(votes.iter().map(|vote| vote.outcome)),
            motions_proposed,
        }
    }
}
