use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use log::warn;

/// Disposition of a single vote. Anything the CMS leaves blank or spells
/// differently is read as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Approve,
    Disapprove,
    Abstain,
    NoVote,
    #[default]
    Other,
}

impl Outcome {
    pub const ALL: [Outcome; 5] = [
        Outcome::Approve,
        Outcome::Disapprove,
        Outcome::Abstain,
        Outcome::NoVote,
        Outcome::Other,
    ];

    pub fn from_cms(value: &str) -> Self {
        match value {
            "approve" => Outcome::Approve,
            "disapprove" => Outcome::Disapprove,
            "abstain" => Outcome::Abstain,
            "no_vote" => Outcome::NoVote,
            _ => Outcome::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Approve => "approve",
            Outcome::Disapprove => "disapprove",
            Outcome::Abstain => "abstain",
            Outcome::NoVote => "no_vote",
            Outcome::Other => "other",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Outcome::Approve, Locale::Th) => "เห็นชอบ",
            (Outcome::Disapprove, Locale::Th) => "ไม่เห็นชอบ",
            (Outcome::Abstain, Locale::Th) => "งดออกเสียง",
            (Outcome::NoVote, Locale::Th) => "ไม่ลงคะแนน",
            (Outcome::Other, Locale::Th) => "พรรคอื่น",
            (Outcome::Approve, Locale::En) => "Approve",
            (Outcome::Disapprove, Locale::En) => "Disapprove",
            (Outcome::Abstain, Locale::En) => "Abstain",
            (Outcome::NoVote, Locale::En) => "No vote",
            (Outcome::Other, Locale::En) => "Other parties",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Outcome::from_cms).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Leave,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Leave => "leave",
            AttendanceStatus::Absent => "absent",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (AttendanceStatus::Present, Locale::Th) => "เข้าร่วม",
            (AttendanceStatus::Leave, Locale::Th) => "ลา",
            (AttendanceStatus::Absent, Locale::Th) => "ขาด",
            (AttendanceStatus::Present, Locale::En) => "Present",
            (AttendanceStatus::Leave, Locale::En) => "Leave",
            (AttendanceStatus::Absent, Locale::En) => "Absent",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "leave" => Ok(AttendanceStatus::Leave),
            "absent" => Ok(AttendanceStatus::Absent),
            other => Err(Error::InvalidInput(format!("Unknown attendance status: {}", other))),
        }
    }
}

// Unset or unrecognised statuses carry no attendance data
fn status_or_none<'de, D>(deserializer: D) -> Result<Option<AttendanceStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value.parse() {
        Ok(status) => Some(status),
        Err(e) => {
            warn!("Ignoring attendance entry: {}", e);
            None
        }
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Th,
    En,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter_id: String,
    pub voter_name: String,
    pub outcome: Outcome,
}

/// A member's attendance in one meeting. `None` when the meeting references
/// the member but holds no status for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub meeting_id: String,
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MeetingAggregate {
    pub total_meetings: usize,
    pub attended_count: usize,
}

impl MeetingAggregate {
    pub fn missed(&self) -> usize {
        self.total_meetings - self.attended_count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatPosition {
    pub record: VoteRecord,
    pub x: f64,
    pub y: f64,
    /// Radius of the row the seat sits on
    pub radius: f64,
    /// Marker diameter
    pub size: f64,
}

// --- CMS documents, shaped like the progress and candidate query results ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingKind {
    #[default]
    Central,
    Center,
}

impl MeetingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingKind::Central => "central",
            MeetingKind::Center => "center",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "center" => MeetingKind::Center,
            _ => MeetingKind::Central,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: MeetingKind,
    #[serde(default)]
    pub campus: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attendees: Vec<Attendee>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub votes: Vec<VoteItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub motions: Vec<Motion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    #[serde(default, deserialize_with = "status_or_none")]
    pub status: Option<AttendanceStatus>,
    #[serde(default)]
    pub member: Option<MemberRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<VoteResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteResult {
    #[serde(default)]
    pub vote: Outcome,
    #[serde(default)]
    pub member: Option<MemberRef>,
}

impl VoteResult {
    pub fn to_record(&self) -> VoteRecord {
        let (voter_id, voter_name) = match &self.member {
            Some(member) => (member.id.clone(), member.name.clone()),
            None => (String::new(), String::new()),
        };
        VoteRecord {
            voter_id,
            voter_name,
            outcome: self.vote,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub proposer: Option<MemberRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyType {
    #[default]
    Central,
    Center,
}

impl PolicyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyType::Central => "central",
            PolicyType::Center => "center",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "center" => PolicyType::Center,
            _ => PolicyType::Central,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub policy_type: PolicyType,
    #[serde(default)]
    pub campus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub campus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debate {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

// GROQ projections return null for unset fields rather than omitting them
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_or_missing_outcome_reads_as_other() {
        let result: VoteResult = serde_json::from_str(r#"{"vote": "maybe"}"#).unwrap();
        assert_eq!(result.vote, Outcome::Other);

        let result: VoteResult = serde_json::from_str(r#"{"vote": null}"#).unwrap();
        assert_eq!(result.vote, Outcome::Other);

        let result: VoteResult = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(result.vote, Outcome::Other);
        assert_eq!(result.to_record().voter_id, "");
    }

    #[test]
    fn outcome_serializes_with_cms_names() {
        assert_eq!(serde_json::to_string(&Outcome::NoVote).unwrap(), "\"no_vote\"");
        assert_eq!(Outcome::from_cms("no_vote"), Outcome::NoVote);
    }

    #[test]
    fn unset_attendance_status_has_no_data() {
        let attendee: Attendee = serde_json::from_str(r#"{"status": null}"#).unwrap();
        assert_eq!(attendee.status, None);

        let attendee: Attendee = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(attendee.status, None);

        let attendee: Attendee = serde_json::from_str(r#"{"status": "sick"}"#).unwrap();
        assert_eq!(attendee.status, None);

        let attendee: Attendee = serde_json::from_str(r#"{"status": "leave"}"#).unwrap();
        assert_eq!(attendee.status, Some(AttendanceStatus::Leave));
    }

    #[test]
    fn center_policies_deserialize() {
        let policy: Policy =
            serde_json::from_str(r#"{"_id": "p2", "policyType": "center", "campus": "Rangsit"}"#).unwrap();
        assert_eq!(policy.policy_type, PolicyType::Center);
        assert_eq!(PolicyType::from_db(policy.policy_type.as_str()), PolicyType::Center);
    }

    #[test]
    fn meeting_tolerates_null_arrays() {
        let meeting: Meeting = serde_json::from_str(
            r#"{
                "_id": "m1",
                "title": null,
                "date": "2025-01-15T09:00:00.000Z",
                "type": "center",
                "campus": "Rangsit",
                "attendees": null,
                "votes": [{"title": "Budget", "results": null}]
            }"#,
        )
        .unwrap();

        assert_eq!(meeting.title, "");
        assert_eq!(meeting.kind, MeetingKind::Center);
        assert!(meeting.attendees.is_empty());
        assert!(meeting.motions.is_empty());
        assert!(meeting.votes[0].results.is_empty());
        assert!(meeting.date.is_some());
    }

    #[test]
    fn aggregate_missed_is_difference() {
        let aggregate = MeetingAggregate { total_meetings: 7, attended_count: 5 };
        assert_eq!(aggregate.missed(), 2);
    }
}
