use crate::error::Result;
use crate::models::{Candidate, Debate, Meeting, Policy};
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

lazy_static! {
    // Unpublished edits live next to the published document under this prefix
    static ref DRAFT_ID: Regex = Regex::new(r"^drafts\.").unwrap();
}

/// A JSON export of the CMS documents the progress pages read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub meetings: Vec<Meeting>,
    #[serde(default)]
    pub policies: Vec<Policy>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub debates: Vec<Debate>,
}

pub fn is_draft_id(id: &str) -> bool {
    DRAFT_ID.is_match(id)
}

impl Snapshot {
    pub fn from_json(raw: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(raw)?;
        Ok(snapshot.published())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let snapshot = Self::from_json(&raw)?;
        info!(
            "Loaded snapshot {}: {} meetings, {} policies, {} candidates, {} debates",
            path.display(),
            snapshot.meetings.len(),
            snapshot.policies.len(),
            snapshot.candidates.len(),
            snapshot.debates.len()
        );
        Ok(snapshot)
    }

    /// Drops draft documents, keeping only what the public site shows.
    pub fn published(mut self) -> Self {
        self.meetings.retain(|m| keep(&m.id));
        self.policies.retain(|p| keep(&p.id));
        self.candidates.retain(|c| keep(&c.id));
        self.debates.retain(|d| keep(&d.id));
        self
    }
}

fn keep(id: &str) -> bool {
    if is_draft_id(id) {
        debug!("Skipping draft document {}", id);
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Outcome, PolicyType};
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "meetings": [
            {
                "_id": "meeting-1",
                "title": "Council session 1",
                "date": "2025-02-01T09:00:00Z",
                "type": "central",
                "attendees": [
                    {"status": "present", "member": {"_id": "cand-1", "name": "Ploy"}},
                    {"status": "leave", "member": {"_id": "cand-2", "name": "Nat"}}
                ],
                "votes": [
                    {"title": "Budget", "results": [
                        {"vote": "approve", "member": {"_id": "cand-1", "name": "Ploy"}},
                        {"vote": null, "member": null}
                    ]}
                ],
                "motions": [{"title": "Library hours", "proposer": {"_id": "cand-1", "name": "Ploy"}}]
            },
            {"_id": "drafts.meeting-1", "title": "Council session 1 (edited)"}
        ],
        "policies": [
            {"_id": "p1", "title": "Free shuttle", "policyType": "central"},
            {"_id": "p2", "title": "Night library", "policyType": "center", "campus": "Rangsit"}
        ],
        "candidates": [
            {"_id": "cand-1", "name": "Ploy", "number": 1, "campus": "Rangsit"},
            {"_id": "drafts.cand-1", "name": "Ploy (edited)"}
        ],
        "debates": [
            {"_id": "debate-1", "title": "Tuition", "slug": "tuition", "summary": null, "date": "2025-03-01T12:00:00Z"},
            {"_id": "drafts.debate-1", "title": "Tuition (edited)"}
        ]
    }"#;

    #[test]
    fn drafts_are_dropped() {
        let snapshot = Snapshot::from_json(SAMPLE).unwrap();
        assert_eq!(snapshot.meetings.len(), 1);
        assert_eq!(snapshot.candidates.len(), 1);
        assert_eq!(snapshot.debates.len(), 1);
        assert_eq!(snapshot.debates[0].summary, "");
        assert!(is_draft_id("drafts.x"));
        assert!(!is_draft_id("meeting-drafts.x"));
    }

    #[test]
    fn center_policies_load() {
        let snapshot = Snapshot::from_json(SAMPLE).unwrap();
        assert_eq!(snapshot.policies.len(), 2);
        assert_eq!(snapshot.policies[1].policy_type, PolicyType::Center);
    }

    #[test]
    fn missing_member_keeps_the_vote() {
        let snapshot = Snapshot::from_json(SAMPLE).unwrap();
        let results = &snapshot.meetings[0].votes[0].results;
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].vote, Outcome::Other);
        assert_eq!(results[1].to_record().voter_name, "");
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let snapshot = Snapshot::load(file.path()).unwrap();
        assert_eq!(snapshot.meetings[0].attendees.len(), 2);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Snapshot::from_json("{\"meetings\": 3}").is_err());
    }
}
