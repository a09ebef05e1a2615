use crate::campus::Campus;
use crate::error::Error;
use crate::models::{Policy, PolicyType};
use serde::Serialize;
use std::str::FromStr;

/// Progress bars only move in quarter steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ProgressStage {
    NotStarted,
    Quarter,
    Half,
    ThreeQuarters,
    Done,
}

impl ProgressStage {
    pub fn from_progress(progress: u32) -> Self {
        match progress {
            p if p >= 100 => ProgressStage::Done,
            p if p >= 75 => ProgressStage::ThreeQuarters,
            p if p >= 50 => ProgressStage::Half,
            p if p >= 25 => ProgressStage::Quarter,
            _ => ProgressStage::NotStarted,
        }
    }

    pub fn percent(&self) -> u32 {
        match self {
            ProgressStage::NotStarted => 0,
            ProgressStage::Quarter => 25,
            ProgressStage::Half => 50,
            ProgressStage::ThreeQuarters => 75,
            ProgressStage::Done => 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PolicyFilter {
    #[default]
    All,
    Central,
    Campus(Campus),
}

impl FromStr for PolicyFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(Error::InvalidInput("Empty policy filter".to_string())),
            "all" => Ok(PolicyFilter::All),
            "central" => Ok(PolicyFilter::Central),
            other => Campus::from_cms(other)
                .map(PolicyFilter::Campus)
                .ok_or_else(|| Error::InvalidInput(format!("Unknown campus: {}", other))),
        }
    }
}

impl PolicyFilter {
    pub fn matches(&self, policy: &Policy) -> bool {
        match self {
            PolicyFilter::All => true,
            PolicyFilter::Central => policy.policy_type == PolicyType::Central,
            PolicyFilter::Campus(campus) => policy.campus.as_deref() == Some(campus.as_str()),
        }
    }
}

pub fn filter_policies<'a>(policies: &'a [Policy], filter: &PolicyFilter) -> Vec<&'a Policy> {
    policies.iter().filter(|policy| filter.matches(policy)).collect()
}
