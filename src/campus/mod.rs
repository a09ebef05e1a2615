use crate::models::Candidate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

lazy_static! {
    // ISO 3166-2 subdivision codes for Thai provinces
    static ref PROVINCE_ID: Regex = Regex::new(r"^TH-\d{2}$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Campus {
    Rangsit,
    Lampang,
    ThaPrachan,
}

impl Campus {
    pub const ALL: [Campus; 3] = [Campus::Rangsit, Campus::Lampang, Campus::ThaPrachan];

    pub fn from_cms(value: &str) -> Option<Self> {
        match value {
            "Rangsit" => Some(Campus::Rangsit),
            "Lampang" => Some(Campus::Lampang),
            "Tha Prachan" => Some(Campus::ThaPrachan),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Campus::Rangsit => "Rangsit",
            Campus::Lampang => "Lampang",
            Campus::ThaPrachan => "Tha Prachan",
        }
    }

    pub fn province_id(&self) -> &'static str {
        match self {
            Campus::Rangsit => "TH-13",
            Campus::Lampang => "TH-52",
            Campus::ThaPrachan => "TH-10",
        }
    }

    pub fn province_name(&self) -> &'static str {
        match self {
            Campus::Rangsit => "ปทุมธานี",
            Campus::Lampang => "ลำปาง",
            Campus::ThaPrachan => "กรุงเทพมหานคร",
        }
    }
}

pub fn is_province_id(value: &str) -> bool {
    PROVINCE_ID.is_match(value)
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvinceGroup<'a> {
    pub province_name: &'static str,
    pub candidates: Vec<&'a Candidate>,
}

/// Groups candidates under the province of their campus, keyed by province
/// id. Candidates without a recognised campus are left out.
pub fn group_by_province(candidates: &[Candidate]) -> BTreeMap<&'static str, ProvinceGroup<'_>> {
    let mut grouped: BTreeMap<&'static str, ProvinceGroup<'_>> = BTreeMap::new();

    for candidate in candidates {
        let Some(campus) = candidate.campus.as_deref().and_then(Campus::from_cms) else {
            continue;
        };

        grouped
            .entry(campus.province_id())
            .or_insert_with(|| ProvinceGroup {
                province_name: campus.province_name(),
                candidates: Vec::new(),
            })
            .candidates
            .push(candidate);
    }

    grouped
}
