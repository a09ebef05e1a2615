use crate::campus::ProvinceGroup;
use crate::db::ImportSummary;
use crate::models::{AttendanceStatus, Debate, Locale, Meeting, Outcome, Policy};
use crate::progress::attendance::AttendanceBreakdown;
use crate::progress::member::MemberStats;
use crate::progress::policy::ProgressStage;
use crate::progress::tally::{self, VoteTally};
use crate::progress::VoteReport;
use std::collections::BTreeMap;

pub fn format_import(summary: &ImportSummary) -> String {
    format!(
        "Imported {} meetings ({} vote items), {} policies, {} candidates, {} debates.",
        summary.meetings, summary.vote_items, summary.policies, summary.candidates, summary.debates
    )
}

fn format_tally_line(counts: &VoteTally, locale: Locale) -> String {
    let mut parts: Vec<String> = counts
        .entries()
        .into_iter()
        .filter(|(outcome, _)| *outcome != Outcome::Other)
        .map(|(outcome, count)| format!("{} {}", outcome.label(locale), count))
        .collect();
    if counts.other > 0 {
        parts.push(format!("? {}", counts.other));
    }
    parts.join(" / ")
}

pub fn format_meetings(meetings: &[Meeting], locale: Locale) -> String {
    if meetings.is_empty() {
        return "No meetings recorded.".to_string();
    }

    let mut summary = String::new();
    for meeting in meetings {
        let date = meeting
            .date
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        let place = meeting.campus.as_deref().unwrap_or(meeting.kind.as_str());

        summary.push_str(&format!("{} **{}** [{}] ({})\n", date, meeting.title, place, meeting.id));

        for (i, item) in meeting.votes.iter().enumerate() {
            let counts = tally::tally_outcomes(item.results.iter().map(|r| r.vote));
            summary.push_str(&format!("  #{} {}: {}\n", i, item.title, format_tally_line(&counts, locale)));
        }
        for motion in &meeting.motions {
            let proposer = motion.proposer.as_ref().map(|p| p.name.as_str()).unwrap_or("-");
            summary.push_str(&format!("  * {} ({})\n", motion.title, proposer));
        }
    }
    summary
}

pub fn format_vote_report(report: &VoteReport, locale: Locale) -> String {
    let mut summary = format!("**{}**\n", report.topic);

    for (outcome, count) in report.tally.entries() {
        if outcome == Outcome::Other && count == 0 {
            continue;
        }
        summary.push_str(&format!("{}: {}\n", outcome.label(locale), count));
    }

    let filled = report.tally.total();
    summary.push_str(&format!(
        "\n{} of {} seats voted, {} shown as {}.",
        filled,
        report.total_seats,
        report.total_seats - filled,
        Outcome::Other.label(locale)
    ));
    summary
}

pub fn format_attendance(breakdown: &AttendanceBreakdown, locale: Locale) -> String {
    let Some(rate) = breakdown.attendance_rate() else {
        return "No meeting data available.".to_string();
    };

    format!(
        "{}: {}\n{}: {}\n{}: {}\n\nAttendance {}%",
        AttendanceStatus::Present.label(locale),
        breakdown.present,
        AttendanceStatus::Leave.label(locale),
        breakdown.leave,
        AttendanceStatus::Absent.label(locale),
        breakdown.absent,
        rate
    )
}

pub fn format_member_stats(stats: &MemberStats, name: Option<&str>, locale: Locale) -> String {
    let mut summary = format!("**{}** ({})\n", name.unwrap_or("Unknown member"), stats.member_id);
    summary.push_str(&format!(
        "Meetings: {} attended of {}, {} missed\n",
        stats.meetings.attended_count, stats.meetings.total_meetings, stats.missed
    ));
    summary.push_str(&format!("Votes: {}\n", format_tally_line(&stats.votes, locale)));
    summary.push_str(&format!("Motions proposed: {}", stats.motions_proposed));
    summary
}

pub fn format_policies(policies: &[&Policy]) -> String {
    if policies.is_empty() {
        return "No policies match.".to_string();
    }

    policies
        .iter()
        .map(|policy| {
            let stage = ProgressStage::from_progress(policy.progress);
            format!("[{:>3}%] {} ({})", stage.percent(), policy.title, policy.slug)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_debates(debates: &[Debate]) -> String {
    if debates.is_empty() {
        return "No debates recorded.".to_string();
    }

    debates
        .iter()
        .map(|debate| {
            let date = debate
                .date
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "----------".to_string());
            format!("{} **{}** ({})", date, debate.title, debate.slug)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_candidates(grouped: &BTreeMap<&'static str, ProvinceGroup<'_>>) -> String {
    if grouped.is_empty() {
        return "No candidates with a known campus.".to_string();
    }

    let mut summary = String::new();
    for (province_id, group) in grouped {
        summary.push_str(&format!("{} {}\n", province_id, group.province_name));
        for candidate in &group.candidates {
            match candidate.number {
                Some(number) => summary.push_str(&format!("  {}. {}\n", number, candidate.name)),
                None => summary.push_str(&format!("  - {}\n", candidate.name)),
            }
        }
    }
    summary
}
