use crate::models::{AttendanceRecord, AttendanceStatus, MeetingAggregate};
use serde::Serialize;

/// Whether an excused absence ("leave") counts against a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeavePolicy {
    #[default]
    CountsAsMissed,
    Excused,
}

pub fn aggregate(records: &[AttendanceRecord], policy: LeavePolicy) -> MeetingAggregate {
    let attended_count = records
        .iter()
        .filter(|record| match record.status {
            Some(AttendanceStatus::Present) => true,
            Some(AttendanceStatus::Leave) => policy == LeavePolicy::Excused,
            Some(AttendanceStatus::Absent) | None => false,
        })
        .count();

    MeetingAggregate {
        total_meetings: records.len(),
        attended_count,
    }
}

/// Meetings missed; leave and a missing status both count as missed.
pub fn missed(records: &[AttendanceRecord]) -> usize {
    missed_with(records, LeavePolicy::CountsAsMissed)
}

pub fn missed_with(records: &[AttendanceRecord], policy: LeavePolicy) -> usize {
    aggregate(records, policy).missed()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AttendanceBreakdown {
    pub present: usize,
    pub leave: usize,
    pub absent: usize,
}

/// Spans of the attendance pie chart, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PieSegments {
    pub present: f64,
    pub leave: f64,
    pub absent: f64,
}

impl AttendanceBreakdown {
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = AttendanceStatus>,
    {
        let mut breakdown = Self::default();
        for status in statuses {
            match status {
                AttendanceStatus::Present => breakdown.present += 1,
                AttendanceStatus::Leave => breakdown.leave += 1,
                AttendanceStatus::Absent => breakdown.absent += 1,
            }
        }
        breakdown
    }

    /// Entries without a status are left out.
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        Self::from_statuses(records.iter().filter_map(|record| record.status))
    }

    pub fn total(&self) -> usize {
        self.present + self.leave + self.absent
    }

    /// Whole-number percentage of present entries, `None` with no data.
    pub fn attendance_rate(&self) -> Option<u32> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some((self.present as f64 * 100.0 / total as f64).round() as u32)
    }

    pub fn pie_segments(&self) -> Option<PieSegments> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let degrees = |count: usize| count as f64 / total as f64 * 360.0;
        Some(PieSegments {
            present: degrees(self.present),
            leave: degrees(self.leave),
            absent: degrees(self.absent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(statuses: &[AttendanceStatus]) -> Vec<AttendanceRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| AttendanceRecord {
                meeting_id: format!("meeting-{}", i),
                status: Some(*status),
            })
            .collect()
    }

    #[test]
    fn missed_counts_non_present() {
        use AttendanceStatus::*;
        assert_eq!(missed(&records(&[Present, Present, Absent])), 1);
        assert_eq!(missed(&[]), 0);
        assert_eq!(missed(&records(&[Leave])), 1);
    }

    #[test]
    fn excused_leave_is_not_missed() {
        use AttendanceStatus::*;
        let input = records(&[Leave, Absent, Present]);
        assert_eq!(missed_with(&input, LeavePolicy::Excused), 1);
        assert_eq!(missed_with(&input, LeavePolicy::CountsAsMissed), 2);
    }

    #[test]
    fn aggregate_counts_meetings() {
        use AttendanceStatus::*;
        let result = aggregate(&records(&[Present, Absent, Present, Leave]), LeavePolicy::default());
        assert_eq!(result, MeetingAggregate { total_meetings: 4, attended_count: 2 });
    }

    #[test]
    fn breakdown_rate_and_segments() {
        use AttendanceStatus::*;
        let breakdown = AttendanceBreakdown::from_statuses([Present, Present, Present, Leave, Absent, Absent]);
        assert_eq!(breakdown, AttendanceBreakdown { present: 3, leave: 1, absent: 2 });
        assert_eq!(breakdown.attendance_rate(), Some(50));

        let segments = breakdown.pie_segments().unwrap();
        assert!((segments.present - 180.0).abs() < 1e-9);
        assert!((segments.leave - 60.0).abs() < 1e-9);
        assert!((segments.present + segments.leave + segments.absent - 360.0).abs() < 1e-9);
    }

    #[test]
    fn missing_status_is_missed_but_not_in_breakdown() {
        use AttendanceStatus::*;
        let mut input = records(&[Present, Present]);
        input.push(AttendanceRecord { meeting_id: "meeting-x".into(), status: None });

        assert_eq!(missed(&input), 1);
        assert_eq!(missed_with(&input, LeavePolicy::Excused), 1);

        let breakdown = AttendanceBreakdown::from_records(&input);
        assert_eq!(breakdown, AttendanceBreakdown { present: 2, leave: 0, absent: 0 });
        assert_eq!(breakdown.attendance_rate(), Some(100));
    }

    #[test]
    fn empty_breakdown_has_no_rate() {
        let breakdown = AttendanceBreakdown::default();
        assert_eq!(breakdown.attendance_rate(), None);
        assert!(breakdown.pie_segments().is_none());
    }
}
