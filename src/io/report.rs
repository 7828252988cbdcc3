//! Pure formatting of visitor notices and period reports
//!
//! Nothing here writes anywhere: subscribers build a [`Notice`] or a
//! [`PeriodReport`] and hand it to their [`Presenter`](crate::io::Presenter).

use crate::domain::{EmployeeId, VisitorId, VisitorRecord};
use crate::services::visitor_cache::Transition;
use chrono::{DateTime, Utc};
use serde::Serialize;

const TIME_FORMAT: &str = "%H:%M";

/// Direction of a visitor notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Arrival,
    Departure,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Arrival => "arrival",
            NoticeKind::Departure => "departure",
        }
    }
}

impl From<Transition> for NoticeKind {
    fn from(transition: Transition) -> Self {
        match transition {
            Transition::Entered => NoticeKind::Arrival,
            Transition::Exited => NoticeKind::Departure,
        }
    }
}

/// One arrival or departure, addressed to a subscriber's audience
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub audience: String,
    pub kind: NoticeKind,
    pub visitor_id: VisitorId,
    pub visitor_name: String,
    pub purpose: String,
    pub poc_id: EmployeeId,
    /// Entry time for arrivals, exit time for departures
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(audience: &str, transition: Transition, record: &VisitorRecord) -> Self {
        let kind = NoticeKind::from(transition);
        let at = match kind {
            NoticeKind::Arrival => record.entry_time,
            NoticeKind::Departure => record.exit_time().unwrap_or(record.entry_time),
        };
        Self {
            audience: audience.to_string(),
            kind,
            visitor_id: record.visitor_id,
            visitor_name: record.visitor_name.clone(),
            purpose: record.purpose.clone(),
            poc_id: record.poc_id,
            at,
        }
    }

    /// Single-line summary
    pub fn headline(&self) -> String {
        let verb = match self.kind {
            NoticeKind::Arrival => "entered the building",
            NoticeKind::Departure => "left the building",
        };
        format!(
            "[{}] {} (#{}) {} at {} ({})",
            self.audience,
            self.visitor_name,
            self.visitor_id,
            verb,
            self.at.format(TIME_FORMAT),
            self.purpose
        )
    }
}

/// One visitor row in a period report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub visitor_id: VisitorId,
    pub visitor_name: String,
    pub purpose: String,
    pub poc_id: EmployeeId,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub in_building: bool,
}

impl From<&VisitorRecord> for ReportRow {
    fn from(record: &VisitorRecord) -> Self {
        Self {
            visitor_id: record.visitor_id,
            visitor_name: record.visitor_name.clone(),
            purpose: record.purpose.clone(),
            poc_id: record.poc_id,
            entry_time: record.entry_time,
            exit_time: record.exit_time(),
            in_building: record.in_building(),
        }
    }
}

/// End-of-period summary for a single audience
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub audience: String,
    pub rows: Vec<ReportRow>,
}

impl PeriodReport {
    pub fn new<'a>(audience: &str, records: impl IntoIterator<Item = &'a VisitorRecord>) -> Self {
        Self { audience: audience.to_string(), rows: records.into_iter().map(ReportRow::from).collect() }
    }

    pub fn still_inside(&self) -> usize {
        self.rows.iter().filter(|r| r.in_building).count()
    }

    pub fn visitor_ids(&self) -> Vec<VisitorId> {
        self.rows.iter().map(|r| r.visitor_id).collect()
    }

    /// Aligned text table: title, column header, one line per visitor, totals.
    pub fn render(&self) -> Vec<String> {
        let id_width = self.column_width("ID", |r| r.visitor_id.to_string().len());
        let name_width = self.column_width("Visitor", |r| r.visitor_name.len());
        let purpose_width = self.column_width("Purpose", |r| r.purpose.len());

        let mut lines = Vec::with_capacity(self.rows.len() + 4);
        lines.push(format!("Visitor report: {}", self.audience));
        lines.push(format!(
            "{:<id_width$}  {:<name_width$}  {:<purpose_width$}  {:>5}  {:>5}  {:>5}",
            "ID", "Visitor", "Purpose", "POC", "In", "Out"
        ));
        for row in &self.rows {
            let out = row
                .exit_time
                .map(|t| t.format(TIME_FORMAT).to_string())
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!(
                "{:<id_width$}  {:<name_width$}  {:<purpose_width$}  {:>5}  {:>5}  {:>5}",
                row.visitor_id.to_string(),
                row.visitor_name,
                row.purpose,
                row.poc_id.to_string(),
                row.entry_time.format(TIME_FORMAT).to_string(),
                out
            ));
        }
        lines.push(format!(
            "{} visitor(s), {} still in building",
            self.rows.len(),
            self.still_inside()
        ));
        lines
    }

    fn column_width(&self, header: &str, width: impl Fn(&ReportRow) -> usize) -> usize {
        self.rows.iter().map(width).max().unwrap_or(0).max(header.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_notice_arrival_uses_entry_time() {
        let record = VisitorRecord::arrival(10, "Sam Ortiz", "Interview", 1, at(9, 5));
        let notice = Notice::new("Ada Park", Transition::Entered, &record);

        assert_eq!(notice.kind, NoticeKind::Arrival);
        assert_eq!(notice.at, at(9, 5));
        assert_eq!(
            notice.headline(),
            "[Ada Park] Sam Ortiz (#10) entered the building at 09:05 (Interview)"
        );
    }

    #[test]
    fn test_notice_departure_uses_exit_time() {
        let mut record = VisitorRecord::arrival(10, "Sam Ortiz", "Interview", 1, at(9, 5));
        record.mark_exited(at(11, 40));
        let notice = Notice::new("Security", Transition::Exited, &record);

        assert_eq!(notice.kind, NoticeKind::Departure);
        assert_eq!(notice.at, at(11, 40));
        assert!(notice.headline().contains("left the building at 11:40"));
    }

    #[test]
    fn test_report_render_alignment() {
        let mut first = VisitorRecord::arrival(7, "Kim Reyes", "Audit", 2, at(8, 0));
        first.mark_exited(at(9, 30));
        let second = VisitorRecord::arrival(12, "Jo", "Delivery", 1, at(10, 15));

        let report = PeriodReport::new("Security", [&first, &second]);
        let lines = report.render();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Visitor report: Security");
        assert_eq!(lines[1], "ID  Visitor    Purpose     POC     In    Out");
        assert_eq!(lines[2], "7   Kim Reyes  Audit         2  08:00  09:30");
        assert_eq!(lines[3], "12  Jo         Delivery      1  10:15      -");
        assert_eq!(lines[4], "2 visitor(s), 1 still in building");
    }

    #[test]
    fn test_empty_report() {
        let report = PeriodReport::new("Ada Park", std::iter::empty());
        let lines = report.render();

        assert_eq!(report.still_inside(), 0);
        assert_eq!(lines.last().unwrap(), "0 visitor(s), 0 still in building");
    }

    #[test]
    fn test_report_serializes_rows() {
        let record = VisitorRecord::arrival(3, "Lee", "Tour", 1, at(13, 0));
        let report = PeriodReport::new("Ada Park", [&record]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["audience"], "Ada Park");
        assert_eq!(json["rows"][0]["visitor_id"], 3);
        assert!(json["rows"][0]["exit_time"].is_null());
    }
}
