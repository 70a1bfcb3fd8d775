use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// The four timer kinds plus the four administrative day statuses. The
/// kebab-case form is what travels over the wire and what the `status`
/// column stores.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum EventKind {
    CheckIn,
    LunchOut,
    LunchIn,
    CheckOut,
    Present,
    Absent,
    Leave,
    HalfDay,
}

impl EventKind {
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Administrative kinds set the day status directly and never touch a
    /// time slot.
    pub fn is_administrative(&self) -> bool {
        matches!(
            self,
            EventKind::Present | EventKind::Absent | EventKind::Leave | EventKind::HalfDay
        )
    }
}

/// One stored attendance event row. Rows are append-only: repeated kinds on
/// the same (employee, date) produce additional rows, and `marked_at` plus
/// the insertion id define the fold order.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceEvent {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "2024-01-10", value_type = String, format = "date")]
    pub date: NaiveDate,

    /// The event kind tag, except that a check-out row is stored as
    /// `present`.
    #[schema(example = "check-in")]
    pub status: String,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_in_time: Option<NaiveDateTime>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub lunch_out_time: Option<NaiveDateTime>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub lunch_in_time: Option<NaiveDateTime>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out_time: Option<NaiveDateTime>,

    #[schema(example = "Checked in")]
    pub remarks: String,

    /// Actor email, or "system".
    #[schema(example = "admin@company.com")]
    pub marked_by: String,

    /// Server clock at recording time, never client input.
    #[schema(value_type = String, format = "date-time")]
    pub marked_at: NaiveDateTime,
}

/// A validated event, ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub employee_id: u64,
    pub date: NaiveDate,
    pub status: String,
    pub check_in_time: Option<NaiveDateTime>,
    pub lunch_out_time: Option<NaiveDateTime>,
    pub lunch_in_time: Option<NaiveDateTime>,
    pub check_out_time: Option<NaiveDateTime>,
    pub remarks: String,
    pub marked_by: String,
    pub marked_at: NaiveDateTime,
}

impl NewEvent {
    /// Builds the row for one recorded event. Only the slot matching a timer
    /// kind is populated; a check-out row is stored with status `present` so
    /// a completed day always reads back as present.
    pub fn build(
        employee_id: u64,
        date: NaiveDate,
        kind: EventKind,
        remarks: &str,
        marked_by: &str,
        now: NaiveDateTime,
    ) -> Self {
        let mut event = NewEvent {
            employee_id,
            date,
            status: kind.to_string(),
            check_in_time: None,
            lunch_out_time: None,
            lunch_in_time: None,
            check_out_time: None,
            remarks: remarks.trim().to_string(),
            marked_by: marked_by.to_string(),
            marked_at: now,
        };

        match kind {
            EventKind::CheckIn => event.check_in_time = Some(now),
            EventKind::LunchOut => event.lunch_out_time = Some(now),
            EventKind::LunchIn => event.lunch_in_time = Some(now),
            EventKind::CheckOut => {
                event.check_out_time = Some(now);
                // final status after checkout
                event.status = EventKind::Present.to_string();
            }
            _ => {}
        }

        event
    }
}

#[derive(Debug, derive_more::Display)]
pub enum RecordError {
    #[display(fmt = "Date must be in YYYY-MM-DD format")]
    InvalidDate,
    #[display(
        fmt = "Invalid status. Must be one of: check-in, check-out, lunch-out, lunch-in, present, absent, leave, half-day"
    )]
    InvalidKind,
    #[display(fmt = "{}", _0)]
    Db(sqlx::Error),
}

/// Validates and appends one attendance event row.
pub async fn record_event(
    pool: &MySqlPool,
    employee_id: u64,
    date: &str,
    kind: &str,
    remarks: &str,
    marked_by: &str,
) -> Result<AttendanceEvent, RecordError> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| RecordError::InvalidDate)?;
    let kind = EventKind::parse(kind).ok_or(RecordError::InvalidKind)?;

    let event = NewEvent::build(
        employee_id,
        date,
        kind,
        remarks,
        marked_by,
        Utc::now().naive_utc(),
    );

    let result = sqlx::query(
        r#"
        INSERT INTO attendance
        (employee_id, date, status, check_in_time, lunch_out_time, lunch_in_time, check_out_time, remarks, marked_by, marked_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(event.employee_id)
    .bind(event.date)
    .bind(&event.status)
    .bind(event.check_in_time)
    .bind(event.lunch_out_time)
    .bind(event.lunch_in_time)
    .bind(event.check_out_time)
    .bind(&event.remarks)
    .bind(&event.marked_by)
    .bind(event.marked_at)
    .execute(pool)
    .await
    .map_err(RecordError::Db)?;

    Ok(AttendanceEvent {
        id: result.last_insert_id(),
        employee_id: event.employee_id,
        date: event.date,
        status: event.status,
        check_in_time: event.check_in_time,
        lunch_out_time: event.lunch_out_time,
        lunch_in_time: event.lunch_in_time,
        check_out_time: event.check_out_time,
        remarks: event.remarks,
        marked_by: event.marked_by,
        marked_at: event.marked_at,
    })
}

/// The per-day summary derived by folding that day's rows. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ConsolidatedDay {
    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "2024-01-10", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_in_time: Option<NaiveDateTime>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub lunch_out_time: Option<NaiveDateTime>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub lunch_in_time: Option<NaiveDateTime>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out_time: Option<NaiveDateTime>,

    #[schema(example = "present")]
    pub status: String,
}

/// Folds one day's rows, ordered by (marked_at, id) ascending, into a single
/// consolidated view. A check-in is the only event that flips the overall
/// status to present; check-out rows already carry `present` from record
/// time, so a check-in landing after a check-out cannot undo it.
pub fn consolidate(
    employee_id: u64,
    date: NaiveDate,
    events: &[AttendanceEvent],
) -> ConsolidatedDay {
    let mut day = ConsolidatedDay {
        employee_id,
        date,
        check_in_time: None,
        lunch_out_time: None,
        lunch_in_time: None,
        check_out_time: None,
        status: EventKind::Absent.to_string(),
    };

    for event in events {
        if let Some(t) = event.check_in_time {
            day.check_in_time = Some(t);
            day.status = EventKind::Present.to_string();
        }
        if let Some(t) = event.lunch_out_time {
            day.lunch_out_time = Some(t);
        }
        if let Some(t) = event.lunch_in_time {
            day.lunch_in_time = Some(t);
        }
        if let Some(t) = event.check_out_time {
            day.check_out_time = Some(t);
        }
    }

    day
}

/// Count breakdown by stored status over a record set.
#[derive(Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct AttendanceStats {
    #[schema(example = 20)]
    pub total: usize,
    #[schema(example = 15)]
    pub present: usize,
    #[schema(example = 2)]
    pub absent: usize,
    #[schema(example = 2)]
    pub leave: usize,
    #[schema(example = 1)]
    pub half_day: usize,
}

pub fn attendance_stats(records: &[AttendanceEvent]) -> AttendanceStats {
    let count = |kind: EventKind| {
        records
            .iter()
            .filter(|r| r.status == kind.to_string())
            .count()
    };

    AttendanceStats {
        total: records.len(),
        present: count(EventKind::Present),
        absent: count(EventKind::Absent),
        leave: count(EventKind::Leave),
        half_day: count(EventKind::HalfDay),
    }
}

/// One employee's rows for one date, in fold order.
pub async fn events_for_day(
    pool: &MySqlPool,
    employee_id: u64,
    date: NaiveDate,
) -> sqlx::Result<Vec<AttendanceEvent>> {
    sqlx::query_as::<_, AttendanceEvent>(
        r#"
        SELECT id, employee_id, date, status, check_in_time, lunch_out_time, lunch_in_time, check_out_time, remarks, marked_by, marked_at
        FROM attendance
        WHERE employee_id = ? AND date = ?
        ORDER BY marked_at ASC, id ASC
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .fetch_all(pool)
    .await
}

pub async fn events_by_employee(
    pool: &MySqlPool,
    employee_id: u64,
) -> sqlx::Result<Vec<AttendanceEvent>> {
    sqlx::query_as::<_, AttendanceEvent>(
        r#"
        SELECT id, employee_id, date, status, check_in_time, lunch_out_time, lunch_in_time, check_out_time, remarks, marked_by, marked_at
        FROM attendance
        WHERE employee_id = ?
        ORDER BY date DESC, marked_at DESC
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await
}

pub async fn events_by_date(
    pool: &MySqlPool,
    date: NaiveDate,
) -> sqlx::Result<Vec<AttendanceEvent>> {
    sqlx::query_as::<_, AttendanceEvent>(
        r#"
        SELECT id, employee_id, date, status, check_in_time, lunch_out_time, lunch_in_time, check_out_time, remarks, marked_by, marked_at
        FROM attendance
        WHERE date = ?
        ORDER BY marked_at DESC
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await
}

/// Records in an optional open-ended date range, optionally filtered to one
/// employee. Newest first.
pub async fn events_in_range(
    pool: &MySqlPool,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    employee_id: Option<u64>,
) -> sqlx::Result<Vec<AttendanceEvent>> {
    let mut conditions = Vec::new();
    if start_date.is_some() {
        conditions.push("date >= ?");
    }
    if end_date.is_some() {
        conditions.push("date <= ?");
    }
    if employee_id.is_some() {
        conditions.push("employee_id = ?");
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT id, employee_id, date, status, check_in_time, lunch_out_time, lunch_in_time, check_out_time, remarks, marked_by, marked_at \
         FROM attendance {} ORDER BY date DESC, marked_at DESC",
        where_clause
    );

    let mut query = sqlx::query_as::<_, AttendanceEvent>(&sql);
    if let Some(start) = start_date {
        query = query.bind(start);
    }
    if let Some(end) = end_date {
        query = query.bind(end);
    }
    if let Some(id) = employee_id {
        query = query.bind(id);
    }

    query.fetch_all(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        date().and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
    }

    fn stored(id: u64, kind: EventKind, when: NaiveDateTime) -> AttendanceEvent {
        let new = NewEvent::build(7, date(), kind, "", "e@company.com", when);
        AttendanceEvent {
            id,
            employee_id: new.employee_id,
            date: new.date,
            status: new.status,
            check_in_time: new.check_in_time,
            lunch_out_time: new.lunch_out_time,
            lunch_in_time: new.lunch_in_time,
            check_out_time: new.check_out_time,
            remarks: new.remarks,
            marked_by: new.marked_by,
            marked_at: new.marked_at,
        }
    }

    #[test]
    fn kind_parses_wire_tags() {
        assert_eq!(EventKind::parse("check-in"), Some(EventKind::CheckIn));
        assert_eq!(EventKind::parse("lunch-out"), Some(EventKind::LunchOut));
        assert_eq!(EventKind::parse("half-day"), Some(EventKind::HalfDay));
        assert_eq!(EventKind::parse("bogus"), None);
        assert_eq!(EventKind::parse(""), None);
    }

    #[test]
    fn timer_kind_fills_only_its_slot() {
        let event = NewEvent::build(7, date(), EventKind::CheckIn, "morning", "e@co", at(9, 0));
        assert_eq!(event.status, "check-in");
        assert_eq!(event.check_in_time, Some(at(9, 0)));
        assert!(event.lunch_out_time.is_none());
        assert!(event.lunch_in_time.is_none());
        assert!(event.check_out_time.is_none());

        let event = NewEvent::build(7, date(), EventKind::LunchOut, "", "e@co", at(12, 30));
        assert_eq!(event.status, "lunch-out");
        assert_eq!(event.lunch_out_time, Some(at(12, 30)));
        assert!(event.check_in_time.is_none());
    }

    #[test]
    fn check_out_normalizes_status_to_present() {
        let event = NewEvent::build(7, date(), EventKind::CheckOut, "", "e@co", at(18, 0));
        assert_eq!(event.status, "present");
        assert_eq!(event.check_out_time, Some(at(18, 0)));
    }

    #[test]
    fn administrative_kind_sets_status_without_slots() {
        let event = NewEvent::build(7, date(), EventKind::Absent, "sick", "admin@co", at(8, 0));
        assert_eq!(event.status, "absent");
        assert_eq!(event.remarks, "sick");
        assert!(event.check_in_time.is_none());
        assert!(event.check_out_time.is_none());
    }

    #[test]
    fn remarks_are_trimmed() {
        let event = NewEvent::build(7, date(), EventKind::Leave, "  vacation  ", "a@co", at(8, 0));
        assert_eq!(event.remarks, "vacation");
    }

    #[test]
    fn consolidate_empty_day_is_absent() {
        let day = consolidate(7, date(), &[]);
        assert_eq!(day.status, "absent");
        assert!(day.check_in_time.is_none());
        assert!(day.check_out_time.is_none());
    }

    #[test]
    fn consolidate_full_day_round_trip() {
        let events = vec![
            stored(1, EventKind::CheckIn, at(9, 0)),
            stored(2, EventKind::CheckOut, at(18, 0)),
        ];

        let day = consolidate(7, date(), &events);
        assert_eq!(day.status, "present");
        assert_eq!(day.check_in_time, Some(at(9, 0)));
        assert_eq!(day.check_out_time, Some(at(18, 0)));
        assert!(day.lunch_out_time.is_none());
        assert!(day.lunch_in_time.is_none());
    }

    #[test]
    fn consolidate_tracks_all_four_slots() {
        let events = vec![
            stored(1, EventKind::CheckIn, at(9, 0)),
            stored(2, EventKind::LunchOut, at(12, 30)),
            stored(3, EventKind::LunchIn, at(13, 15)),
            stored(4, EventKind::CheckOut, at(18, 0)),
        ];

        let day = consolidate(7, date(), &events);
        assert_eq!(day.status, "present");
        assert_eq!(day.lunch_out_time, Some(at(12, 30)));
        assert_eq!(day.lunch_in_time, Some(at(13, 15)));
    }

    #[test]
    fn late_check_in_cannot_undo_check_out_status() {
        // A check-in recorded after the check-out (forgotten morning badge,
        // entered later) must leave the day present.
        let events = vec![
            stored(1, EventKind::CheckOut, at(18, 0)),
            stored(2, EventKind::CheckIn, at(18, 5)),
        ];

        let day = consolidate(7, date(), &events);
        assert_eq!(day.status, "present");
        assert_eq!(day.check_in_time, Some(at(18, 5)));
        assert_eq!(day.check_out_time, Some(at(18, 0)));
    }

    #[test]
    fn duplicate_kinds_keep_the_latest_slot() {
        let events = vec![
            stored(1, EventKind::CheckIn, at(9, 0)),
            stored(2, EventKind::CheckIn, at(9, 45)),
        ];

        let day = consolidate(7, date(), &events);
        assert_eq!(day.check_in_time, Some(at(9, 45)));
    }

    #[test]
    fn stats_count_by_stored_status() {
        let records = vec![
            stored(1, EventKind::Absent, at(8, 0)),
            stored(2, EventKind::Present, at(8, 0)),
            stored(3, EventKind::Leave, at(8, 0)),
            stored(4, EventKind::HalfDay, at(8, 0)),
            // check-out rows are stored as present
            stored(5, EventKind::CheckOut, at(18, 0)),
        ];

        let stats = attendance_stats(&records);
        assert_eq!(
            stats,
            AttendanceStats {
                total: 5,
                present: 2,
                absent: 1,
                leave: 1,
                half_day: 1,
            }
        );
    }

    #[test]
    fn single_absent_mark_aggregates_to_one() {
        let records = vec![stored(1, EventKind::Absent, at(8, 0))];
        let stats = attendance_stats(&records);
        assert_eq!(stats.absent, 1);
        assert_eq!(stats.present, 0);
        assert_eq!(stats.total, 1);
    }
}
