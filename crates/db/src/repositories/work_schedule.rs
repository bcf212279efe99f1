use crate::models::{DbScheduleException, DbWorkSchedule};
use chrono::NaiveDate;
use eyre::Result;
use salon_core::models::work_schedule::{ScheduleException, WorkSchedule, weekday_number};
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

// Weekly schedule

pub async fn get_work_schedule_for_day(
    pool: &Pool<Postgres>,
    master_id: Uuid,
    day_of_week: i16,
) -> Result<Option<DbWorkSchedule>> {
    let row = sqlx::query_as::<_, DbWorkSchedule>(
        r#"
        SELECT id, master_id, day_of_week, start_time, end_time, is_active
        FROM work_schedules
        WHERE master_id = $1 AND day_of_week = $2
        "#,
    )
    .bind(master_id)
    .bind(day_of_week)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn list_work_schedule(
    pool: &Pool<Postgres>,
    master_id: Uuid,
) -> Result<Vec<DbWorkSchedule>> {
    let rows = sqlx::query_as::<_, DbWorkSchedule>(
        r#"
        SELECT id, master_id, day_of_week, start_time, end_time, is_active
        FROM work_schedules
        WHERE master_id = $1
        ORDER BY day_of_week ASC
        "#,
    )
    .bind(master_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes every weekly row of the master and inserts `rows`.
/// Run inside a transaction.
pub async fn replace_work_schedule(
    conn: &mut PgConnection,
    master_id: Uuid,
    rows: &[WorkSchedule],
) -> Result<Vec<DbWorkSchedule>> {
    tracing::debug!(
        "Replacing work schedule: master_id={}, rows={}",
        master_id,
        rows.len()
    );
    sqlx::query("DELETE FROM work_schedules WHERE master_id = $1")
        .bind(master_id)
        .execute(&mut *conn)
        .await?;

    let mut saved = Vec::with_capacity(rows.len());
    for row in rows {
        let inserted = sqlx::query_as::<_, DbWorkSchedule>(
            r#"
            INSERT INTO work_schedules (id, master_id, day_of_week, start_time, end_time, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, master_id, day_of_week, start_time, end_time, is_active
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(master_id)
        .bind(weekday_number(row.day_of_week))
        .bind(row.start_time)
        .bind(row.end_time)
        .bind(row.is_active)
        .fetch_one(&mut *conn)
        .await?;
        saved.push(inserted);
    }

    saved.sort_by_key(|row| row.day_of_week);
    Ok(saved)
}

// Exceptions

pub async fn get_exception(
    pool: &Pool<Postgres>,
    master_id: Uuid,
    date: NaiveDate,
) -> Result<Option<DbScheduleException>> {
    let row = sqlx::query_as::<_, DbScheduleException>(
        r#"
        SELECT id, master_id, date, is_day_off, start_time, end_time
        FROM schedule_exceptions
        WHERE master_id = $1 AND date = $2
        "#,
    )
    .bind(master_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn list_exceptions(
    pool: &Pool<Postgres>,
    master_id: Uuid,
) -> Result<Vec<DbScheduleException>> {
    let rows = sqlx::query_as::<_, DbScheduleException>(
        r#"
        SELECT id, master_id, date, is_day_off, start_time, end_time
        FROM schedule_exceptions
        WHERE master_id = $1
        ORDER BY date ASC
        "#,
    )
    .bind(master_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes every exception of the master and inserts `rows`.
/// Run inside a transaction.
pub async fn replace_exceptions(
    conn: &mut PgConnection,
    master_id: Uuid,
    rows: &[ScheduleException],
) -> Result<Vec<DbScheduleException>> {
    tracing::debug!(
        "Replacing schedule exceptions: master_id={}, rows={}",
        master_id,
        rows.len()
    );
    sqlx::query("DELETE FROM schedule_exceptions WHERE master_id = $1")
        .bind(master_id)
        .execute(&mut *conn)
        .await?;

    let mut saved = Vec::with_capacity(rows.len());
    for row in rows {
        let inserted = sqlx::query_as::<_, DbScheduleException>(
            r#"
            INSERT INTO schedule_exceptions (id, master_id, date, is_day_off, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, master_id, date, is_day_off, start_time, end_time
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(master_id)
        .bind(row.date)
        .bind(row.is_day_off)
        .bind(row.start_time)
        .bind(row.end_time)
        .fetch_one(&mut *conn)
        .await?;
        saved.push(inserted);
    }

    saved.sort_by_key(|row| row.date);
    Ok(saved)
}
