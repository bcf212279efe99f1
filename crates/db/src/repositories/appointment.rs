use crate::models::DbAppointment;
use chrono::{DateTime, Utc};
use eyre::Result;
use salon_core::models::appointment::{AppointmentStatus, NewAppointment, NewTimes};
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

const COLUMNS: &str = "id, client_id, master_id, service_id, start_time, end_time, blocked_until, \
     status, price, bonus_points_used, bonus_points_earned, discount, notes, \
     cancellation_reason, created_at, updated_at";

pub async fn get_appointment_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        "SELECT {COLUMNS} FROM appointments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

/// Non-cancelled appointments of a master whose `[start_time, blocked_until)`
/// intersects `[from, to)`.
pub async fn list_occupying(
    pool: &Pool<Postgres>,
    master_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> Result<Vec<DbAppointment>> {
    tracing::debug!(
        "Listing occupying appointments: master_id={}, from={}, to={}",
        master_id,
        from,
        to
    );
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM appointments
        WHERE master_id = $1
          AND status <> 'cancelled'
          AND start_time < $3
          AND blocked_until > $2
          AND ($4::uuid IS NULL OR id <> $4)
        ORDER BY start_time ASC
        "#
    ))
    .bind(master_id)
    .bind(from)
    .bind(to)
    .bind(exclude)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn list_by_client(
    pool: &Pool<Postgres>,
    client_id: Uuid,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        "SELECT {COLUMNS} FROM appointments WHERE client_id = $1 ORDER BY start_time ASC"
    ))
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn list_by_master(
    pool: &Pool<Postgres>,
    master_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM appointments
        WHERE master_id = $1 AND start_time >= $2 AND start_time < $3
        ORDER BY start_time ASC
        "#
    ))
    .bind(master_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Fails with the `appointments_no_overlap` exclusion violation when the
/// slot is already taken.
pub async fn insert_appointment(
    conn: &mut PgConnection,
    new: &NewAppointment,
) -> Result<DbAppointment> {
    tracing::debug!(
        "Inserting appointment: id={}, master_id={}, start={}",
        new.id,
        new.master_id,
        new.start_time
    );
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments (
            id, client_id, master_id, service_id, start_time, end_time, blocked_until,
            status, price, notes, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(new.id)
    .bind(new.client_id)
    .bind(new.master_id)
    .bind(new.service_id)
    .bind(new.start_time)
    .bind(new.end_time)
    .bind(new.blocked_until)
    .bind(AppointmentStatus::Pending.as_str())
    .bind(new.price)
    .bind(&new.notes)
    .bind(new.created_at)
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!("Appointment inserted: id={}", appointment.id);
    Ok(appointment)
}

/// Returns `None` when no row with `id` is in `expected` status.
pub async fn update_times(
    conn: &mut PgConnection,
    id: Uuid,
    expected: AppointmentStatus,
    times: &NewTimes,
    status: AppointmentStatus,
    updated_at: DateTime<Utc>,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET start_time = $3, end_time = $4, blocked_until = $5, status = $6, updated_at = $7
        WHERE id = $1 AND status = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(expected.as_str())
    .bind(times.start_time)
    .bind(times.end_time)
    .bind(times.blocked_until)
    .bind(status.as_str())
    .bind(updated_at)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(appointment)
}

/// Returns `None` when no row with `id` is in `expected` status.
/// A `None` reason leaves the stored reason untouched.
pub async fn update_status(
    conn: &mut PgConnection,
    id: Uuid,
    expected: AppointmentStatus,
    status: AppointmentStatus,
    cancellation_reason: Option<&str>,
    updated_at: DateTime<Utc>,
) -> Result<Option<DbAppointment>> {
    tracing::debug!("Updating appointment status: id={}, {} -> {}", id, expected, status);
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET status = $3,
            cancellation_reason = COALESCE($4, cancellation_reason),
            updated_at = $5
        WHERE id = $1 AND status = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(expected.as_str())
    .bind(status.as_str())
    .bind(cancellation_reason)
    .bind(updated_at)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(appointment)
}
