use crate::models::DbAppointmentHistory;
use eyre::Result;
use salon_core::models::appointment::AppointmentHistoryEntry;
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

pub async fn insert_history_entry(
    conn: &mut PgConnection,
    entry: &AppointmentHistoryEntry,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO appointment_history (
            id, appointment_id, from_status, to_status, previous_start, previous_end,
            actor_id, note, recorded_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(entry.id)
    .bind(entry.appointment_id)
    .bind(entry.from_status.map(|s| s.as_str()))
    .bind(entry.to_status.as_str())
    .bind(entry.previous_start)
    .bind(entry.previous_end)
    .bind(entry.actor_id)
    .bind(&entry.note)
    .bind(entry.recorded_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn list_history(
    pool: &Pool<Postgres>,
    appointment_id: Uuid,
) -> Result<Vec<DbAppointmentHistory>> {
    let entries = sqlx::query_as::<_, DbAppointmentHistory>(
        r#"
        SELECT id, appointment_id, from_status, to_status, previous_start, previous_end,
               actor_id, note, recorded_at
        FROM appointment_history
        WHERE appointment_id = $1
        ORDER BY recorded_at ASC, id ASC
        "#,
    )
    .bind(appointment_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}
