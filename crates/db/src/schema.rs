use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

/// Name of the exclusion constraint that keeps a master's bookings apart.
pub const NO_OVERLAP_CONSTRAINT: &str = "appointments_no_overlap";

const STATEMENTS: &[&str] = &[
    // Needed for `master_id WITH =` inside a GiST exclusion constraint
    "CREATE EXTENSION IF NOT EXISTS btree_gist",
    r#"
    CREATE TABLE IF NOT EXISTS masters (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name VARCHAR(255) NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        break_minutes INTEGER NOT NULL DEFAULT 0 CHECK (break_minutes >= 0),
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS services (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name VARCHAR(255) NOT NULL,
        duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
        price BIGINT NOT NULL CHECK (price >= 0),
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name VARCHAR(255) NOT NULL,
        telegram_id BIGINT UNIQUE,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS work_schedules (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        master_id UUID NOT NULL REFERENCES masters(id) ON DELETE CASCADE,
        day_of_week SMALLINT NOT NULL CHECK (day_of_week BETWEEN 1 AND 7),
        start_time TIME NOT NULL,
        end_time TIME NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        CONSTRAINT work_schedules_valid_hours CHECK (start_time < end_time),
        CONSTRAINT work_schedules_one_per_day UNIQUE (master_id, day_of_week)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS schedule_exceptions (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        master_id UUID NOT NULL REFERENCES masters(id) ON DELETE CASCADE,
        date DATE NOT NULL,
        is_day_off BOOLEAN NOT NULL DEFAULT FALSE,
        start_time TIME,
        end_time TIME,
        CONSTRAINT schedule_exceptions_valid_hours CHECK (
            is_day_off OR (start_time IS NOT NULL AND end_time IS NOT NULL AND start_time < end_time)
        ),
        CONSTRAINT schedule_exceptions_one_per_date UNIQUE (master_id, date)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS appointments (
        id UUID PRIMARY KEY,
        client_id UUID NOT NULL,
        master_id UUID NOT NULL REFERENCES masters(id),
        service_id UUID NOT NULL REFERENCES services(id),
        start_time TIMESTAMP WITH TIME ZONE NOT NULL,
        end_time TIMESTAMP WITH TIME ZONE NOT NULL,
        blocked_until TIMESTAMP WITH TIME ZONE NOT NULL,
        status VARCHAR(20) NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'confirmed', 'completed', 'cancelled', 'rescheduled')),
        price BIGINT NOT NULL,
        bonus_points_used INTEGER NOT NULL DEFAULT 0,
        bonus_points_earned INTEGER NOT NULL DEFAULT 0,
        discount BIGINT NOT NULL DEFAULT 0,
        notes TEXT,
        cancellation_reason TEXT,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT appointments_valid_time_range CHECK (end_time > start_time),
        CONSTRAINT appointments_valid_block CHECK (blocked_until >= end_time),
        CONSTRAINT appointments_no_overlap EXCLUDE USING gist (
            master_id WITH =,
            tstzrange(start_time, blocked_until, '[)') WITH &&
        ) WHERE (status <> 'cancelled')
    )
    "#,
    // Client ids come from the gateway; `clients` is a contact directory
    // filled by the Telegram side and may lag behind or never hold a caller.
    "ALTER TABLE appointments DROP CONSTRAINT IF EXISTS appointments_client_id_fkey",
    r#"
    CREATE TABLE IF NOT EXISTS appointment_history (
        id UUID PRIMARY KEY,
        appointment_id UUID NOT NULL REFERENCES appointments(id) ON DELETE CASCADE,
        from_status VARCHAR(20),
        to_status VARCHAR(20) NOT NULL,
        previous_start TIMESTAMP WITH TIME ZONE,
        previous_end TIMESTAMP WITH TIME ZONE,
        actor_id UUID,
        note TEXT,
        recorded_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    )
    "#,
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_appointments_master_start ON appointments(master_id, start_time)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_client_id ON appointments(client_id)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_status ON appointments(status)",
    "CREATE INDEX IF NOT EXISTS idx_schedule_exceptions_master_date ON schedule_exceptions(master_id, date)",
    "CREATE INDEX IF NOT EXISTS idx_appointment_history_appointment_id ON appointment_history(appointment_id)",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
