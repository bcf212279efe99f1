use crate::models::{DbClient, DbMaster, DbService};
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

// Masters

pub async fn create_master(
    pool: &Pool<Postgres>,
    name: &str,
    break_minutes: i32,
) -> Result<DbMaster> {
    let master = sqlx::query_as::<_, DbMaster>(
        r#"
        INSERT INTO masters (id, name, is_active, break_minutes, created_at)
        VALUES ($1, $2, TRUE, $3, $4)
        RETURNING id, name, is_active, break_minutes, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(break_minutes)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    tracing::debug!("Master created: id={}, name={}", master.id, master.name);
    Ok(master)
}

pub async fn get_master_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbMaster>> {
    let master = sqlx::query_as::<_, DbMaster>(
        r#"
        SELECT id, name, is_active, break_minutes, created_at
        FROM masters
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(master)
}

// Services

pub async fn create_service(
    pool: &Pool<Postgres>,
    name: &str,
    duration_minutes: i32,
    price: i64,
) -> Result<DbService> {
    let service = sqlx::query_as::<_, DbService>(
        r#"
        INSERT INTO services (id, name, duration_minutes, price, is_active, created_at)
        VALUES ($1, $2, $3, $4, TRUE, $5)
        RETURNING id, name, duration_minutes, price, is_active, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(duration_minutes)
    .bind(price)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(service)
}

pub async fn get_service_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbService>> {
    let service = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, name, duration_minutes, price, is_active, created_at
        FROM services
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(service)
}

// Clients

pub async fn create_client(
    pool: &Pool<Postgres>,
    name: &str,
    telegram_id: Option<i64>,
) -> Result<DbClient> {
    let client = sqlx::query_as::<_, DbClient>(
        r#"
        INSERT INTO clients (id, name, telegram_id, created_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (telegram_id)
        DO UPDATE SET name = $2
        RETURNING id, name, telegram_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(telegram_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(client)
}

pub async fn get_client_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbClient>> {
    let client = sqlx::query_as::<_, DbClient>(
        r#"
        SELECT id, name, telegram_id, created_at
        FROM clients
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(client)
}
