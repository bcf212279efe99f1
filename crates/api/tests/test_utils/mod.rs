#![allow(dead_code)]

use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestRequest, TestServer};
use chrono::{DateTime, NaiveTime, TimeZone, Utc, Weekday};
use std::sync::Arc;
use uuid::Uuid;

use salon_api::{ApiState, app};
use salon_core::booking::{BookingService, BookingSettings};
use salon_core::clock::FixedClock;
use salon_core::models::{
    actor::{Actor, ActorRole},
    catalog::{ClientContact, Master, Service},
    work_schedule::WorkSchedule,
};
use salon_core::notify::LogNotifier;
use salon_core::store::memory::InMemoryStore;

/// UTC instant on Monday 2030-01-07.
pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 7, h, m, 0).unwrap()
}

pub struct TestContext {
    pub server: TestServer,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<FixedClock>,
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub client: Actor,
    pub admin: Actor,
}

impl TestContext {
    /// A master working Mondays 09:00-18:00 UTC with one 60 minute service.
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let master_id = Uuid::new_v4();
        let service_id = Uuid::new_v4();
        let client = Actor::client(Uuid::new_v4());

        store
            .add_master(Master {
                id: master_id,
                name: "Anna".to_string(),
                is_active: true,
                break_minutes: 0,
            })
            .await;
        store
            .add_service(Service {
                id: service_id,
                name: "Haircut".to_string(),
                duration_minutes: 60,
                price: 1800,
                is_active: true,
            })
            .await;
        store
            .add_client(ClientContact {
                id: client.id,
                name: "Olga".to_string(),
                telegram_id: None,
            })
            .await;
        store
            .add_work_schedule(
                WorkSchedule::new(
                    master_id,
                    Weekday::Mon,
                    NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                )
                .unwrap(),
            )
            .await;

        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2030, 1, 6, 12, 0, 0).unwrap(),
        ));
        let bookings = BookingService::new(
            store.clone(),
            store.clone(),
            Arc::new(LogNotifier),
            clock.clone(),
            BookingSettings {
                slot_step: chrono::Duration::minutes(30),
                timezone: chrono_tz::UTC,
            },
        );

        let server = TestServer::new(app(ApiState::new(bookings))).unwrap();

        Self {
            server,
            store,
            clock,
            master_id,
            service_id,
            client,
            admin: Actor::admin(Uuid::new_v4()),
        }
    }
}

/// Adds the gateway identity headers for `actor`.
pub fn as_actor(request: TestRequest, actor: &Actor) -> TestRequest {
    let role = match actor.role {
        ActorRole::Client => "client",
        ActorRole::Admin => "admin",
    };
    request
        .add_header(
            HeaderName::from_static("x-actor-id"),
            HeaderValue::from_str(&actor.id.to_string()).unwrap(),
        )
        .add_header(
            HeaderName::from_static("x-actor-role"),
            HeaderValue::from_static(role),
        )
}
