#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use mockall::mock;
use std::sync::Arc;
use uuid::Uuid;

use salon_core::booking::{BookingService, BookingSettings};
use salon_core::clock::FixedClock;
use salon_core::models::{
    catalog::{ClientContact, Master, Service},
    work_schedule::WorkSchedule,
};
use salon_core::notify::{LogNotifier, Notification, Notifier};
use salon_core::store::memory::InMemoryStore;

mock! {
    pub Messenger {}
    impl Notifier for Messenger {
        fn dispatch(&self, notification: Notification);
    }
}

/// 2030-01-07, a Monday.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// UTC instant on the test Monday.
pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 7, h, m, 0).unwrap()
}

pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<FixedClock>,
    pub master: Master,
    pub service: Service,
    pub client_id: Uuid,
}

impl Fixture {
    /// One master working Mondays 09:00-18:00 UTC, one 60 minute service,
    /// clock set to the Sunday before.
    pub async fn new() -> Self {
        Self::with_break(0).await
    }

    pub async fn with_break(break_minutes: i32) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let master = Master {
            id: Uuid::new_v4(),
            name: "Anna".to_string(),
            is_active: true,
            break_minutes,
        };
        let service = Service {
            id: Uuid::new_v4(),
            name: "Lash extension".to_string(),
            duration_minutes: 60,
            price: 2500,
            is_active: true,
        };
        let client_id = Uuid::new_v4();

        store.add_master(master.clone()).await;
        store.add_service(service.clone()).await;
        store
            .add_client(ClientContact {
                id: client_id,
                name: "Olga".to_string(),
                telegram_id: Some(42),
            })
            .await;
        store
            .add_work_schedule(
                WorkSchedule::new(master.id, Weekday::Mon, hm(9, 0), hm(18, 0)).unwrap(),
            )
            .await;

        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2030, 1, 6, 12, 0, 0).unwrap(),
        ));

        Self {
            store,
            clock,
            master,
            service,
            client_id,
        }
    }

    pub fn settings() -> BookingSettings {
        BookingSettings {
            slot_step: chrono::Duration::minutes(30),
            timezone: chrono_tz::UTC,
        }
    }

    pub fn service(&self) -> BookingService {
        self.service_with(Arc::new(LogNotifier))
    }

    pub fn service_with(&self, notifier: Arc<dyn Notifier>) -> BookingService {
        BookingService::new(
            self.store.clone(),
            self.store.clone(),
            notifier,
            self.clock.clone(),
            Self::settings(),
        )
    }
}
