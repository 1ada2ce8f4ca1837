//! Concurrency test for the booking transaction: with office capacity N,
//! N+2 simultaneous bookings for the same slot must yield exactly N
//! appointments and reject the rest, never overcommitting the office.

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::America::Mexico_City;
use citaflow_scheduling::booking::{BookingError, BookingRequest};
use citaflow_scheduling::clock::FixedClock;
use citaflow_scheduling::models::{Client, Office, OfficeService, Service, WeekdayMask};
use citaflow_scheduling::{InMemoryStore, SchedulingEngine, SchedulingSettings};
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;

const CAPACITY: u32 = 3;
const CONTENDERS: u32 = CAPACITY + 2;

fn settings() -> SchedulingSettings {
    SchedulingSettings {
        time_zone: Mexico_City,
        horizon_days: 90,
        default_pending_limit: 3,
        default_open_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        default_close_time: NaiveTime::from_hms_opt(16, 30, 0).unwrap(),
        cancel_lead: Duration::hours(24),
        attendance_code_length: 6,
        notes_max_len: 1000,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_never_exceed_office_capacity() {
    let store = InMemoryStore::new();
    let office = Office {
        id: Uuid::new_v4(),
        code: "OF1".to_string(),
        description: "Central office".to_string(),
        capacity: CAPACITY,
        is_active: true,
    };
    let service = Service {
        id: Uuid::new_v4(),
        code: "SV1".to_string(),
        description: "Document certification".to_string(),
        duration_minutes: 30,
        open_time: None,
        close_time: None,
        weekdays: WeekdayMask::business_week(),
        document_limit: 5,
        is_active: true,
    };
    store.add_office(office.clone());
    store.add_service(service.clone());
    store.add_office_service(OfficeService {
        id: Uuid::new_v4(),
        office_id: office.id,
        service_id: service.id,
        is_active: true,
    });

    let mut clients = Vec::new();
    for i in 0..CONTENDERS {
        let client = Client {
            id: Uuid::new_v4(),
            name: format!("Client {i}"),
            email: format!("client{i}@example.net"),
            pending_limit: 0,
            is_active: true,
        };
        store.add_client(client.clone());
        clients.push(client);
    }

    // Tuesday 2026-09-01 07:00 local.
    let now_local = NaiveDate::from_ymd_opt(2026, 9, 1)
        .unwrap()
        .and_hms_opt(7, 0, 0)
        .unwrap();
    let clock = FixedClock(
        Mexico_City
            .from_local_datetime(&now_local)
            .single()
            .unwrap()
            .with_timezone(&Utc),
    );
    let engine = Arc::new(SchedulingEngine::new(
        Arc::new(store.clone()),
        Arc::new(clock),
        None,
        settings(),
    ));

    // Everyone races for the same slot: Tuesday 2026-09-15 at 09:00.
    let mut tasks = JoinSet::new();
    for client in clients {
        let engine = engine.clone();
        tasks.spawn(async move {
            engine
                .book(
                    &client,
                    BookingRequest {
                        office_code: "OF1".to_string(),
                        service_code: "SV1".to_string(),
                        date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
                        time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                        notes: String::new(),
                    },
                )
                .await
        });
    }

    let mut booked = 0u32;
    let mut rejected = 0u32;
    while let Some(result) = tasks.join_next().await {
        match result.expect("booking task panicked") {
            Ok(_) => booked += 1,
            Err(BookingError::OfficeFull) => rejected += 1,
            Err(other) => panic!("unexpected booking failure: {other}"),
        }
    }

    assert_eq!(booked, CAPACITY);
    assert_eq!(rejected, CONTENDERS - CAPACITY);

    // The persisted occupancy agrees with the accepted count.
    let slots = engine
        .list_available_slots("OF1", "SV1", NaiveDate::from_ymd_opt(2026, 9, 15).unwrap())
        .await
        .unwrap();
    assert!(!slots.contains(&NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
}
