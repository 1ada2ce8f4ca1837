#[cfg(test)]
mod tests {
    use crate::clock::FixedClock;
    use crate::engine::{SchedulingEngine, SchedulingSettings};
    use crate::handlers::CLIENT_ID_HEADER;
    use crate::models::{Client, Office, OfficeService, Service, WeekdayMask};
    use crate::routes::routes;
    use crate::store::memory::InMemoryStore;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
    use chrono_tz::America::Mexico_City;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

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

    fn seeded_router() -> (Router, Client) {
        let store = InMemoryStore::new();
        let office = Office {
            id: Uuid::new_v4(),
            code: "OF1".to_string(),
            description: "Central office".to_string(),
            capacity: 3,
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
        let client = Client {
            id: Uuid::new_v4(),
            name: "Ana Torres".to_string(),
            email: "ana@example.net".to_string(),
            pending_limit: 0,
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
        store.add_client(client.clone());

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
            Arc::new(store),
            Arc::new(clock),
            None,
            settings(),
        ));
        (routes(engine), client)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn available_days_and_slots_are_served() {
        let (router, _client) = seeded_router();

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/citas/available-days?office_code=OF1&service_code=SV1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["days"].as_array().is_some_and(|d| !d.is_empty()));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/citas/available-slots?office_code=OF1&service_code=SV1&date=2026-09-15")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let slots = body["slots"].as_array().unwrap();
        assert!(slots.contains(&json!("08:30")));
        assert!(slots.contains(&json!("09:00")));
    }

    #[tokio::test]
    async fn unknown_office_is_a_404() {
        let (router, _client) = seeded_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/citas/available-days?office_code=NOPE&service_code=SV1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn booking_requires_a_client_identity() {
        let (router, _client) = seeded_router();
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/citas/book")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "office_code": "OF1",
                            "service_code": "SV1",
                            "date": "2026-09-15",
                            "time": "09:00:00"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn book_then_cancel_round_trip() {
        let (router, client) = seeded_router();

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/citas/book")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(CLIENT_ID_HEADER, client.id.to_string())
                    .body(Body::from(
                        json!({
                            "office_code": "OF1",
                            "service_code": "SV1",
                            "date": "2026-09-15",
                            "time": "09:00:00",
                            "notes": "bring both copies"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["status"], json!("PENDING"));
        assert_eq!(created["can_still_cancel"], json!(true));
        let id = created["id"].as_str().unwrap().to_string();

        let response = router
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/citas/cancel/{id}"))
                    .header(CLIENT_ID_HEADER, client.id.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cancelled = body_json(response).await;
        assert_eq!(cancelled["status"], json!("CANCELLED"));
        assert_eq!(cancelled["can_still_cancel"], json!(false));
    }

    #[tokio::test]
    async fn remaining_reflects_pending_load() {
        let (router, client) = seeded_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/citas/remaining")
                    .header(CLIENT_ID_HEADER, client.id.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["remaining"], json!(3));
    }
}
