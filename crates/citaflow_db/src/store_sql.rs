//! SQL implementation of the scheduling store.
//!
//! One method per trait operation, manual row mapping throughout. Booking
//! serialization uses a session-level Postgres advisory lock keyed on
//! (office, date); the guard holds its pooled connection until drop so the
//! lock lives exactly as long as the booking's check-and-insert section.

use crate::error::DbError;
use crate::DbClient;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use citaflow_scheduling::models::{
    Appointment, AppointmentStatus, BlockedHour, Client, Office, OfficeService, Service,
    WeekdayMask,
};
use citaflow_scheduling::store::{BookingLock, NewAppointment, SchedulingStore, StoreError};
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SqlSchedulingStore {
    client: DbClient,
}

impl SqlSchedulingStore {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }
}

fn db(err: sqlx::Error) -> StoreError {
    StoreError::from(DbError::SqlxError(err))
}

fn to_u32(value: i32, column: &str) -> Result<u32, StoreError> {
    u32::try_from(value)
        .map_err(|_| StoreError::from(DbError::RowError(format!("negative {column}: {value}"))))
}

fn office_from_row(row: &PgRow) -> Result<Office, StoreError> {
    Ok(Office {
        id: row.try_get("id").map_err(db)?,
        code: row.try_get("code").map_err(db)?,
        description: row.try_get("description").map_err(db)?,
        capacity: to_u32(row.try_get("capacity").map_err(db)?, "capacity")?,
        is_active: row.try_get("is_active").map_err(db)?,
    })
}

fn service_from_row(row: &PgRow) -> Result<Service, StoreError> {
    let weekdays_raw: String = row.try_get("weekdays").map_err(db)?;
    let weekdays: WeekdayMask = weekdays_raw
        .trim()
        .parse()
        .map_err(|e: String| StoreError::from(DbError::RowError(e)))?;
    Ok(Service {
        id: row.try_get("id").map_err(db)?,
        code: row.try_get("code").map_err(db)?,
        description: row.try_get("description").map_err(db)?,
        duration_minutes: to_u32(
            row.try_get("duration_minutes").map_err(db)?,
            "duration_minutes",
        )?,
        open_time: row.try_get("open_time").map_err(db)?,
        close_time: row.try_get("close_time").map_err(db)?,
        weekdays,
        document_limit: to_u32(row.try_get("document_limit").map_err(db)?, "document_limit")?,
        is_active: row.try_get("is_active").map_err(db)?,
    })
}

fn appointment_from_row(row: &PgRow) -> Result<Appointment, StoreError> {
    let status_raw: String = row.try_get("status").map_err(db)?;
    let status: AppointmentStatus = status_raw
        .parse()
        .map_err(|e: String| StoreError::from(DbError::RowError(e)))?;
    Ok(Appointment {
        id: row.try_get("id").map_err(db)?,
        client_id: row.try_get("client_id").map_err(db)?,
        service_id: row.try_get("service_id").map_err(db)?,
        office_id: row.try_get("office_id").map_err(db)?,
        start: row.try_get("starts_at").map_err(db)?,
        end: row.try_get("ends_at").map_err(db)?,
        notes: row.try_get("notes").map_err(db)?,
        status,
        attended: row.try_get("attended").map_err(db)?,
        attendance_code: row.try_get("attendance_code").map_err(db)?,
        cancel_before: row.try_get("cancel_before").map_err(db)?,
        created_at: row.try_get("created_at").map_err(db)?,
        is_active: row.try_get("is_active").map_err(db)?,
    })
}

/// Advisory-lock key for one (office, date) booking window.
fn booking_window_key(office_id: Uuid, date: NaiveDate) -> i64 {
    let mut hasher = DefaultHasher::new();
    office_id.hash(&mut hasher);
    date.hash(&mut hasher);
    hasher.finish() as i64
}

/// Holds a pooled connection owning a session-level advisory lock. Dropping
/// the guard unlocks asynchronously and returns the connection to the pool.
struct AdvisoryLockGuard {
    conn: Option<PoolConnection<Postgres>>,
    key: i64,
}

impl Drop for AdvisoryLockGuard {
    fn drop(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };
        let key = self.key;
        tokio::spawn(async move {
            if let Err(err) = sqlx::query("SELECT pg_advisory_unlock($1)")
                .bind(key)
                .execute(&mut *conn)
                .await
            {
                // The connection is dropped (not returned) on failure, which
                // releases the session lock anyway.
                warn!("failed to release booking advisory lock {key}: {err}");
            }
        });
    }
}

#[async_trait]
impl SchedulingStore for SqlSchedulingStore {
    async fn find_office_by_code(&self, code: &str) -> Result<Option<Office>, StoreError> {
        let row = sqlx::query(
            "SELECT id, code, description, capacity, is_active FROM offices WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(self.client.pool())
        .await
        .map_err(db)?;
        row.as_ref().map(office_from_row).transpose()
    }

    async fn find_service_by_code(&self, code: &str) -> Result<Option<Service>, StoreError> {
        let row = sqlx::query(
            "SELECT id, code, description, duration_minutes, open_time, close_time, \
             weekdays, document_limit, is_active FROM services WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(self.client.pool())
        .await
        .map_err(db)?;
        row.as_ref().map(service_from_row).transpose()
    }

    async fn find_office_service(
        &self,
        office_id: Uuid,
        service_id: Uuid,
    ) -> Result<Option<OfficeService>, StoreError> {
        let row = sqlx::query(
            "SELECT id, office_id, service_id, is_active FROM office_services \
             WHERE office_id = $1 AND service_id = $2",
        )
        .bind(office_id)
        .bind(service_id)
        .fetch_optional(self.client.pool())
        .await
        .map_err(db)?;
        row.map(|row| {
            Ok(OfficeService {
                id: row.try_get("id").map_err(db)?,
                office_id: row.try_get("office_id").map_err(db)?,
                service_id: row.try_get("service_id").map_err(db)?,
                is_active: row.try_get("is_active").map_err(db)?,
            })
        })
        .transpose()
    }

    async fn find_client(&self, client_id: Uuid) -> Result<Option<Client>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, email, pending_limit, is_active FROM clients WHERE id = $1",
        )
        .bind(client_id)
        .fetch_optional(self.client.pool())
        .await
        .map_err(db)?;
        row.map(|row| {
            Ok(Client {
                id: row.try_get("id").map_err(db)?,
                name: row.try_get("name").map_err(db)?,
                email: row.try_get("email").map_err(db)?,
                pending_limit: to_u32(row.try_get("pending_limit").map_err(db)?, "pending_limit")?,
                is_active: row.try_get("is_active").map_err(db)?,
            })
        })
        .transpose()
    }

    async fn list_holidays(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let rows = sqlx::query("SELECT date FROM holidays WHERE is_active ORDER BY date")
            .fetch_all(self.client.pool())
            .await
            .map_err(db)?;
        rows.iter()
            .map(|row| row.try_get("date").map_err(db))
            .collect()
    }

    async fn list_blocked_hours(
        &self,
        office_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BlockedHour>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, office_id, date, start_time, end_time FROM blocked_hours \
             WHERE office_id = $1 AND date = $2",
        )
        .bind(office_id)
        .bind(date)
        .fetch_all(self.client.pool())
        .await
        .map_err(db)?;
        rows.iter()
            .map(|row| {
                Ok(BlockedHour {
                    id: row.try_get("id").map_err(db)?,
                    office_id: row.try_get("office_id").map_err(db)?,
                    date: row.try_get("date").map_err(db)?,
                    start_time: row.try_get("start_time").map_err(db)?,
                    end_time: row.try_get("end_time").map_err(db)?,
                })
            })
            .collect()
    }

    async fn count_office_occupancy(
        &self,
        office_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<u32, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments \
             WHERE office_id = $1 AND is_active AND status <> 'CANCELLED' \
             AND starts_at < $3 AND ends_at > $2",
        )
        .bind(office_id)
        .bind(start)
        .bind(end)
        .fetch_one(self.client.pool())
        .await
        .map_err(db)?;
        Ok(count as u32)
    }

    async fn count_client_pending(&self, client_id: Uuid) -> Result<u32, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments \
             WHERE client_id = $1 AND is_active AND status = 'PENDING'",
        )
        .bind(client_id)
        .fetch_one(self.client.pool())
        .await
        .map_err(db)?;
        Ok(count as u32)
    }

    async fn client_has_pending_overlap(
        &self,
        client_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM appointments \
             WHERE client_id = $1 AND is_active AND status = 'PENDING' \
             AND starts_at < $3 AND ends_at > $2)",
        )
        .bind(client_id)
        .bind(start)
        .bind(end)
        .fetch_one(self.client.pool())
        .await
        .map_err(db)?;
        Ok(exists)
    }

    async fn lock_booking_window(
        &self,
        office_id: Uuid,
        date: NaiveDate,
    ) -> Result<BookingLock, StoreError> {
        let key = booking_window_key(office_id, date);
        let mut conn = self.client.pool().acquire().await.map_err(db)?;
        debug!("acquiring booking advisory lock {key}");
        sqlx::query("SELECT pg_advisory_lock($1)")
            .bind(key)
            .execute(&mut *conn)
            .await
            .map_err(db)?;
        Ok(BookingLock::new(AdvisoryLockGuard {
            conn: Some(conn),
            key,
        }))
    }

    async fn insert_appointment(&self, new: NewAppointment) -> Result<Appointment, StoreError> {
        let row = sqlx::query(
            "INSERT INTO appointments \
             (id, client_id, service_id, office_id, starts_at, ends_at, notes, \
              status, attended, attendance_code, cancel_before, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'PENDING', FALSE, $8, $9, TRUE) \
             RETURNING id, client_id, service_id, office_id, starts_at, ends_at, notes, \
                       status, attended, attendance_code, cancel_before, created_at, is_active",
        )
        .bind(Uuid::new_v4())
        .bind(new.client_id)
        .bind(new.service_id)
        .bind(new.office_id)
        .bind(new.start)
        .bind(new.end)
        .bind(&new.notes)
        .bind(&new.attendance_code)
        .bind(new.cancel_before)
        .fetch_one(self.client.pool())
        .await
        .map_err(db)?;
        appointment_from_row(&row)
    }

    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let row = sqlx::query(
            "SELECT id, client_id, service_id, office_id, starts_at, ends_at, notes, \
             status, attended, attendance_code, cancel_before, created_at, is_active \
             FROM appointments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.client.pool())
        .await
        .map_err(db)?;
        row.as_ref().map(appointment_from_row).transpose()
    }

    async fn list_client_pending(&self, client_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, client_id, service_id, office_id, starts_at, ends_at, notes, \
             status, attended, attendance_code, cancel_before, created_at, is_active \
             FROM appointments \
             WHERE client_id = $1 AND is_active AND status = 'PENDING' \
             ORDER BY created_at DESC",
        )
        .bind(client_id)
        .fetch_all(self.client.pool())
        .await
        .map_err(db)?;
        rows.iter().map(appointment_from_row).collect()
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        attended: bool,
    ) -> Result<Appointment, StoreError> {
        let row = sqlx::query(
            "UPDATE appointments SET status = $2, attended = $3 WHERE id = $1 \
             RETURNING id, client_id, service_id, office_id, starts_at, ends_at, notes, \
                       status, attended, attendance_code, cancel_before, created_at, is_active",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(attended)
        .fetch_optional(self.client.pool())
        .await
        .map_err(db)?
        .ok_or_else(|| StoreError::Backend(format!("appointment {id} vanished")))?;
        appointment_from_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::booking_window_key;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn lock_keys_are_stable_and_window_specific() {
        let office = Uuid::new_v4();
        let other_office = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2026, 9, 15).unwrap();

        assert_eq!(
            booking_window_key(office, date),
            booking_window_key(office, date)
        );
        assert_ne!(
            booking_window_key(office, date),
            booking_window_key(other_office, date)
        );
        assert_ne!(
            booking_window_key(office, date),
            booking_window_key(office, date.succ_opt().unwrap())
        );
    }
}
