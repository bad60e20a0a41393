use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{Admission, ParkingLot, StatusSnapshot};
use crate::domain_event::EventEnvelope;
use crate::error::ParkingResult;
use crate::pass::{Pass, PassId};
use crate::pricing::PricingPlan;
use crate::receipt::Receipt;
use crate::ticket::{Ticket, TicketId};
use crate::vehicle::{Registration, Vehicle};

/// 可在线程间共享的停车场句柄
///
/// 每个操作在同一把锁内完成“检查容量 + 修改状态”，
/// 并发入场不会超额占用车位，同一张单次卡也不会被两次出场同时消耗。
#[derive(Debug, Clone)]
pub struct SharedParkingLot {
    inner: Arc<Mutex<ParkingLot>>,
}

impl SharedParkingLot {
    pub fn new(lot: ParkingLot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(lot)),
        }
    }

    // 聚合在 apply 之前已完成全部校验，持锁线程 panic 时状态仍然一致
    fn lock(&self) -> MutexGuard<'_, ParkingLot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enter(
        &self,
        vehicle: Vehicle,
        pass_id: Option<&PassId>,
        entry_time: DateTime<Utc>,
        pricing: Option<PricingPlan>,
    ) -> ParkingResult<Admission> {
        self.lock().enter(vehicle, pass_id, entry_time, pricing)
    }

    pub fn exit(
        &self,
        ticket_id: TicketId,
        exit_time: DateTime<Utc>,
        pricing: Option<PricingPlan>,
        duration_override: Option<Decimal>,
    ) -> ParkingResult<Receipt> {
        self.lock()
            .exit(ticket_id, exit_time, pricing, duration_override)
    }

    pub fn issue_monthly_pass(
        &self,
        holder_name: impl Into<String>,
        registration: impl Into<Registration>,
        months: u32,
        issued_at: DateTime<Utc>,
    ) -> ParkingResult<Pass> {
        self.lock()
            .issue_monthly_pass(holder_name, registration, months, issued_at)
    }

    pub fn issue_single_pass(
        &self,
        holder_name: impl Into<String>,
        registration: impl Into<Registration>,
        issued_at: DateTime<Utc>,
    ) -> ParkingResult<Pass> {
        self.lock()
            .issue_single_pass(holder_name, registration, issued_at)
    }

    pub fn status(&self) -> StatusSnapshot {
        self.lock().status()
    }

    pub fn available_capacity(&self) -> u32 {
        self.lock().available_capacity()
    }

    pub fn ticket(&self, ticket_id: &TicketId) -> Option<Ticket> {
        self.lock().ticket(ticket_id).cloned()
    }

    pub fn pass(&self, pass_id: &PassId) -> Option<Pass> {
        self.lock().pass(pass_id).cloned()
    }

    pub fn active_tickets(&self) -> Vec<Ticket> {
        self.lock().active_tickets().cloned().collect()
    }

    pub fn drain_events(&self) -> Vec<EventEnvelope<ParkingLot>> {
        self.lock().drain_events()
    }
}

impl From<ParkingLot> for SharedParkingLot {
    fn from(lot: ParkingLot) -> Self {
        Self::new(lot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::error::ParkingError;
    use chrono::TimeZone;
    use std::thread;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap()
    }

    #[test]
    fn concurrent_entries_never_exceed_capacity() {
        let lot = SharedParkingLot::new(ParkingLot::with_capacity(10).unwrap());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let lot = lot.clone();
                thread::spawn(move || {
                    lot.enter(Vehicle::car(format!("CAR-{i:04}")), None, now(), None)
                })
            })
            .collect();

        let mut admitted = 0;
        let mut denied = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Ok(_) => admitted += 1,
                Err(ParkingError::CapacityExhausted { .. }) => denied += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(admitted, 10);
        assert_eq!(denied, 22);
        let status = lot.status();
        assert_eq!(status.occupied, 10);
        assert_eq!(status.available, 0);
        assert_eq!(status.active_tickets, 10);
    }

    #[test]
    fn concurrent_entries_for_one_vehicle_admit_once() {
        let lot = SharedParkingLot::new(ParkingLot::with_capacity(10).unwrap());
        let pass = lot.issue_single_pass("Jane Doe", "SGL-2222", now()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lot = lot.clone();
                let pass_id = pass.id().clone();
                thread::spawn(move || lot.enter(Vehicle::car("SGL-2222"), Some(&pass_id), now(), None))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let admitted: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(admitted.len(), 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, ParkingError::VehicleAlreadyParked { .. }))
        );
        assert_eq!(lot.status().occupied, 1);

        let ticket_id = *admitted[0].ticket.id();
        lot.exit(ticket_id, now() + chrono::Duration::hours(1), None, None)
            .unwrap();
        assert!(lot.pass(pass.id()).unwrap().is_consumed());
        assert!(lot.ticket(&ticket_id).is_none());
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let lot = SharedParkingLot::new(ParkingLot::with_capacity(3).unwrap());
        let poisoner = lot.clone();
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock();
            panic!("poison the lot");
        })
        .join();

        assert!(lot.enter(Vehicle::car("A-1"), None, now(), None).is_ok());
        assert_eq!(lot.available_capacity(), 2);
    }
}
