//! 停车场聚合根
//!
//! 唯一持有可变状态的组件：车位占用、在场工单登记表、通行证登记表与编号序列。
//! 每个操作都被表达为一条命令：`execute` 校验并产出事件（不改变状态），
//! `apply` 把事件投影到状态。被拒绝的命令不会留下任何部分修改。
//!
//! 不变式：`occupied == Σ 在场工单的 spaces_used`，且 `0 <= occupied <= total_capacity`。
//!
mod command;
mod event;
mod shared;
mod status;

pub use command::ParkingCommand;
pub use event::{ParkingEvent, PassRejection, PassRejectionReason};
pub use shared::SharedParkingLot;
pub use status::StatusSnapshot;

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, TimeDelta, Utc};
use parking_macros::entity_id;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::Aggregate;
use crate::config::ParkingLotConfig;
use crate::domain_event::{DomainEvent, EventEnvelope};
use crate::entity::Entity;
use crate::error::{ParkingError, ParkingResult};
use crate::pass::{BoundTo, Pass, PassId, PassKind, ValidAt};
use crate::pricing::{PricingPlan, PricingStrategy};
use crate::receipt::{PassSummary, Receipt};
use crate::specification::Specification;
use crate::ticket::{FeeBasis, Ticket, TicketId};
use crate::value_object::{ValueObject, Version};
use crate::vehicle::{Registration, Vehicle};

/// 停车场标识
#[entity_id]
pub struct LotId(String);

/// 入场结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admission {
    pub ticket: Ticket,
    /// 请求的通行证未能绑定时给出原因；入场本身不受影响
    pub pass_rejection: Option<PassRejection>,
    /// 入场后剩余车位
    pub available_after: u32,
}

#[derive(Debug, Clone)]
pub struct ParkingLot {
    id: LotId,
    version: Version,
    total_capacity: u32,
    occupied: u32,
    active_tickets: BTreeMap<TicketId, Ticket>,
    issued_passes: BTreeMap<PassId, Pass>,
    default_pricing: PricingPlan,
    single_entry_flat_fee: Decimal,
    days_per_month: u32,
    last_ticket: Option<TicketId>,
    monthly_issued: u32,
    single_issued: u32,
    pending: VecDeque<EventEnvelope<ParkingLot>>,
    event_buffer_capacity: usize,
}

impl ParkingLot {
    pub fn new(config: ParkingLotConfig) -> ParkingResult<Self> {
        config.validate()?;
        Ok(Self {
            id: config.lot_id,
            version: Version::new(),
            total_capacity: config.total_capacity,
            occupied: 0,
            active_tickets: BTreeMap::new(),
            issued_passes: BTreeMap::new(),
            default_pricing: config.default_pricing,
            single_entry_flat_fee: config.single_entry_flat_fee,
            days_per_month: config.days_per_month,
            last_ticket: None,
            monthly_issued: 0,
            single_issued: 0,
            pending: VecDeque::new(),
            event_buffer_capacity: config.event_buffer_capacity,
        })
    }

    /// 其余配置取默认值
    pub fn with_capacity(total_capacity: u32) -> ParkingResult<Self> {
        Self::new(
            ParkingLotConfig::builder()
                .total_capacity(total_capacity)
                .build(),
        )
    }

    /// 车辆入场
    ///
    /// 车位不足时返回 `CapacityExhausted`；通行证无法绑定时仍然放行，
    /// 原因记录在 `Admission::pass_rejection` 中。
    pub fn enter(
        &mut self,
        vehicle: Vehicle,
        pass_id: Option<&PassId>,
        entry_time: DateTime<Utc>,
        pricing: Option<PricingPlan>,
    ) -> ParkingResult<Admission> {
        let events = self.dispatch(ParkingCommand::Enter {
            vehicle,
            pass_id: pass_id.cloned(),
            entry_time,
            pricing,
        })?;

        let mut ticket = None;
        let mut pass_rejection = None;
        for event in events {
            match event {
                ParkingEvent::VehicleAdmitted { ticket: t, .. } => ticket = Some(t),
                ParkingEvent::PassRejected { rejection, .. } => pass_rejection = Some(rejection),
                _ => {}
            }
        }
        let Some(ticket) = ticket else {
            unreachable!("enter always yields VehicleAdmitted");
        };

        info!(
            lot = %self.id,
            ticket = %ticket.id(),
            registration = %ticket.vehicle().registration(),
            category = %ticket.vehicle().category(),
            pass = ?ticket.applied_pass(),
            available = self.available_capacity(),
            "vehicle admitted"
        );

        Ok(Admission {
            ticket,
            pass_rejection,
            available_after: self.available_capacity(),
        })
    }

    /// 车辆出场
    ///
    /// 未知或已出场的工单返回 `TicketNotFound`，状态不变。
    pub fn exit(
        &mut self,
        ticket_id: TicketId,
        exit_time: DateTime<Utc>,
        pricing: Option<PricingPlan>,
        duration_override: Option<Decimal>,
    ) -> ParkingResult<Receipt> {
        let events = self.dispatch(ParkingCommand::Exit {
            ticket_id,
            exit_time,
            pricing,
            duration_override,
        })?;

        let receipt = events.into_iter().find_map(|event| match event {
            ParkingEvent::VehicleReleased { receipt, .. } => Some(receipt),
            _ => None,
        });
        let Some(receipt) = receipt else {
            unreachable!("exit always yields VehicleReleased");
        };

        info!(
            lot = %self.id,
            ticket = %receipt.ticket_id,
            fee = %receipt.fee,
            basis = ?receipt.basis,
            spaces_released = receipt.spaces_released,
            available = self.available_capacity(),
            "vehicle released"
        );

        Ok(receipt)
    }

    /// 签发月卡：有效期 = 签发时间 + 月数 × 每月天数
    pub fn issue_monthly_pass(
        &mut self,
        holder_name: impl Into<String>,
        registration: impl Into<Registration>,
        months: u32,
        issued_at: DateTime<Utc>,
    ) -> ParkingResult<Pass> {
        let events = self.dispatch(ParkingCommand::IssueMonthlyPass {
            holder_name: holder_name.into(),
            registration: registration.into(),
            months,
            issued_at,
        })?;
        Ok(Self::issued_pass(events))
    }

    /// 签发单次卡，费用取配置中的固定值
    pub fn issue_single_pass(
        &mut self,
        holder_name: impl Into<String>,
        registration: impl Into<Registration>,
        issued_at: DateTime<Utc>,
    ) -> ParkingResult<Pass> {
        let events = self.dispatch(ParkingCommand::IssueSinglePass {
            holder_name: holder_name.into(),
            registration: registration.into(),
            issued_at,
        })?;
        Ok(Self::issued_pass(events))
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            total_capacity: self.total_capacity,
            occupied: self.occupied,
            available: self.available_capacity(),
            active_tickets: self.active_tickets.len(),
            registered_passes: self.issued_passes.len(),
        }
    }

    pub fn available_capacity(&self) -> u32 {
        self.total_capacity - self.occupied
    }

    pub fn total_capacity(&self) -> u32 {
        self.total_capacity
    }

    pub fn occupied_capacity(&self) -> u32 {
        self.occupied
    }

    pub fn ticket(&self, ticket_id: &TicketId) -> Option<&Ticket> {
        self.active_tickets.get(ticket_id)
    }

    /// 在场工单，按工单号升序
    pub fn active_tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.active_tickets.values()
    }

    pub fn pass(&self, pass_id: &PassId) -> Option<&Pass> {
        self.issued_passes.get(pass_id)
    }

    pub fn passes(&self) -> impl Iterator<Item = &Pass> {
        self.issued_passes.values()
    }

    pub fn default_pricing(&self) -> &PricingPlan {
        &self.default_pricing
    }

    /// 取出尚未交付的事件信封（交给报表/审计等外部协作方）
    ///
    /// 调用方应定期取出；缓冲区最多保留 `event_buffer_capacity` 条，超出时丢弃最旧的事件。
    pub fn drain_events(&mut self) -> Vec<EventEnvelope<ParkingLot>> {
        self.pending.drain(..).collect()
    }

    pub fn pending_event_count(&self) -> usize {
        self.pending.len()
    }

    fn dispatch(&mut self, command: ParkingCommand) -> ParkingResult<Vec<ParkingEvent>> {
        let occurred_at = command.occurred_at();
        let events = self.handle(command)?;
        self.pending.extend(
            events
                .iter()
                .map(|event| EventEnvelope::new(&self.id, event.clone(), occurred_at)),
        );
        let overflow = self.pending.len().saturating_sub(self.event_buffer_capacity);
        if overflow > 0 {
            warn!(
                lot = %self.id,
                dropped = overflow,
                capacity = self.event_buffer_capacity,
                "event buffer full, oldest events dropped"
            );
            self.pending = self.pending.split_off(overflow);
        }
        Ok(events)
    }

    fn issued_pass(events: Vec<ParkingEvent>) -> Pass {
        match events.into_iter().next() {
            Some(ParkingEvent::PassIssued { pass, .. }) => pass,
            _ => unreachable!("pass issuance always yields PassIssued"),
        }
    }

    fn next_ticket_id(&self) -> TicketId {
        self.last_ticket.map_or_else(TicketId::first, |last| last.next())
    }

    fn next_version(&self, offset: usize) -> usize {
        self.version.value() + offset
    }

    fn admit(
        &self,
        vehicle: Vehicle,
        pass_id: Option<PassId>,
        entry_time: DateTime<Utc>,
        pricing: Option<PricingPlan>,
    ) -> ParkingResult<Vec<ParkingEvent>> {
        vehicle.validate()?;

        // 同一车牌同一时刻只能有一张在场工单
        if let Some(open) = self
            .active_tickets
            .values()
            .find(|ticket| ticket.vehicle().registration() == vehicle.registration())
        {
            warn!(
                lot = %self.id,
                registration = %vehicle.registration(),
                ticket = %open.id(),
                "entry denied: vehicle already parked"
            );
            return Err(ParkingError::VehicleAlreadyParked {
                registration: vehicle.registration().clone(),
                ticket_id: *open.id(),
            });
        }

        let needed = vehicle.spaces_required();
        let available = self.available_capacity();
        if available < needed {
            warn!(
                lot = %self.id,
                registration = %vehicle.registration(),
                needed,
                available,
                "entry denied: capacity exhausted"
            );
            return Err(ParkingError::CapacityExhausted { needed, available });
        }

        let pricing = pricing.unwrap_or_else(|| self.default_pricing.clone());
        let ticket_id = self.next_ticket_id();
        let mut ticket = Ticket::open(ticket_id, vehicle, entry_time, pricing.name());

        let rejection = pass_id.and_then(|pass_id| {
            let reason = match self.issued_passes.get(&pass_id) {
                None => Some(PassRejectionReason::Unknown),
                Some(pass) if !ValidAt(entry_time).is_satisfied_by(pass) => {
                    Some(PassRejectionReason::NotValid)
                }
                Some(pass) if !BoundTo(ticket.vehicle().registration().clone()).is_satisfied_by(pass) => {
                    Some(PassRejectionReason::RegistrationMismatch)
                }
                Some(pass) => {
                    let attached = ticket.apply_pass(pass);
                    debug_assert!(attached);
                    None
                }
            };
            reason.map(|reason| PassRejection { pass_id, reason })
        });

        if let Some(rejection) = &rejection {
            warn!(
                lot = %self.id,
                ticket = %ticket_id,
                pass = %rejection.pass_id,
                reason = ?rejection.reason,
                "pass not applied, metered rates apply"
            );
        }

        let mut events = vec![ParkingEvent::VehicleAdmitted {
            aggregate_version: self.next_version(1),
            ticket,
        }];
        if let Some(rejection) = rejection {
            events.push(ParkingEvent::PassRejected {
                aggregate_version: self.next_version(2),
                ticket_id,
                rejection,
            });
        }
        Ok(events)
    }

    fn release(
        &self,
        ticket_id: TicketId,
        exit_time: DateTime<Utc>,
        pricing: Option<PricingPlan>,
        duration_override: Option<Decimal>,
    ) -> ParkingResult<Vec<ParkingEvent>> {
        let Some(ticket) = self.active_tickets.get(&ticket_id) else {
            warn!(lot = %self.id, ticket = %ticket_id, "exit for unknown ticket");
            return Err(ParkingError::TicketNotFound { ticket_id });
        };

        if exit_time < ticket.entry_time() {
            warn!(
                lot = %self.id,
                ticket = %ticket_id,
                entry_time = %ticket.entry_time(),
                exit_time = %exit_time,
                "exit time precedes entry time, duration counted as zero"
            );
        }

        // 在副本上结算，状态变更只经由事件落地
        let mut ticket = ticket.clone();
        let mut pass = ticket
            .applied_pass()
            .and_then(|pass_id| self.issued_passes.get(pass_id))
            .cloned();
        let pricing = pricing.unwrap_or_else(|| self.default_pricing.clone());
        let settlement = ticket.close(exit_time, pass.as_mut(), &pricing, duration_override)?;

        debug!(
            ticket = %ticket_id,
            duration_hours = %settlement.duration_hours,
            hourly_rate = %settlement.hourly_rate,
            pricing = %settlement.pricing,
            fee = %settlement.fee,
            basis = ?settlement.basis,
            "ticket settled"
        );

        let pass_consumed = settlement.basis == FeeBasis::FlatRate;

        let receipt = Receipt {
            ticket_id,
            registration: ticket.vehicle().registration().clone(),
            category: ticket.vehicle().category(),
            entry_time: ticket.entry_time(),
            exit_time,
            duration_hours: settlement.duration_hours,
            pricing: settlement.pricing,
            hourly_rate: settlement.hourly_rate,
            fee: settlement.fee,
            basis: settlement.basis,
            spaces_released: ticket.spaces_used(),
            pass: pass.as_ref().map(|pass| PassSummary {
                pass_id: pass.id().clone(),
                pass_type: pass.pass_type().to_string(),
                consumed: pass.is_consumed(),
            }),
        };

        let mut events = Vec::with_capacity(2);
        if pass_consumed {
            if let Some(pass) = &pass {
                events.push(ParkingEvent::SingleEntryPassConsumed {
                    aggregate_version: self.next_version(events.len() + 1),
                    pass_id: pass.id().clone(),
                    consumed_at: exit_time,
                });
            }
        }
        events.push(ParkingEvent::VehicleReleased {
            aggregate_version: self.next_version(events.len() + 1),
            ticket,
            receipt,
        });
        Ok(events)
    }

    fn issue_pass(
        &self,
        holder_name: String,
        registration: Registration,
        issued_at: DateTime<Utc>,
        months: Option<u32>,
    ) -> ParkingResult<Vec<ParkingEvent>> {
        registration.validate()?;

        let pass = match months {
            Some(0) => {
                return Err(ParkingError::InvalidValue {
                    reason: "monthly pass must cover at least one month".into(),
                });
            }
            Some(months) => {
                let id = PassId::new(format!("MP-{:04}", self.monthly_issued + 1));
                let expires_at = i64::from(months)
                    .checked_mul(i64::from(self.days_per_month))
                    .and_then(TimeDelta::try_days)
                    .and_then(|validity| issued_at.checked_add_signed(validity))
                    .ok_or_else(|| ParkingError::InvalidValue {
                        reason: format!("{months} months from {issued_at} is out of range"),
                    })?;
                Pass::monthly(id, holder_name, registration, issued_at, expires_at)
            }
            None => {
                let id = PassId::new(format!("SP-{:04}", self.single_issued + 1));
                Pass::single_entry(
                    id,
                    holder_name,
                    registration,
                    issued_at,
                    self.single_entry_flat_fee,
                )
            }
        };

        Ok(vec![ParkingEvent::PassIssued {
            aggregate_version: self.next_version(1),
            pass,
        }])
    }
}

impl Entity for ParkingLot {
    type Id = LotId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Aggregate for ParkingLot {
    const TYPE: &'static str = "parking_lot";

    type Command = ParkingCommand;
    type Event = ParkingEvent;
    type Error = ParkingError;

    fn version(&self) -> Version {
        self.version
    }

    fn execute(&self, command: Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ParkingCommand::Enter {
                vehicle,
                pass_id,
                entry_time,
                pricing,
            } => self.admit(vehicle, pass_id, entry_time, pricing),
            ParkingCommand::Exit {
                ticket_id,
                exit_time,
                pricing,
                duration_override,
            } => self.release(ticket_id, exit_time, pricing, duration_override),
            ParkingCommand::IssueMonthlyPass {
                holder_name,
                registration,
                months,
                issued_at,
            } => self.issue_pass(holder_name, registration, issued_at, Some(months)),
            ParkingCommand::IssueSinglePass {
                holder_name,
                registration,
                issued_at,
            } => self.issue_pass(holder_name, registration, issued_at, None),
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ParkingEvent::PassIssued { pass, .. } => {
                match pass.kind() {
                    PassKind::Monthly { .. } => self.monthly_issued += 1,
                    PassKind::SingleEntry { .. } => self.single_issued += 1,
                }
                info!(
                    lot = %self.id,
                    pass = %pass.id(),
                    pass_type = pass.pass_type(),
                    holder = pass.holder_name(),
                    registration = %pass.bound_registration(),
                    "pass issued"
                );
                let previous = self.issued_passes.insert(pass.id().clone(), pass.clone());
                debug_assert!(previous.is_none(), "duplicate pass id {}", pass.id());
            }
            ParkingEvent::VehicleAdmitted { ticket, .. } => {
                let occupied = self.occupied + ticket.spaces_used();
                assert!(
                    occupied <= self.total_capacity,
                    "occupied {occupied} exceeds capacity {}",
                    self.total_capacity
                );
                self.occupied = occupied;
                self.last_ticket = Some(*ticket.id());
                let previous = self.active_tickets.insert(*ticket.id(), ticket.clone());
                assert!(previous.is_none(), "duplicate ticket id {}", ticket.id());
            }
            ParkingEvent::PassRejected { .. } => {}
            ParkingEvent::SingleEntryPassConsumed {
                pass_id,
                consumed_at,
                ..
            } => {
                if let Some(pass) = self.issued_passes.get_mut(pass_id) {
                    let used = pass.use_pass(*consumed_at);
                    debug_assert!(used, "pass {pass_id} consumed twice");
                }
            }
            ParkingEvent::VehicleReleased { ticket, .. } => {
                let Some(active) = self.active_tickets.remove(ticket.id()) else {
                    unreachable!("released ticket {} was not active", ticket.id());
                };
                let Some(occupied) = self.occupied.checked_sub(active.spaces_used()) else {
                    unreachable!("releasing {} spaces from {}", active.spaces_used(), self.occupied);
                };
                self.occupied = occupied;
            }
        }
        self.version = Version::from_value(event.aggregate_version());
    }
}
