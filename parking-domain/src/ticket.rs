//! 停车工单（ParkingTicket）
//!
//! 一次停车会话：`Open`（尚无出场时间）→ `Closed`（已出场），单向不可逆。
//!
//! 出场结算按以下顺序确定费用：
//! 1. 绑定了有效月卡 → 0，月卡不消耗；
//! 2. 绑定了有效单次卡 → 使用该卡，成功则收取卡面固定费用，失败则继续往下；
//! 3. 计时计费：`pricing.calculate_fee(车型, 小时数)`。
//!
//! 过期或已用完的通行证静默回落到计时计费，不会让出场失败。
//!
use chrono::{DateTime, Utc};
use parking_macros::entity_id;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{ParkingError, ParkingResult};
use crate::pass::{Pass, PassId, PassKind};
use crate::pricing::PricingStrategy;
use crate::vehicle::Vehicle;

const SECONDS_PER_HOUR: i64 = 3600;

/// 工单号（`TKT-0001`）
#[entity_id(prefix = "TKT")]
pub struct TicketId(u32);

/// 计费依据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeBasis {
    /// 有效月卡，免费
    Waived,
    /// 单次卡固定费用
    FlatRate,
    /// 计时计费
    Metered,
}

/// 一次结算的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub fee: Decimal,
    pub basis: FeeBasis,
    pub duration_hours: Decimal,
    pub hourly_rate: Decimal,
    pub pricing: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    id: TicketId,
    vehicle: Vehicle,
    entry_time: DateTime<Utc>,
    exit_time: Option<DateTime<Utc>>,
    applied_pass: Option<PassId>,
    fee_charged: Decimal,
    spaces_used: u32,
    entry_pricing: String,
}

impl Ticket {
    pub fn open(
        id: TicketId,
        vehicle: Vehicle,
        entry_time: DateTime<Utc>,
        entry_pricing: impl Into<String>,
    ) -> Self {
        let spaces_used = vehicle.spaces_required();
        Self {
            id,
            vehicle,
            entry_time,
            exit_time: None,
            applied_pass: None,
            fee_charged: Decimal::ZERO,
            spaces_used,
            entry_pricing: entry_pricing.into(),
        }
    }

    /// 绑定通行证（仅记录编号，不消耗）；车牌不一致时拒绝
    pub fn apply_pass(&mut self, pass: &Pass) -> bool {
        if !pass.is_bound_to(self.vehicle.registration()) {
            return false;
        }
        self.applied_pass = Some(pass.id().clone());
        true
    }

    /// 从入场到 `until` 的小时数，保留两位小数；早于入场时间按 0 计
    pub fn duration_hours(&self, until: DateTime<Utc>) -> Decimal {
        let seconds = (until - self.entry_time).num_seconds().max(0);
        (Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR)).round_dp(2)
    }

    /// 出场结算
    ///
    /// `pass` 必须是 `applied_pass` 指向的那张通行证（由停车场从登记表取出）。
    /// `duration_override` 用于模拟场景下直接指定停车时长；`Some(0)` 按 0 小时计，负数被拒绝。
    pub fn close(
        &mut self,
        exit_time: DateTime<Utc>,
        pass: Option<&mut Pass>,
        pricing: &dyn PricingStrategy,
        duration_override: Option<Decimal>,
    ) -> ParkingResult<Settlement> {
        if self.is_closed() {
            return Err(ParkingError::TicketClosed { ticket_id: self.id });
        }
        if let Some(hours) = duration_override {
            if hours.is_sign_negative() {
                return Err(ParkingError::InvalidValue {
                    reason: format!("duration override must not be negative: {hours}"),
                });
            }
        }
        debug_assert_eq!(
            pass.as_ref().map(|p| p.id()),
            self.applied_pass.as_ref(),
            "settled against a pass other than the applied one"
        );

        self.exit_time = Some(exit_time);

        let category = self.vehicle.category();
        let duration_hours = duration_override.unwrap_or_else(|| self.duration_hours(exit_time));
        let hourly_rate = pricing.hourly_rate(category);

        let (fee, basis) = match pass {
            Some(pass) if pass.is_valid(exit_time) => match pass.kind() {
                PassKind::Monthly { .. } => (Decimal::ZERO, FeeBasis::Waived),
                PassKind::SingleEntry { flat_fee, .. } => {
                    let flat_fee = *flat_fee;
                    if pass.use_pass(exit_time) {
                        (flat_fee, FeeBasis::FlatRate)
                    } else {
                        (
                            pricing.calculate_fee(category, duration_hours),
                            FeeBasis::Metered,
                        )
                    }
                }
            },
            _ => (
                pricing.calculate_fee(category, duration_hours),
                FeeBasis::Metered,
            ),
        };

        self.fee_charged = fee;

        Ok(Settlement {
            fee,
            basis,
            duration_hours,
            hourly_rate,
            pricing: pricing.name().to_string(),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.exit_time.is_some()
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn entry_time(&self) -> DateTime<Utc> {
        self.entry_time
    }

    pub fn exit_time(&self) -> Option<DateTime<Utc>> {
        self.exit_time
    }

    pub fn applied_pass(&self) -> Option<&PassId> {
        self.applied_pass.as_ref()
    }

    pub fn fee_charged(&self) -> Decimal {
        self.fee_charged
    }

    pub fn spaces_used(&self) -> u32 {
        self.spaces_used
    }

    /// 入场时报价所用的策略名称
    pub fn entry_pricing(&self) -> &str {
        &self.entry_pricing
    }
}

impl Entity for Ticket {
    type Id = TicketId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingPlan;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, hour, minute, 0).unwrap()
    }

    fn car_ticket() -> Ticket {
        Ticket::open(TicketId::first(), Vehicle::car("ABC-1234"), at(9, 30), "Standard")
    }

    #[test]
    fn ticket_id_text_form() {
        assert_eq!(TicketId::first().to_string(), "TKT-0001");
        assert_eq!(TicketId::from_sequence(42).to_string(), "TKT-0042");
        assert_eq!("TKT-0007".parse::<TicketId>().unwrap(), TicketId::from_sequence(7));
        assert!("MP-0007".parse::<TicketId>().is_err());
        assert!("TKT-x".parse::<TicketId>().is_err());
    }

    #[test]
    fn snapshot_of_spaces_taken_at_entry() {
        let t = Ticket::open(TicketId::first(), Vehicle::truck("TRK-9999"), at(10, 0), "Peak Hours");
        assert_eq!(t.spaces_used(), 2);
        assert!(!t.is_closed());
        assert_eq!(t.fee_charged(), Decimal::ZERO);
    }

    #[test]
    fn metered_fee_from_derived_duration() {
        let mut t = car_ticket();
        let s = t.close(at(13, 0), None, &PricingPlan::Standard, None).unwrap();
        assert_eq!(s.duration_hours, dec!(3.5));
        assert_eq!(s.fee, dec!(7.00));
        assert_eq!(s.basis, FeeBasis::Metered);
        assert_eq!(s.hourly_rate, dec!(2.00));
        assert_eq!(s.pricing, "Standard");
        assert_eq!(t.fee_charged(), dec!(7.00));
        assert_eq!(t.exit_time(), Some(at(13, 0)));
    }

    #[test]
    fn duration_override_wins_over_timestamps() {
        let mut t = Ticket::open(TicketId::first(), Vehicle::truck("TRK-9999"), at(10, 0), "Peak Hours");
        let s = t.close(at(10, 5), None, &PricingPlan::Peak, Some(dec!(4.0))).unwrap();
        assert_eq!(s.fee, dec!(24.00));
        assert_eq!(s.duration_hours, dec!(4.0));
    }

    #[test]
    fn zero_override_is_honored() {
        let mut t = car_ticket();
        let s = t.close(at(13, 0), None, &PricingPlan::Standard, Some(Decimal::ZERO)).unwrap();
        assert_eq!(s.duration_hours, Decimal::ZERO);
        assert_eq!(s.fee, Decimal::ZERO);
        assert_eq!(s.basis, FeeBasis::Metered);
    }

    #[test]
    fn negative_override_is_rejected_without_closing() {
        let mut t = car_ticket();
        let err = t
            .close(at(13, 0), None, &PricingPlan::Standard, Some(dec!(-3)))
            .unwrap_err();
        assert!(matches!(err, ParkingError::InvalidValue { .. }));
        assert!(!t.is_closed());
        assert_eq!(t.fee_charged(), Decimal::ZERO);
    }

    #[test]
    fn exit_before_entry_counts_as_zero_hours() {
        let t = car_ticket();
        assert_eq!(t.duration_hours(at(8, 0)), Decimal::ZERO);
    }

    #[test]
    fn duration_rounds_to_two_places() {
        let t = car_ticket();
        // 20 分钟 = 0.333… 小时
        assert_eq!(t.duration_hours(at(9, 50)), dec!(0.33));
    }

    #[test]
    fn valid_monthly_pass_waives_fee_without_consuming() {
        let mut pass = Pass::monthly(
            PassId::new("MP-0001"),
            "John Smith",
            "ABC-1234",
            at(8, 0),
            at(8, 0) + Duration::days(30),
        );
        let mut t = car_ticket();
        assert!(t.apply_pass(&pass));

        let s = t.close(at(18, 0), Some(&mut pass), &PricingPlan::Standard, Some(dec!(4.5))).unwrap();
        assert_eq!(s.fee, Decimal::ZERO);
        assert_eq!(s.basis, FeeBasis::Waived);
        assert!(pass.is_valid(at(18, 0)));
    }

    #[test]
    fn expired_monthly_pass_falls_back_to_metered() {
        let mut pass = Pass::monthly(
            PassId::new("MP-0001"),
            "John Smith",
            "ABC-1234",
            at(8, 0) - Duration::days(30),
            at(12, 0),
        );
        let mut t = car_ticket();
        assert!(t.apply_pass(&pass));

        let s = t.close(at(13, 0), Some(&mut pass), &PricingPlan::Standard, None).unwrap();
        assert_eq!(s.basis, FeeBasis::Metered);
        assert_eq!(s.fee, dec!(7.00));
    }

    #[test]
    fn single_entry_pass_charges_flat_fee_once() {
        let mut pass =
            Pass::single_entry(PassId::new("SP-0001"), "Jane Doe", "ABC-1234", at(8, 0), dec!(10.00));
        let mut t = car_ticket();
        assert!(t.apply_pass(&pass));

        let s = t.close(at(15, 30), Some(&mut pass), &PricingPlan::Standard, Some(dec!(6.0))).unwrap();
        assert_eq!(s.fee, dec!(10.00));
        assert_eq!(s.basis, FeeBasis::FlatRate);
        assert!(pass.is_consumed());

        // 同一张卡再次结算：回落计时
        let mut again = Ticket::open(TicketId::from_sequence(2), Vehicle::car("ABC-1234"), at(16, 0), "Standard");
        assert!(again.apply_pass(&pass));
        let s = again.close(at(18, 0), Some(&mut pass), &PricingPlan::Standard, None).unwrap();
        assert_eq!(s.basis, FeeBasis::Metered);
        assert_eq!(s.fee, dec!(4.00));
    }

    #[test]
    fn pass_for_another_vehicle_is_not_attached() {
        let pass =
            Pass::single_entry(PassId::new("SP-0001"), "Jane Doe", "SGL-2222", at(8, 0), dec!(10.00));
        let mut t = car_ticket();
        assert!(!t.apply_pass(&pass));
        assert_eq!(t.applied_pass(), None);
    }

    #[test]
    fn closing_twice_is_rejected() {
        let mut t = car_ticket();
        t.close(at(10, 0), None, &PricingPlan::Standard, None).unwrap();
        let err = t.close(at(11, 0), None, &PricingPlan::Standard, None).unwrap_err();
        assert!(matches!(err, ParkingError::TicketClosed { .. }));
        assert_eq!(t.exit_time(), Some(at(10, 0)));
    }
}
