//! 通行证（Pass）
//!
//! 绑定车牌的预付权益，优先于计时计费：
//! - 月卡：到期前可反复使用，校验只读；
//! - 单次卡：按固定费率抵扣一次，使用后失效。
//!
//! 失败只通过布尔结果表达，从不返回错误。
//!
use chrono::{DateTime, Utc};
use parking_macros::entity_id;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::specification::Specification;
use crate::vehicle::Registration;

/// 通行证编号（如 `MP-0001`、`SP-0001`）
#[entity_id]
pub struct PassId(String);

/// 通行证种类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PassKind {
    Monthly { expires_at: DateTime<Utc> },
    SingleEntry { consumed: bool, flat_fee: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pass {
    id: PassId,
    holder_name: String,
    bound_registration: Registration,
    issued_at: DateTime<Utc>,
    #[serde(flatten)]
    kind: PassKind,
}

impl Pass {
    pub fn monthly(
        id: PassId,
        holder_name: impl Into<String>,
        bound_registration: impl Into<Registration>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            holder_name: holder_name.into(),
            bound_registration: bound_registration.into(),
            issued_at,
            kind: PassKind::Monthly { expires_at },
        }
    }

    pub fn single_entry(
        id: PassId,
        holder_name: impl Into<String>,
        bound_registration: impl Into<Registration>,
        issued_at: DateTime<Utc>,
        flat_fee: Decimal,
    ) -> Self {
        Self {
            id,
            holder_name: holder_name.into(),
            bound_registration: bound_registration.into(),
            issued_at,
            kind: PassKind::SingleEntry {
                consumed: false,
                flat_fee,
            },
        }
    }

    /// 月卡：`now < expires_at`；单次卡：尚未使用
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        match &self.kind {
            PassKind::Monthly { expires_at } => now < *expires_at,
            PassKind::SingleEntry { consumed, .. } => !consumed,
        }
    }

    /// 使用通行证
    ///
    /// 月卡始终返回 true 且不改变状态；单次卡仅第一次返回 true，
    /// 之后返回 false 且不做任何修改。每个计费事件至多调用一次。
    pub fn use_pass(&mut self, _now: DateTime<Utc>) -> bool {
        match &mut self.kind {
            PassKind::Monthly { .. } => true,
            PassKind::SingleEntry { consumed, .. } => {
                if *consumed {
                    return false;
                }
                *consumed = true;
                true
            }
        }
    }

    pub fn pass_type(&self) -> &'static str {
        match self.kind {
            PassKind::Monthly { .. } => "Monthly Pass",
            PassKind::SingleEntry { .. } => "Single Entry Pass",
        }
    }

    /// 月卡剩余整天数（已过期为 0）；单次卡没有期限
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        match &self.kind {
            PassKind::Monthly { expires_at } if now < *expires_at => {
                Some((*expires_at - now).num_days())
            }
            PassKind::Monthly { .. } => Some(0),
            PassKind::SingleEntry { .. } => None,
        }
    }

    pub fn is_bound_to(&self, registration: &Registration) -> bool {
        &self.bound_registration == registration
    }

    pub fn is_consumed(&self) -> bool {
        matches!(self.kind, PassKind::SingleEntry { consumed: true, .. })
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn bound_registration(&self) -> &Registration {
        &self.bound_registration
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn kind(&self) -> &PassKind {
        &self.kind
    }
}

impl Entity for Pass {
    type Id = PassId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// 在给定时刻有效的通行证
pub struct ValidAt(pub DateTime<Utc>);

impl Specification<Pass> for ValidAt {
    fn is_satisfied_by(&self, candidate: &Pass) -> bool {
        candidate.is_valid(self.0)
    }
}

/// 绑定给定车牌的通行证
pub struct BoundTo(pub Registration);

impl Specification<Pass> for BoundTo {
    fn is_satisfied_by(&self, candidate: &Pass) -> bool {
        candidate.is_bound_to(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, hour, 0, 0).unwrap()
    }

    fn monthly() -> Pass {
        Pass::monthly(
            PassId::new("MP-0001"),
            "John Smith",
            "XYZ-5678",
            at(8),
            at(8) + Duration::days(30),
        )
    }

    fn single() -> Pass {
        Pass::single_entry(PassId::new("SP-0001"), "Jane Doe", "SGL-2222", at(8), dec!(10.00))
    }

    #[test]
    fn monthly_valid_until_expiry_and_reusable() {
        let mut pass = monthly();
        assert!(pass.is_valid(at(9)));
        assert!(pass.use_pass(at(9)));
        assert!(pass.use_pass(at(10)));
        assert!(pass.is_valid(at(10)));
        assert!(!pass.is_consumed());

        let expiry = at(8) + Duration::days(30);
        assert!(!pass.is_valid(expiry));
        assert!(pass.is_valid(expiry - Duration::seconds(1)));
    }

    #[test]
    fn single_entry_is_consumed_exactly_once() {
        let mut pass = single();
        assert!(pass.is_valid(at(9)));
        assert!(pass.use_pass(at(9)));
        assert!(pass.is_consumed());
        assert!(!pass.is_valid(at(9)));

        // 第二次使用：返回 false，不改变状态
        let before = pass.clone();
        assert!(!pass.use_pass(at(10)));
        assert_eq!(pass, before);
    }

    #[test]
    fn pass_type_descriptors() {
        assert_eq!(monthly().pass_type(), "Monthly Pass");
        assert_eq!(single().pass_type(), "Single Entry Pass");
    }

    #[test]
    fn days_remaining_counts_whole_days() {
        let pass = monthly();
        assert_eq!(pass.days_remaining(at(8)), Some(30));
        assert_eq!(pass.days_remaining(at(9)), Some(29));
        assert_eq!(pass.days_remaining(at(8) + Duration::days(31)), Some(0));
        assert_eq!(single().days_remaining(at(9)), None);
    }

    #[test]
    fn eligibility_specification_combines_validity_and_binding() {
        let pass = monthly();
        let spec = ValidAt(at(9)).and(BoundTo("XYZ-5678".into()));
        assert!(spec.is_satisfied_by(&pass));

        let wrong_car = ValidAt(at(9)).and(BoundTo("OTHER-1".into()));
        assert!(!wrong_car.is_satisfied_by(&pass));

        let expired = ValidAt(at(8) + Duration::days(40)).and(BoundTo("XYZ-5678".into()));
        assert!(!expired.is_satisfied_by(&pass));
    }

    #[test]
    fn pass_serializes_with_kind_tag() {
        let json = serde_json::to_value(single()).unwrap();
        assert_eq!(json["kind"], "single_entry");
        assert_eq!(json["consumed"], false);
        assert_eq!(json["id"], "SP-0001");
    }
}
