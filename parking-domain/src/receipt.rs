//! 出场回执
//!
//! 出场时生成的不可变记录，交给外部报表协作方渲染；领域层不做任何格式化。
//!
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pass::PassId;
use crate::ticket::{FeeBasis, TicketId};
use crate::vehicle::{Registration, VehicleCategory};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    pub pass_id: PassId,
    pub pass_type: String,
    /// 结算后该卡是否已用完（仅单次卡可能为 true）
    pub consumed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub ticket_id: TicketId,
    pub registration: Registration,
    pub category: VehicleCategory,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub duration_hours: Decimal,
    pub pricing: String,
    pub hourly_rate: Decimal,
    pub fee: Decimal,
    pub basis: FeeBasis,
    pub spaces_released: u32,
    pub pass: Option<PassSummary>,
}
