use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::pass::PassId;
use crate::pricing::PricingPlan;
use crate::ticket::TicketId;
use crate::vehicle::{Registration, Vehicle};

/// 停车场聚合支持的命令
///
/// 所有时间戳都由调用方给出；`pricing` 为 `None` 时使用停车场默认策略。
#[derive(Debug, Clone)]
pub enum ParkingCommand {
    Enter {
        vehicle: Vehicle,
        pass_id: Option<PassId>,
        entry_time: DateTime<Utc>,
        pricing: Option<PricingPlan>,
    },
    Exit {
        ticket_id: TicketId,
        exit_time: DateTime<Utc>,
        pricing: Option<PricingPlan>,
        duration_override: Option<Decimal>,
    },
    IssueMonthlyPass {
        holder_name: String,
        registration: Registration,
        months: u32,
        issued_at: DateTime<Utc>,
    },
    IssueSinglePass {
        holder_name: String,
        registration: Registration,
        issued_at: DateTime<Utc>,
    },
}

impl ParkingCommand {
    /// 命令携带的业务时间，用作事件发生时间
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::Enter { entry_time, .. } => *entry_time,
            Self::Exit { exit_time, .. } => *exit_time,
            Self::IssueMonthlyPass { issued_at, .. } | Self::IssueSinglePass { issued_at, .. } => {
                *issued_at
            }
        }
    }
}
