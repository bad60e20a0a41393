use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain_event::DomainEvent;
use crate::pass::{Pass, PassId};
use crate::receipt::Receipt;
use crate::ticket::{Ticket, TicketId};

/// 入场时请求的通行证未能绑定的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassRejectionReason {
    /// 登记表中没有该编号
    Unknown,
    /// 已过期或已用完
    NotValid,
    /// 绑定的车牌与入场车辆不一致
    RegistrationMismatch,
}

/// 通行证未能绑定（软条件，入场照常按计时计费）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassRejection {
    pub pass_id: PassId,
    pub reason: PassRejectionReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParkingEvent {
    PassIssued {
        aggregate_version: usize,
        pass: Pass,
    },
    VehicleAdmitted {
        aggregate_version: usize,
        ticket: Ticket,
    },
    PassRejected {
        aggregate_version: usize,
        ticket_id: TicketId,
        rejection: PassRejection,
    },
    SingleEntryPassConsumed {
        aggregate_version: usize,
        pass_id: PassId,
        consumed_at: DateTime<Utc>,
    },
    VehicleReleased {
        aggregate_version: usize,
        ticket: Ticket,
        receipt: Receipt,
    },
}

impl DomainEvent for ParkingEvent {
    fn event_id(&self) -> String {
        format!("evt-{:06}", self.aggregate_version())
    }

    fn event_type(&self) -> &'static str {
        match self {
            Self::PassIssued { .. } => "ParkingEvent.PassIssued",
            Self::VehicleAdmitted { .. } => "ParkingEvent.VehicleAdmitted",
            Self::PassRejected { .. } => "ParkingEvent.PassRejected",
            Self::SingleEntryPassConsumed { .. } => "ParkingEvent.SingleEntryPassConsumed",
            Self::VehicleReleased { .. } => "ParkingEvent.VehicleReleased",
        }
    }

    fn aggregate_version(&self) -> usize {
        match self {
            Self::PassIssued {
                aggregate_version, ..
            }
            | Self::VehicleAdmitted {
                aggregate_version, ..
            }
            | Self::PassRejected {
                aggregate_version, ..
            }
            | Self::SingleEntryPassConsumed {
                aggregate_version, ..
            }
            | Self::VehicleReleased {
                aggregate_version, ..
            } => *aggregate_version,
        }
    }
}
