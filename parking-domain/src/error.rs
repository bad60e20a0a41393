//! 领域层统一错误定义
//!
//! 业务上可预期的失败（容量耗尽、工单不存在）都是一等结果，调用方必须处理；
//! 通行证无效属于软条件，不在此列（见 `parking_lot::PassRejection`）。
//!
use thiserror::Error;

use crate::ticket::TicketId;
use crate::vehicle::Registration;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ParkingError {
    // --- 入场/出场 ---
    #[error("capacity exhausted: needed={needed}, available={available}")]
    CapacityExhausted { needed: u32, available: u32 },
    #[error("vehicle {registration} is already parked on {ticket_id}")]
    VehicleAlreadyParked {
        registration: Registration,
        ticket_id: TicketId,
    },
    #[error("ticket not found: {ticket_id}")]
    TicketNotFound { ticket_id: TicketId },
    #[error("ticket already closed: {ticket_id}")]
    TicketClosed { ticket_id: TicketId },

    // --- 值校验 ---
    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },
    #[error("parse error: {reason}")]
    Parse { reason: String },

    // --- 配置 ---
    #[error("config error: {reason}")]
    Config { reason: String },
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
}

/// 统一 Result 类型别名
pub type ParkingResult<T> = Result<T, ParkingError>;

impl From<std::num::ParseIntError> for ParkingError {
    fn from(err: std::num::ParseIntError) -> Self {
        ParkingError::Parse {
            reason: err.to_string(),
        }
    }
}
