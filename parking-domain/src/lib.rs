//! 停车场领域层（parking-domain）
//!
//! 单一停车场的工单生命周期与计费引擎：
//! - 车辆（`vehicle`）与占用车位数；
//! - 通行证（`pass`）：月卡与单次卡，以及各自的有效性规则；
//! - 计价策略（`pricing`）：按车型查费率表计算计时费用；
//! - 停车工单（`ticket`）：入场到出场的状态机与费用优先级；
//! - 停车场聚合（`parking_lot`）：容量核算、工单与通行证登记表、入场/出场流程。
//!
//! 底层沿用 DDD 构件：`Entity`、`ValueObject`、`Aggregate`（`execute/apply`）、
//! 领域事件信封与规约。所有时间戳均由调用方传入，本 crate 不读取系统时钟，也不输出任何格式化文本。
//!
//! 典型用法：
//! 1. 通过 `ParkingLotConfig` 构建 `ParkingLot`（或用 `SharedParkingLot` 包装后跨线程共享）；
//! 2. 调用 `enter`/`exit` 得到 `Admission`/`Receipt`；
//! 3. 通过 `drain_events` 取出事件交给报表等外部协作方。
//!
pub mod aggregate;
pub mod config;
pub mod domain_event;
pub mod entity;
pub mod error;
pub mod parking_lot;
pub mod pass;
pub mod pricing;
pub mod receipt;
pub mod specification;
pub mod ticket;
pub mod value_object;
pub mod vehicle;

pub use config::ParkingLotConfig;
pub use error::{ParkingError, ParkingResult};
pub use parking_lot::{Admission, LotId, ParkingLot, SharedParkingLot, StatusSnapshot};
pub use pass::{Pass, PassId, PassKind};
pub use pricing::{PricingPlan, PricingStrategy};
pub use receipt::Receipt;
pub use ticket::{FeeBasis, Ticket, TicketId};
pub use vehicle::{Registration, Vehicle, VehicleCategory};

// 允许在本 crate 内部通过 ::parking_domain 进行自引用，
// 以便过程宏生成的路径在本 crate 中也能解析。
extern crate self as parking_domain;
