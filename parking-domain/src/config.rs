//! 停车场配置
//!
//! 既可通过 builder 在代码中组装，也可从 JSON 反序列化；两种方式都应在使用前 `validate`。
//!
use bon::Builder;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{ParkingError, ParkingResult};
use crate::parking_lot::LotId;
use crate::pricing::PricingPlan;
use crate::value_object::ValueObject;

pub const DEFAULT_TOTAL_CAPACITY: u32 = 300;
pub const DEFAULT_SINGLE_ENTRY_FLAT_FEE: Decimal = dec!(10.00);
pub const DEFAULT_DAYS_PER_MONTH: u32 = 30;
pub const DEFAULT_EVENT_BUFFER_CAPACITY: usize = 1024;

#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkingLotConfig {
    #[builder(into, default = LotId::new("main"))]
    pub lot_id: LotId,
    #[builder(default = DEFAULT_TOTAL_CAPACITY)]
    pub total_capacity: u32,
    #[builder(default)]
    pub default_pricing: PricingPlan,
    /// 单次卡的固定费用
    #[builder(default = DEFAULT_SINGLE_ENTRY_FLAT_FEE)]
    pub single_entry_flat_fee: Decimal,
    /// 月卡按每月多少天计算有效期
    #[builder(default = DEFAULT_DAYS_PER_MONTH)]
    pub days_per_month: u32,
    /// 未取出事件的保留上限，超出后丢弃最旧的事件
    #[builder(default = DEFAULT_EVENT_BUFFER_CAPACITY)]
    pub event_buffer_capacity: usize,
}

impl Default for ParkingLotConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ParkingLotConfig {
    /// 从 JSON 文本加载，缺省字段取默认值
    pub fn from_json(text: &str) -> ParkingResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

impl ValueObject for ParkingLotConfig {
    type Error = ParkingError;

    fn validate(&self) -> ParkingResult<()> {
        if self.total_capacity == 0 {
            return Err(ParkingError::Config {
                reason: "total_capacity must be > 0".into(),
            });
        }
        if self.days_per_month == 0 {
            return Err(ParkingError::Config {
                reason: "days_per_month must be > 0".into(),
            });
        }
        if self.single_entry_flat_fee.is_sign_negative() {
            return Err(ParkingError::Config {
                reason: "single_entry_flat_fee must not be negative".into(),
            });
        }
        Ok(())
    }
}
