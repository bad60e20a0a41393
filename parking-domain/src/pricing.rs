//! 计价策略
//!
//! 各策略只在费率表上不同：新增策略 = 提供一张新的 `RateTable`，不写新逻辑。
//! 费率表未覆盖的车型使用表内默认费率。
//!
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::vehicle::VehicleCategory;

/// 每小时费率表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(default)]
    pub car: Option<Decimal>,
    #[serde(default)]
    pub motorcycle: Option<Decimal>,
    #[serde(default)]
    pub truck: Option<Decimal>,
    /// 未覆盖车型使用的费率
    pub default_rate: Decimal,
}

impl RateTable {
    pub const fn new(car: Decimal, motorcycle: Decimal, truck: Decimal, default_rate: Decimal) -> Self {
        Self {
            car: Some(car),
            motorcycle: Some(motorcycle),
            truck: Some(truck),
            default_rate,
        }
    }

    pub fn rate_for(&self, category: VehicleCategory) -> Decimal {
        let rate = match category {
            VehicleCategory::Car => self.car,
            VehicleCategory::Motorcycle => self.motorcycle,
            VehicleCategory::Truck => self.truck,
        };
        rate.unwrap_or(self.default_rate)
    }
}

const STANDARD: &str = "Standard";
const PEAK: &str = "Peak Hours";
const WEEKEND: &str = "Weekend";

pub const STANDARD_RATES: RateTable = RateTable::new(dec!(2.00), dec!(1.00), dec!(3.00), dec!(2.00));
pub const PEAK_RATES: RateTable = RateTable::new(dec!(4.00), dec!(2.00), dec!(6.00), dec!(4.00));
pub const WEEKEND_RATES: RateTable = RateTable::new(dec!(1.50), dec!(0.75), dec!(2.25), dec!(1.50));

/// 计价能力
pub trait PricingStrategy: fmt::Debug + Send + Sync {
    /// 策略名称（用于回执）
    fn name(&self) -> &str;

    fn rate_table(&self) -> &RateTable;

    fn hourly_rate(&self, category: VehicleCategory) -> Decimal {
        self.rate_table().rate_for(category)
    }

    /// 计时费用：`round(费率 × 小时数, 2)`
    fn calculate_fee(&self, category: VehicleCategory, duration_hours: Decimal) -> Decimal {
        (self.hourly_rate(category) * duration_hours).round_dp(2)
    }
}

/// 自定义费率表策略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPricing {
    pub name: String,
    pub rates: RateTable,
}

impl PricingStrategy for CustomPricing {
    fn name(&self) -> &str {
        &self.name
    }

    fn rate_table(&self) -> &RateTable {
        &self.rates
    }
}

/// 策略选择：内置 Standard/Peak/Weekend 三张费率表，或一张自定义表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "plan", rename_all = "snake_case")]
pub enum PricingPlan {
    #[default]
    Standard,
    Peak,
    Weekend,
    Custom(CustomPricing),
}

impl PricingStrategy for PricingPlan {
    fn name(&self) -> &str {
        match self {
            Self::Standard => STANDARD,
            Self::Peak => PEAK,
            Self::Weekend => WEEKEND,
            Self::Custom(custom) => custom.name(),
        }
    }

    fn rate_table(&self) -> &RateTable {
        match self {
            Self::Standard => &STANDARD_RATES,
            Self::Peak => &PEAK_RATES,
            Self::Weekend => &WEEKEND_RATES,
            Self::Custom(custom) => custom.rate_table(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_car_three_and_a_half_hours() {
        let fee = PricingPlan::Standard.calculate_fee(VehicleCategory::Car, dec!(3.5));
        assert_eq!(fee, dec!(7.00));
    }

    #[test]
    fn peak_truck_four_hours() {
        let fee = PricingPlan::Peak.calculate_fee(VehicleCategory::Truck, dec!(4.0));
        assert_eq!(fee, dec!(24.00));
    }

    #[test]
    fn weekend_motorcycle_five_hours() {
        let fee = PricingPlan::Weekend.calculate_fee(VehicleCategory::Motorcycle, dec!(5.0));
        assert_eq!(fee, dec!(3.75));
    }

    #[test]
    fn fee_is_rounded_to_cents() {
        // 0.75 × 1.33 = 0.9975
        let fee = PricingPlan::Weekend.calculate_fee(VehicleCategory::Motorcycle, dec!(1.33));
        assert_eq!(fee, dec!(1.00));
    }

    #[test]
    fn strategy_names() {
        assert_eq!(PricingPlan::Standard.name(), "Standard");
        assert_eq!(PricingPlan::Peak.name(), "Peak Hours");
        assert_eq!(PricingPlan::Weekend.name(), "Weekend");
    }

    #[test]
    fn missing_category_falls_back_to_default_rate() {
        let custom = CustomPricing {
            name: "Night".into(),
            rates: RateTable {
                car: Some(dec!(0.50)),
                motorcycle: None,
                truck: None,
                default_rate: dec!(0.80),
            },
        };
        assert_eq!(custom.hourly_rate(VehicleCategory::Car), dec!(0.50));
        assert_eq!(custom.hourly_rate(VehicleCategory::Truck), dec!(0.80));
        assert_eq!(custom.calculate_fee(VehicleCategory::Motorcycle, dec!(2)), dec!(1.60));
    }

    #[test]
    fn plan_dispatches_to_rate_tables() {
        let plan: PricingPlan = serde_json::from_str(r#"{"plan":"peak"}"#).unwrap();
        assert_eq!(plan.name(), "Peak Hours");
        assert_eq!(plan.rate_table(), &PEAK_RATES);

        let plan: PricingPlan = serde_json::from_str(
            r#"{"plan":"custom","name":"Event","rates":{"car":"5.00","default_rate":"5.00"}}"#,
        )
        .unwrap();
        assert_eq!(plan.name(), "Event");
        assert_eq!(plan.hourly_rate(VehicleCategory::Truck), dec!(5.00));
        assert_eq!(plan.calculate_fee(VehicleCategory::Car, dec!(1.5)), dec!(7.50));
    }
}
