//! 车辆
//!
//! 车辆是不可变的值：车牌 + 车型。车型决定占用车位数（货车 2 个，其余 1 个）。
//!
use std::fmt;

use parking_macros::value_object;

use crate::error::{ParkingError, ParkingResult};
use crate::value_object::ValueObject;

/// 车型
#[value_object(default = false)]
#[derive(Copy, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    Car,
    Motorcycle,
    Truck,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 3] = [Self::Car, Self::Motorcycle, Self::Truck];

    /// 该车型需要占用的车位数
    pub const fn spaces_required(self) -> u32 {
        match self {
            Self::Car | Self::Motorcycle => 1,
            Self::Truck => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Motorcycle => "Motorcycle",
            Self::Truck => "Truck",
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 车牌号
#[value_object]
#[derive(Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Registration(String);

impl Registration {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Registration {
    type Error = ParkingError;

    fn validate(&self) -> ParkingResult<()> {
        if self.0.trim().is_empty() {
            return Err(ParkingError::InvalidValue {
                reason: "registration must not be blank".into(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Registration {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Registration {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for Registration {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// 车辆
#[value_object(default = false)]
pub struct Vehicle {
    registration: Registration,
    category: VehicleCategory,
}

impl Vehicle {
    pub fn new(registration: impl Into<Registration>, category: VehicleCategory) -> Self {
        Self {
            registration: registration.into(),
            category,
        }
    }

    pub fn car(registration: impl Into<Registration>) -> Self {
        Self::new(registration, VehicleCategory::Car)
    }

    pub fn motorcycle(registration: impl Into<Registration>) -> Self {
        Self::new(registration, VehicleCategory::Motorcycle)
    }

    pub fn truck(registration: impl Into<Registration>) -> Self {
        Self::new(registration, VehicleCategory::Truck)
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    pub fn category(&self) -> VehicleCategory {
        self.category
    }

    pub fn spaces_required(&self) -> u32 {
        self.category.spaces_required()
    }
}

impl ValueObject for Vehicle {
    type Error = ParkingError;

    fn validate(&self) -> ParkingResult<()> {
        self.registration.validate()
    }
}
