//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值与校验逻辑。
//!
use parking_macros::value_object;

/// 值对象抽象
pub trait ValueObject {
    /// 业务校验失败时的错误类型
    type Error;

    /// 校验值是否满足业务约束
    fn validate(&self) -> Result<(), Self::Error>;
}

/// 聚合版本号：已应用的领域事件数
///
/// ```
/// use parking_domain::value_object::Version;
///
/// let v = Version::new().next();
/// assert_eq!(v.value(), 1);
/// assert!(v > Version::new());
/// ```
#[value_object]
#[derive(Copy, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Version(usize);

impl Version {
    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn from_value(value: usize) -> Self {
        Self(value)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub const fn value(&self) -> usize {
        self.0
    }
}
