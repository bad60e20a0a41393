//! 停车场领域层的过程宏
//!
//! - `#[entity_id]`：为实体标识（工单号、通行证号）生成文本化、序号化等样板实现；
//! - `#[value_object]`：为值对象合并统一的派生集合。
//!
//! 生成代码通过 `::parking_domain` 绝对路径引用领域层类型。
use proc_macro::TokenStream;

mod derive_utils;
mod entity_id;
mod value_object;

/// 实体 ID 宏
///
/// ```ignore
/// #[entity_id(prefix = "TKT")]
/// pub struct TicketId(u32); // 文本形式 TKT-0001
///
/// #[entity_id]
/// pub struct PassId(String);
/// ```
#[proc_macro_attribute]
pub fn entity_id(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity_id::expand(attr, item)
}

/// 值对象宏：追加 Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq 派生
///
/// 参数 `debug = false`、`default = false` 可关闭对应派生。
#[proc_macro_attribute]
pub fn value_object(attr: TokenStream, item: TokenStream) -> TokenStream {
    value_object::expand(attr, item)
}
