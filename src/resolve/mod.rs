//! 实体与日期解析：自然语言引用 -> 规范标识符

pub mod catalog;
pub mod dates;
pub mod entities;

pub use dates::{resolve_dates, DateRange};
pub use entities::resolve_clients;
