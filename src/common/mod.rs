pub mod constants;
pub mod document;
pub mod sort_order;
pub mod value;

pub use constants::*;
pub use document::Document;
pub use sort_order::SortOrder;
pub use value::Value;
