pub mod category;
pub mod field;
pub mod value;
