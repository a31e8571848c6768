pub mod labels;
pub mod table_builder;

pub use table_builder::build_table;
