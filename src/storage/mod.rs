pub mod config;
pub mod cursor;
pub mod pager;
pub mod table;
