pub mod file;
pub mod keywords;
pub mod selection;
