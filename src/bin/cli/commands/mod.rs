pub mod category;
pub mod export;
pub mod page;
pub mod show;
pub mod tree;
