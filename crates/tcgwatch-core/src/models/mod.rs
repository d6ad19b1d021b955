pub mod catalog;
pub mod price;
pub mod product;
pub mod sync_run;
