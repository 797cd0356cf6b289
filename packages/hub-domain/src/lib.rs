pub mod blog;
pub mod bucket_list;
pub mod dashboard;
pub mod dating_ideas;
pub mod dating_journal;
pub mod events;
pub mod filter;
pub mod time_serde;
pub mod writegate;

pub use filter::Filter;
pub use writegate::{Gate, RejectCode, Rejection};
