pub mod ranking;
pub mod view;

pub use view::present;
