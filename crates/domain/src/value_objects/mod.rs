pub mod percentage;
pub mod tick_range;

pub use percentage::FeePercent;
pub use tick_range::TickRange;
