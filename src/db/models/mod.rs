mod availability;
mod booking;
mod event_type;

pub use availability::*;
pub use booking::*;
pub use event_type::*;
