pub mod availability;
pub mod bookings;
pub mod events;
