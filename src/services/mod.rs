pub mod bookings;
pub mod calendar;
pub mod emails;
pub mod lifecycle;
pub mod notify;
pub mod sweep;
