pub mod booking;
pub mod catalog;
pub mod settings;
pub mod view_state;

pub use booking::{ArchivedBooking, Booking, BookingAction, BookingStatus, NewBooking};
pub use catalog::{CategoryGroup, Service, ServiceCategory, Staff};
pub use settings::Settings;
pub use view_state::{Modal, ViewAction, ViewMode, ViewState};
