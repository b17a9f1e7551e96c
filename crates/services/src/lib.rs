pub mod calendar;
pub mod dao;
pub mod directory;
pub mod error;
pub mod identity;
pub mod invitation;
pub mod notification;
pub mod reservation;
pub mod store;
pub mod venue;

pub use calendar::SlotCalendar;
pub use dao::*;
pub use directory::UserDirectory;
pub use error::{ServiceError, ServiceResult};
pub use identity::{AuthError, Identity, IdentityGateway};
pub use invitation::InvitationLedger;
pub use notification::{NotificationDispatcher, NotificationSender};
pub use reservation::ReservationEngine;
pub use store::Stores;
pub use venue::VenueClock;
