pub mod invitation;
pub mod notification;
pub mod reservation;
pub mod reservation_slot;
pub mod user;

pub use invitation::Invitation;
pub use notification::{DeliveryStatus, Notification, NotificationType};
pub use reservation::{Reservation, ReservationStatus};
pub use reservation_slot::ReservationSlot;
pub use user::{Role, User, UserStatus};
