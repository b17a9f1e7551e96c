pub mod base;
pub mod invitation;
pub mod notification;
pub mod reservation;
pub mod slot;
pub mod user;

pub use base::{BaseDao, DaoError, DaoResult};
