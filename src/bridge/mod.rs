pub mod events;
pub mod manager;
pub mod matrix;
pub mod noop;

pub use events::RoomActivityEvent;
