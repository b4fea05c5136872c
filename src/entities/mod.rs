pub mod discussion;
pub mod read_state;
