//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals.

pub mod beam;
pub mod frame_tick;
pub mod player;
pub mod uart_rx;

pub use beam::beam_task;
pub use frame_tick::frame_tick_task;
pub use player::player_task;
pub use uart_rx::uart_rx_task;
