// WebSocket adapter for raid clients.

pub mod client;
pub mod fanout;

pub use client::ws_handler;
pub use fanout::room_update_serializer;
