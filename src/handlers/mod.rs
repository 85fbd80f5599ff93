pub mod admin;
pub mod broadcast;
pub mod callback;
pub mod command;
pub mod screens;
pub mod text;
pub mod ui;

pub use broadcast::PendingBroadcasts;
pub use callback::callback_handler;
pub use command::command_handler;
pub use text::text_handler;
