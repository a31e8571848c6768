pub mod discord;
pub mod log_notifier;
pub mod telegram;

pub use discord::DiscordNotifier;
pub use log_notifier::{LogNotifier, NullNotifier};
pub use telegram::TelegramNotifier;
