use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardMarkup, MessageId};

use crate::config::Config;
use crate::handlers::ui;
use crate::storage::{Settings, Storage};

pub const ACCESS_DENIED: &str = "⛔ Access denied.";

/// Button presses edit the existing message in place; commands and plain
/// text produce a fresh message. Same screen either way.
pub enum Render {
    Send(ChatId),
    Edit(ChatId, MessageId),
}

async fn render(
    bot: &Bot,
    target: Render,
    text: String,
    keyboard: InlineKeyboardMarkup,
) -> Result<(), anyhow::Error> {
    match target {
        Render::Send(chat_id) => {
            bot.send_message(chat_id, text).reply_markup(keyboard).await?;
        }
        Render::Edit(chat_id, message_id) => {
            bot.edit_message_text(chat_id, message_id, text)
                .reply_markup(keyboard)
                .await?;
        }
    }
    Ok(())
}

pub async fn main_menu(bot: &Bot, target: Render) -> Result<(), anyhow::Error> {
    render(
        bot,
        target,
        "🧭 You are in the main menu. Pick a section:".to_string(),
        ui::kb_main_menu(),
    )
    .await
}

pub async fn shop(bot: &Bot, target: Render, settings: &Settings) -> Result<(), anyhow::Error> {
    let text = if settings.germany_enabled {
        "🌍 Pick a proxy location:"
    } else {
        "🚫 No proxies available right now."
    };
    render(bot, target, text.to_string(), ui::kb_shop(settings)).await
}

pub async fn germany(bot: &Bot, target: Render, cfg: &Config) -> Result<(), anyhow::Error> {
    let text = "🇩🇪 Germany\n\nTo get a proxy, message the admin 💬.";
    render(bot, target, text.to_string(), ui::kb_germany(cfg)).await
}

pub async fn admin_panel(bot: &Bot, target: Render, storage: &Storage) -> Result<(), anyhow::Error> {
    let settings = storage.settings()?;
    let users = storage.all_users();
    let started = storage.started_count(&users);
    let messages_24h = storage.count_last_24h(Utc::now().timestamp());

    render(
        bot,
        target,
        admin_panel_text(users.len(), started, messages_24h, &settings),
        ui::kb_admin_panel(&settings),
    )
    .await
}

// Computed at render time; nothing here is stored.
fn admin_panel_text(total: usize, started: usize, messages_24h: usize, settings: &Settings) -> String {
    let not_started = total.saturating_sub(started);
    let de_status = if settings.germany_enabled {
        "enabled ✅"
    } else {
        "disabled ❌"
    };
    format!(
        "🛠️ Admin panel\n\n\
         📊 Stats:\n\
         • Users: {total}\n\
         • Pressed start: {started}\n\
         • Not yet started: {not_started}\n\
         • Messages in 24h: {messages_24h}\n\
         • Germany: {de_status}"
    )
}

pub async fn broadcast_prompt(bot: &Bot, target: Render) -> Result<(), anyhow::Error> {
    render(
        bot,
        target,
        "📝 Send the broadcast text as a single message.\n\
         It will be delivered to everyone exactly as written."
            .to_string(),
        ui::kb_back_to_admin(),
    )
    .await
}

pub async fn access_denied(bot: &Bot, target: Render) -> Result<(), anyhow::Error> {
    match target {
        Render::Send(chat_id) => {
            bot.send_message(chat_id, ACCESS_DENIED).await?;
        }
        Render::Edit(chat_id, message_id) => {
            bot.edit_message_text(chat_id, message_id, ACCESS_DENIED).await?;
        }
    }
    Ok(())
}
