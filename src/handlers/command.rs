use std::sync::Arc;

use chrono::Utc;
use teloxide::prelude::*;

use crate::commands::Command;
use crate::config::Config;
use crate::handlers::admin::is_admin;
use crate::handlers::screens::{self, Render};
use crate::storage::Storage;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    storage: Arc<Storage>,
    cfg: Arc<Config>,
) -> Result<(), anyhow::Error> {
    match cmd {
        Command::Start => start(bot, msg, storage).await,
        Command::Adminpanel => adminpanel(bot, msg, storage, cfg).await,
    }
}

async fn start(bot: Bot, msg: Message, storage: Arc<Storage>) -> Result<(), anyhow::Error> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    storage.add_user(user_id)?;
    storage.record_message(Utc::now().timestamp())?;

    // The welcome is sent once, on the transition into "started".
    if !storage.has_started(user_id) {
        storage.mark_started(user_id)?;
        bot.send_message(msg.chat.id, "👋 Welcome! The bot is up and running.")
            .await?;
    }

    screens::main_menu(&bot, Render::Send(msg.chat.id)).await
}

async fn adminpanel(
    bot: Bot,
    msg: Message,
    storage: Arc<Storage>,
    cfg: Arc<Config>,
) -> Result<(), anyhow::Error> {
    if !is_admin(&cfg, msg.from.as_ref()) {
        return screens::access_denied(&bot, Render::Send(msg.chat.id)).await;
    }
    screens::admin_panel(&bot, Render::Send(msg.chat.id), &storage).await
}
