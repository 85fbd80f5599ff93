use std::sync::Arc;

use chrono::Utc;
use teloxide::prelude::*;

use crate::config::Config;
use crate::handlers::admin::is_admin;
use crate::handlers::broadcast::{self, PendingBroadcasts};
use crate::storage::Storage;

pub async fn text_handler(
    bot: Bot,
    msg: Message,
    storage: Arc<Storage>,
    cfg: Arc<Config>,
    pending: Arc<PendingBroadcasts>,
) -> Result<(), anyhow::Error> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    storage.add_user(user_id)?;
    // Every inbound text counts, broadcast-authoring messages included.
    storage.record_message(Utc::now().timestamp())?;

    // The pending entry is consumed whether or not the re-check passes.
    if pending.take(user_id) && is_admin(&cfg, Some(user)) {
        return broadcast::deliver(&bot, &msg, &storage, text).await;
    }

    bot.send_message(msg.chat.id, "👉 Pick an action from the menu below.")
        .await?;
    Ok(())
}
