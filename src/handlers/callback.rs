use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::CallbackQuery;

use crate::config::Config;
use crate::handlers::admin::is_admin;
use crate::handlers::broadcast::PendingBroadcasts;
use crate::handlers::screens::{self, Render};
use crate::handlers::ui;
use crate::storage::Storage;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    storage: Arc<Storage>,
    cfg: Arc<Config>,
    pending: Arc<PendingBroadcasts>,
) -> Result<(), anyhow::Error> {
    bot.answer_callback_query(q.id).await?;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    log::info!("Received callback query with data: {}", data);

    let Some(message) = q.message.as_ref().and_then(|m| m.regular_message()) else {
        return Ok(());
    };
    let target = Render::Edit(message.chat.id, message.id);
    let admin = is_admin(&cfg, Some(&q.from));

    match data {
        ui::CB_SHOP | ui::CB_BACK_SHOP => {
            screens::shop(&bot, target, &storage.settings()?).await
        }
        ui::CB_SHOP_DE => screens::germany(&bot, target, &cfg).await,
        ui::CB_BACK_MAIN => screens::main_menu(&bot, target).await,
        ui::CB_BACK_ADMIN => {
            // Non-admins fall back to the main menu instead of seeing the panel.
            if admin {
                screens::admin_panel(&bot, target, &storage).await
            } else {
                screens::main_menu(&bot, target).await
            }
        }
        ui::CB_ADMIN_TOGGLE_DE => {
            if admin {
                storage.toggle_germany()?;
                screens::admin_panel(&bot, target, &storage).await
            } else {
                screens::access_denied(&bot, target).await
            }
        }
        ui::CB_ADMIN_BROADCAST => {
            if admin {
                pending.begin(q.from.id.0 as i64);
                screens::broadcast_prompt(&bot, target).await
            } else {
                screens::access_denied(&bot, target).await
            }
        }
        // Unrecognized payloads are a no-op; the query was already answered.
        _ => Ok(()),
    }
}
