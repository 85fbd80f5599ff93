use std::collections::HashSet;
use std::future::Future;
use std::sync::Mutex;

use teloxide::prelude::*;
use teloxide::types::ChatId;

use crate::handlers::ui;
use crate::storage::Storage;

/// Admins whose next text message is the broadcast body.
///
/// In-memory only: lost on restart, which is fine — the admin just presses
/// the broadcast button again.
#[derive(Default)]
pub struct PendingBroadcasts {
    inner: Mutex<HashSet<i64>>,
}

impl PendingBroadcasts {
    /// Idempotent insert.
    pub fn begin(&self, admin_id: i64) {
        self.inner.lock().unwrap().insert(admin_id);
    }

    /// Removes the entry and reports whether it was present.
    pub fn take(&self, admin_id: i64) -> bool {
        self.inner.lock().unwrap().remove(&admin_id)
    }
}

/// Attempts delivery to every recipient independently; a failure is counted
/// and logged but never aborts the remaining fan-out. Returns (sent, errors).
pub async fn fan_out<F, Fut, E>(user_ids: &[i64], mut send: F) -> (u32, u32)
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let mut sent = 0u32;
    let mut errors = 0u32;
    for &user_id in user_ids {
        match send(user_id).await {
            Ok(()) => sent += 1,
            Err(e) => {
                log::warn!("Failed to deliver broadcast to {}: {}", user_id, e);
                errors += 1;
            }
        }
    }
    (sent, errors)
}

/// Sends the admin's text to the whole registry and reports the tallies.
/// Best effort: no retry, no record of who actually received it.
pub async fn deliver(
    bot: &Bot,
    msg: &Message,
    storage: &Storage,
    text: &str,
) -> Result<(), anyhow::Error> {
    let settings = storage.settings()?;
    bot.send_message(msg.chat.id, "📨 Sending the broadcast…")
        .reply_markup(ui::kb_admin_panel(&settings))
        .await?;

    let users = storage.all_users();
    let (sent, errors) = fan_out(&users, |user_id| {
        let bot = bot.clone();
        let text = text.to_string();
        async move { bot.send_message(ChatId(user_id), text).await.map(|_| ()) }
    })
    .await;

    bot.send_message(
        msg.chat.id,
        format!("✅ Done. Delivered: {}, errors: {}.", sent, errors),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_pending_set_insert_and_take() {
        let pending = PendingBroadcasts::default();
        pending.begin(42);
        pending.begin(42);
        assert!(pending.take(42));
        assert!(!pending.take(42));
        assert!(!pending.take(7));
    }

    #[tokio::test]
    async fn test_fan_out_isolates_failures() {
        let users = vec![1, 2, 3];
        let delivered = RefCell::new(Vec::new());

        let (sent, errors) = fan_out(&users, |user_id| {
            let delivered = &delivered;
            async move {
                if user_id == 2 {
                    Err("simulated delivery failure")
                } else {
                    delivered.borrow_mut().push(user_id);
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!((sent, errors), (2, 1));
        assert_eq!(delivered.into_inner(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_fan_out_empty_registry() {
        let (sent, errors) =
            fan_out(&[], |_| async move { Ok::<(), &str>(()) }).await;
        assert_eq!((sent, errors), (0, 0));
    }

    #[tokio::test]
    async fn test_fan_out_all_failures() {
        let users = vec![1, 2, 3];
        let (sent, errors) =
            fan_out(&users, |_| async move { Err::<(), _>("down") }).await;
        assert_eq!((sent, errors), (0, 3));
    }
}
