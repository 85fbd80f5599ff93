use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use url::Url;

use crate::config::Config;
use crate::storage::Settings;

pub const CB_SHOP: &str = "shop";
pub const CB_SHOP_DE: &str = "shop_de";
pub const CB_BACK_MAIN: &str = "back_main";
pub const CB_BACK_SHOP: &str = "back_shop";
pub const CB_BACK_ADMIN: &str = "back_admin";
pub const CB_ADMIN_TOGGLE_DE: &str = "admin_toggle_de";
pub const CB_ADMIN_BROADCAST: &str = "admin_broadcast";

pub const BTN_BACK: &str = "◀️ Back";

pub fn kb_main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "🛍 Proxy shop",
        CB_SHOP,
    )]])
}

/// Shop rows depend on the live settings snapshot passed in by the caller.
pub fn kb_shop(settings: &Settings) -> InlineKeyboardMarkup {
    let mut rows = Vec::new();
    if settings.germany_enabled {
        rows.push(vec![InlineKeyboardButton::callback(
            "🇩🇪 Germany",
            CB_SHOP_DE,
        )]);
    }
    rows.push(vec![InlineKeyboardButton::callback(BTN_BACK, CB_BACK_MAIN)]);
    InlineKeyboardMarkup::new(rows)
}

/// The contact row is only present when an admin handle is configured.
pub fn kb_germany(cfg: &Config) -> InlineKeyboardMarkup {
    let mut rows = Vec::new();
    let contact = cfg
        .admin_username
        .as_deref()
        .and_then(|name| Url::parse(&format!("https://t.me/{name}")).ok());
    if let Some(contact) = contact {
        rows.push(vec![InlineKeyboardButton::url("✉️ Message the admin", contact)]);
    }
    rows.push(vec![InlineKeyboardButton::callback(BTN_BACK, CB_BACK_SHOP)]);
    InlineKeyboardMarkup::new(rows)
}

pub fn kb_admin_panel(settings: &Settings) -> InlineKeyboardMarkup {
    let toggle_label = if settings.germany_enabled {
        "🇩🇪 Hide the 'Germany' category"
    } else {
        "🇩🇪 Show the 'Germany' category"
    };
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(toggle_label, CB_ADMIN_TOGGLE_DE)],
        vec![InlineKeyboardButton::callback("📣 Broadcast", CB_ADMIN_BROADCAST)],
        vec![InlineKeyboardButton::callback(BTN_BACK, CB_BACK_MAIN)],
    ])
}

pub fn kb_back_to_admin() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        BTN_BACK,
        CB_BACK_ADMIN,
    )]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button_texts(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .map(|b| b.text.clone())
            .collect()
    }

    #[test]
    fn test_shop_keyboard_hides_germany_when_disabled() {
        let enabled = kb_shop(&Settings {
            germany_enabled: true,
        });
        assert_eq!(button_texts(&enabled), vec!["🇩🇪 Germany", BTN_BACK]);

        let disabled = kb_shop(&Settings {
            germany_enabled: false,
        });
        assert_eq!(button_texts(&disabled), vec![BTN_BACK]);
    }

    #[test]
    fn test_admin_panel_toggle_label_follows_flag() {
        let enabled = kb_admin_panel(&Settings {
            germany_enabled: true,
        });
        assert!(button_texts(&enabled)[0].contains("Hide"));

        let disabled = kb_admin_panel(&Settings {
            germany_enabled: false,
        });
        assert!(button_texts(&disabled)[0].contains("Show"));
    }

    #[test]
    fn test_germany_keyboard_without_admin_handle() {
        let cfg = Config::default();
        assert_eq!(button_texts(&kb_germany(&cfg)), vec![BTN_BACK]);

        let cfg = Config {
            admin_username: Some("boss".to_string()),
            ..Config::default()
        };
        assert_eq!(
            button_texts(&kb_germany(&cfg)),
            vec!["✉️ Message the admin", BTN_BACK]
        );
    }
}
