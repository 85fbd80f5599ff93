use teloxide::types::User;

use crate::config::Config;

/// Checks the sender against the configured admin identity.
///
/// A configured numeric id takes precedence; the handle comparison only
/// applies when no numeric id is set. With neither configured (or an
/// anonymous sender) this always denies.
pub fn is_admin(cfg: &Config, user: Option<&User>) -> bool {
    let Some(user) = user else {
        return false;
    };

    if let Some(admin_id) = cfg.admin_id {
        return user.id.0 == admin_id;
    }

    match (cfg.admin_username.as_deref(), user.username.as_deref()) {
        (Some(admin), Some(username)) => admin.eq_ignore_ascii_case(username),
        _ => false,
    }
}
