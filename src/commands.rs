use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "open the main menu.")]
    Start,
    #[command(description = "open the admin panel (admins only).")]
    Adminpanel,
}
