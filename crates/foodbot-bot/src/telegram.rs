//! Telegram binding of the dialogue controller.
//!
//! Text messages go to [`DialogueController::handle`], inline button presses
//! to [`DialogueController::handle_selection`]. Users are identified by their
//! Telegram username.

use crate::error::BotResult;
use foodbot_dialogue::{DialogueController, DialogueError, QuickChoice, Reply};
use std::error::Error;
use std::sync::Arc;
use teloxide::{
    dispatching::UpdateHandler,
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode, ReplyParameters, User},
    utils::command::BotCommands,
};
use tracing::{debug, error, info};

type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Reply to senders without a username.
pub const NO_USERNAME: &str = "Set a Telegram username to use this bot.";

/// Commands advertised in the Telegram menu.
#[allow(missing_docs)]
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum MenuCommand {
    #[command(description = "register and set your daily limit")]
    Start,
    #[command(description = "change your daily limit")]
    Limit,
    #[command(description = "report food you have eaten")]
    Add,
    #[command(description = "show today's report")]
    Stat,
    #[command(description = "show the last seven days")]
    Stat7,
    #[command(description = "cancel the current step")]
    Cancel,
}

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct Transport {
    controller: Arc<DialogueController>,
    debug: bool,
}

impl Transport {
    /// Wraps the controller; `debug` logs every inbound update at info level.
    pub const fn new(controller: Arc<DialogueController>, debug: bool) -> Self {
        Self { controller, debug }
    }

    fn log_inbound(&self, user: &str, text: &str) {
        if self.debug {
            info!(user, text, "Inbound update");
        } else {
            debug!(user, text, "Inbound update");
        }
    }
}

/// The name the dialogue knows `user` by.
pub fn sender_name(user: Option<&User>) -> Option<String> {
    user.and_then(|u| u.username.clone())
        .filter(|name| !name.is_empty())
}

/// Inline keyboard with one button per row, or `None` without choices.
pub fn keyboard(choices: &[QuickChoice]) -> Option<InlineKeyboardMarkup> {
    if choices.is_empty() {
        return None;
    }

    Some(InlineKeyboardMarkup::new(choices.iter().map(|choice| {
        vec![InlineKeyboardButton::callback(
            choice.label.clone(),
            choice.payload.clone(),
        )]
    })))
}

/// Update routing tree.
pub fn schema() -> UpdateHandler<Box<dyn Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(message_handler))
        .branch(Update::filter_callback_query().endpoint(callback_handler))
}

/// Registers the command menu and dispatches updates until Ctrl-C.
pub async fn run(bot: Bot, transport: Transport) -> BotResult<()> {
    bot.set_my_commands(MenuCommand::bot_commands()).await?;

    info!("Starting Telegram dispatcher");
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![transport])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    info!("Telegram dispatcher stopped");

    Ok(())
}

async fn message_handler(bot: Bot, msg: Message, transport: Transport) -> HandlerResult {
    let Some(text) = msg.text() else {
        debug!(chat = %msg.chat.id, "Ignoring non-text message");
        return Ok(());
    };
    let Some(name) = sender_name(msg.from.as_ref()) else {
        send_reply(&bot, msg.chat.id, &Reply::plain(NO_USERNAME), Some(msg.id)).await?;
        return Ok(());
    };
    transport.log_inbound(&name, text);

    match transport.controller.handle(&name, text).await {
        Ok(reply) => send_reply(&bot, msg.chat.id, &reply, None).await,
        Err(err) => {
            log_failure(&name, &err);
            send_reply(&bot, msg.chat.id, &err.reply(), Some(msg.id)).await
        }
    }
}

async fn callback_handler(bot: Bot, q: CallbackQuery, transport: Transport) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
        debug!("Ignoring callback without a message");
        return Ok(());
    };
    let Some(payload) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(name) = sender_name(Some(&q.from)) else {
        send_reply(&bot, chat_id, &Reply::plain(NO_USERNAME), None).await?;
        return Ok(());
    };
    transport.log_inbound(&name, payload);

    let reply = match transport.controller.handle_selection(&name, payload).await {
        Ok(reply) => reply,
        Err(err) => {
            log_failure(&name, &err);
            err.reply()
        }
    };
    send_reply(&bot, chat_id, &reply, None).await
}

fn log_failure(user: &str, err: &DialogueError) {
    match err {
        DialogueError::Persistence(source) => error!(user, error = %source, "Failed to handle update"),
        other => debug!(user, error = %other, "Rejected update"),
    }
}

async fn send_reply(
    bot: &Bot,
    chat_id: ChatId,
    reply: &Reply,
    reply_to: Option<MessageId>,
) -> HandlerResult {
    let mut request = bot.send_message(chat_id, reply.text.clone());
    if reply.structured {
        request = request.parse_mode(ParseMode::MarkdownV2);
    }
    if let Some(markup) = keyboard(&reply.choices) {
        request = request.reply_markup(markup);
    }
    if let Some(message_id) = reply_to {
        request = request.reply_parameters(ReplyParameters::new(message_id));
    }
    request.await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_one_button_per_row() {
        assert!(keyboard(&[]).is_none());

        let choices = vec![
            QuickChoice {
                label: "apple".to_string(),
                payload: r#"{"t":"p","n":"apple","k":52}"#.to_string(),
            },
            QuickChoice {
                label: "bread".to_string(),
                payload: r#"{"t":"p","n":"bread","k":265}"#.to_string(),
            },
        ];
        let markup = keyboard(&choices).unwrap();

        assert_eq!(markup.inline_keyboard.len(), 2);
        assert!(markup.inline_keyboard.iter().all(|row| row.len() == 1));
        assert_eq!(markup.inline_keyboard[1][0].text, "bread");
    }

    #[test]
    fn test_menu_commands() {
        assert_eq!(
            MenuCommand::parse("/stat7", "foodbot").unwrap(),
            MenuCommand::Stat7
        );
        assert_eq!(
            MenuCommand::parse("/cancel@foodbot", "foodbot").unwrap(),
            MenuCommand::Cancel
        );

        let names: Vec<String> = MenuCommand::bot_commands()
            .into_iter()
            .map(|command| command.command.trim_start_matches('/').to_string())
            .collect();
        assert_eq!(names, ["start", "limit", "add", "stat", "stat7", "cancel"]);
    }

    #[test]
    fn test_sender_name_requires_username() {
        assert_eq!(sender_name(None), None);
    }
}
