//! Slash commands recognised in chat

pub mod help;

pub use help::HelpBook;

use crate::chat::Message;
use crate::game::PlayRequest;

pub const PLAY_CHESS: &str = "/playchess";
pub const HELP: &str = "/help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    PlayChess { args: Vec<String> },
    Help { topic: Option<String> },
}

impl Command {
    /// Reads a command from message content. Anything else is `None`.
    pub fn parse(content: &str) -> Option<Command> {
        let mut words = content.split_whitespace();
        let command = words.next()?;
        let args: Vec<String> = words.map(str::to_string).collect();

        match command {
            PLAY_CHESS => Some(Command::PlayChess { args }),
            HELP => Some(Command::Help {
                topic: args.into_iter().next(),
            }),
            _ => None,
        }
    }

    /// Reads a command from an inbound message
    pub fn from_message(message: &Message) -> Option<Command> {
        message.content.as_deref().and_then(Command::parse)
    }
}

impl PlayRequest {
    pub fn from_message(message: &Message, args: Vec<String>) -> Self {
        Self {
            channel_id: message.channel_id.clone(),
            message_id: message.id.clone(),
            author_id: message.author_id.clone(),
            args,
            mentions: message.mentions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_chess_arguments() {
        assert_eq!(
            Command::parse("/playchess white <@01BOB>"),
            Some(Command::PlayChess {
                args: vec!["white".into(), "<@01BOB>".into()]
            })
        );
        assert_eq!(
            Command::parse("/playchess"),
            Some(Command::PlayChess { args: vec![] })
        );
    }

    #[test]
    fn test_help_topic() {
        assert_eq!(Command::parse("/help"), Some(Command::Help { topic: None }));
        assert_eq!(
            Command::parse("/help playchess extra"),
            Some(Command::Help {
                topic: Some("playchess".into())
            })
        );
    }

    #[test]
    fn test_other_text_is_ignored() {
        assert_eq!(Command::parse("e2e4"), None);
        assert_eq!(Command::parse("/play-chess"), None);
        assert_eq!(Command::parse("   "), None);
        assert_eq!(Command::parse("say /help"), None);
    }

    #[test]
    fn test_request_carries_mentions() {
        let message = Message {
            id: "m1".into(),
            channel_id: "c1".into(),
            author_id: "alice".into(),
            content: Some("/playchess black <@bob>".into()),
            mentions: vec!["bob".into()],
        };
        let Some(Command::PlayChess { args }) = Command::from_message(&message) else {
            panic!("expected a play command");
        };
        let request = PlayRequest::from_message(&message, args);
        assert_eq!(request.args, vec!["black", "<@bob>"]);
        assert_eq!(request.mentions, vec!["bob"]);
        assert_eq!(request.message_id, "m1");
    }
}
