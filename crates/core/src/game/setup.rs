//! Match setup negotiation
//!
//! Colour, opponent, optional engine configuration, then the counterparty's
//! confirmation. Nothing is acquired here; the engine is only launched once
//! setup returns [`SetupOutcome::Ready`].

use tracing::debug;

use super::{MatchConfig, MatchContext, Opponent, PlayRequest};
use crate::board::Side;
use crate::chat::{mention, Conversation, Elicit, Message, OutgoingMessage};
use crate::engine::{EngineOption, EngineOptions};
use crate::error::Result;
use crate::parser::{parse_color, parse_confirmation, parse_option_reply, ColorChoice, OptionReply};

pub const USAGE: &str = "Usage: /playchess [color] [other-player]";

const COLOR_PROMPT: &str =
    "What color do you want to play as? Expect either \"White\", \"Black\", or \"Random\".";
const INVALID_COLOR: &str = "Invalid color, expected either \"White\", \"Black\", or \"Random\".";
const EXPECTED_CONTENT: &str = "Expected message content.";
const OPPONENT_PROMPT: &str = "Who do you want to play against?";
const ONE_OPPONENT_ONLY: &str = "Expected only one person to play against.";
const EXPECTED_ONE_MENTION: &str = "Expected one mention to another user.";
const CONFIGURE_PROMPT: &str = "Do you want to configure the engine? (yes/no)";
const BOT_CONFIRM_PROMPT: &str = "Are you sure you want to play against a bot?";
const SINGLE_LINE_VALUE: &str = "Option values must be a single line.";
const YES_OR_NO: &str = "Please answer with either \"yes\" or \"no\".";
const ABORTING: &str = "Aborting chess game.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    Ready(MatchConfig),
    /// Declined or rejected; the players have already been told why
    Rejected,
}

/// Walks the initiator (and the opponent, for the final confirmation)
/// through setup
pub async fn negotiate(
    ctx: &MatchContext,
    convo: &Conversation,
    request: &PlayRequest,
) -> Result<SetupOutcome> {
    let initiator = request.author_id.as_str();

    if request.args.len() > 2 {
        let text = format!(
            "Expected at most 2 arguments. Found {}\n{}",
            request.args.len(),
            USAGE
        );
        convo
            .say(OutgoingMessage::text(text).replying_to(&request.message_id))
            .await?;
        return Ok(SetupOutcome::Rejected);
    }

    let choice = match request.args.first().and_then(|arg| parse_color(arg)) {
        Some(choice) => choice,
        None => ask_color(convo, request).await?,
    };
    let player1_side = choice.resolve(&mut rand::rng());
    debug!(?choice, side = %player1_side, "Colour settled");

    let opponent_id = if request.mentions.is_empty() {
        let prompt = OutgoingMessage::text(OPPONENT_PROMPT).replying_to(&request.message_id);
        let answer = convo.ask(initiator, &prompt).await?;
        match single_other_mention(&answer.mentions, initiator) {
            Some(id) => id,
            None => {
                convo.reply(&answer, EXPECTED_ONE_MENTION).await?;
                return Ok(SetupOutcome::Rejected);
            }
        }
    } else {
        match single_other_mention(&request.mentions, initiator) {
            Some(id) => id,
            None => {
                convo
                    .say(OutgoingMessage::text(ONE_OPPONENT_ONLY).replying_to(&request.message_id))
                    .await?;
                return Ok(SetupOutcome::Rejected);
            }
        }
    };

    let opponent = if opponent_id == ctx.bot_id {
        Opponent::Engine
    } else {
        Opponent::Human(opponent_id)
    };

    let engine_options = match opponent {
        Opponent::Engine => Some(configure_engine(convo, initiator).await?),
        Opponent::Human(_) => None,
    };

    let confirmed = match &opponent {
        Opponent::Human(id) => {
            let prompt = format!(
                "Do you want to play against {}, {}?",
                mention(initiator),
                mention(id)
            );
            confirm(convo, id, &OutgoingMessage::text(prompt)).await?
        }
        Opponent::Engine => {
            let prompt = OutgoingMessage::text(BOT_CONFIRM_PROMPT).replying_to(&request.message_id);
            confirm(convo, initiator, &prompt).await?
        }
    };

    if !confirmed {
        convo.say(ABORTING).await?;
        return Ok(SetupOutcome::Rejected);
    }

    Ok(SetupOutcome::Ready(MatchConfig {
        player1: initiator.to_string(),
        opponent,
        player1_side,
        engine_options,
    }))
}

fn single_other_mention(mentions: &[String], initiator: &str) -> Option<String> {
    match mentions {
        [only] if only != initiator => Some(only.clone()),
        _ => None,
    }
}

async fn ask_color(convo: &Conversation, request: &PlayRequest) -> Result<ColorChoice> {
    let prompt = OutgoingMessage::text(COLOR_PROMPT).replying_to(&request.message_id);
    convo
        .elicit(&request.author_id, &prompt, |message| {
            match message.content.as_deref() {
                None => Elicit::Retry(EXPECTED_CONTENT.to_string()),
                Some(content) => match parse_color(content) {
                    Some(choice) => Elicit::Accept(choice),
                    None => Elicit::Retry(INVALID_COLOR.to_string()),
                },
            }
        })
        .await
}

/// Blocks until `author_id` clearly answers yes or no
async fn confirm(convo: &Conversation, author_id: &str, prompt: &OutgoingMessage) -> Result<bool> {
    convo
        .elicit(author_id, prompt, |message: &Message| {
            match message.content.as_deref().and_then(parse_confirmation) {
                Some(answer) => Elicit::Accept(answer),
                None => Elicit::Retry(YES_OR_NO.to_string()),
            }
        })
        .await
}

fn option_prompt(option: EngineOption) -> String {
    format!(
        "{} (`{}`, default `{}`)? Reply \"default\" to keep it.",
        option.description(),
        option.key(),
        option.default_value()
    )
}

async fn configure_engine(convo: &Conversation, initiator: &str) -> Result<EngineOptions> {
    let mut options = EngineOptions::default();

    if !confirm(convo, initiator, &OutgoingMessage::text(CONFIGURE_PROMPT)).await? {
        return Ok(options);
    }

    for option in EngineOption::ALL {
        let prompt = OutgoingMessage::text(option_prompt(option));
        let reply = convo
            .elicit(initiator, &prompt, |message| {
                match parse_option_reply(message.content.as_deref().unwrap_or_default()) {
                    OptionReply::Empty => Elicit::Retry(EXPECTED_CONTENT.to_string()),
                    OptionReply::Malformed => Elicit::Retry(SINGLE_LINE_VALUE.to_string()),
                    OptionReply::Default => Elicit::Accept(None),
                    OptionReply::Value(value) => Elicit::Accept(Some(value)),
                }
            })
            .await?;

        if let Some(value) = reply {
            debug!(option = %option, %value, "Engine option overridden");
            options.set(option, value);
        }
    }

    Ok(options)
}
