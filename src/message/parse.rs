use std::str::FromStr;

use super::lexer::{Lexer, Token};
use super::tags::unescape_tag_value;
use super::types::Message;
use crate::command::Command;
use crate::error::MessageParseError;

impl Message {
    /// Decode one line into `self`, replacing every field.
    ///
    /// `line` must not include the CR-LF terminator. On error the message is
    /// left holding whatever was decoded before the failure.
    pub fn decode(&mut self, line: &str) -> Result<(), MessageParseError> {
        self.tags.clear();
        self.source = Default::default();
        self.command = Command::default();
        self.params.clear();
        self.include_source = true;

        for token in Lexer::new(line) {
            match token? {
                Token::Tag { key, value } => {
                    if key.is_empty() {
                        continue;
                    }
                    self.tags.set(key, unescape_tag_value(value));
                }
                Token::Source { nick, user, host } => {
                    self.source.nick = nick.to_owned();
                    self.source.user = user.to_owned();
                    self.source.host = host.to_owned();
                }
                Token::Command(verb) => self.command = Command::new(verb),
                Token::Param(p) => self.params.push(p),
                Token::End => break,
            }
        }
        Ok(())
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let mut msg = Message::default();
        msg.decode(s.trim_end_matches(&['\r', '\n'][..]))?;
        Ok(msg)
    }
}
