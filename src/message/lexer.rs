//! Single-pass scanner for one IRC line.
//!
//! The scanner borrows the line and yields tokens in wire order: tags, at
//! most one source, the command, parameters, then [`Token::End`]. It knows
//! nothing about what commands mean and does no escape processing.
//!
//! All delimiters are ASCII, so scanning works on bytes; multi-byte UTF-8
//! sequences never contain an ASCII byte and pass through untouched.

use crate::error::MessageParseError;

const TAGS_START: u8 = b'@';
const PREFIX_START: u8 = b':';
const TRAILING_START: u8 = b':';
const TAG_DELIM: u8 = b';';
const TAG_VALUE_DELIM: u8 = b'=';
const SPACE: u8 = b' ';

/// A lexical token borrowed from the scanned line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// One `key[=value]` pair. The value is still escaped; the key may be empty.
    Tag {
        /// Tag key, including any client prefix or vendor.
        key: &'a str,
        /// Raw tag value, empty when the `=` was absent.
        value: &'a str,
    },
    /// The message prefix. Parts not present on the wire are empty.
    Source {
        /// Nickname, empty for server prefixes.
        nick: &'a str,
        /// Username.
        user: &'a str,
        /// Host or server name.
        host: &'a str,
    },
    /// The command verb or numeric, as written.
    Command(&'a str),
    /// One parameter; the trailing parameter has its `:` removed.
    Param(&'a str),
    /// End of the line.
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Start,
    TagKey,
    AfterTags,
    Prefix,
    Command,
    Params,
    End,
    Done,
}

/// Iterator over the tokens of a single line.
///
/// Yields `Err` at most once, after which the iterator is exhausted.
///
/// ```
/// use slirc_conn::message::lexer::{Lexer, Token};
///
/// let tokens: Vec<_> = Lexer::new("PING :123").collect::<Result<_, _>>().unwrap();
/// assert_eq!(
///     tokens,
///     vec![Token::Command("PING"), Token::Param("123"), Token::End]
/// );
/// ```
#[derive(Clone, Debug)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    state: State,
}

impl<'a> Lexer<'a> {
    /// Scan `input`, which must not include the line terminator.
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            state: State::Start,
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    /// Advance `pos` while the byte is a space.
    fn skip_spaces(&mut self) {
        while self.peek() == Some(SPACE) {
            self.pos += 1;
        }
    }

    /// Index of the first byte at or after `from` matching `pred`.
    fn find_from(&self, from: usize, pred: impl Fn(u8) -> bool) -> Option<usize> {
        self.input.as_bytes()[from..]
            .iter()
            .position(|&b| pred(b))
            .map(|i| from + i)
    }

    fn fail(&mut self, position: usize, reason: impl Into<String>) -> Option<LexResult<'a>> {
        self.state = State::Done;
        Some(Err(MessageParseError::lexical(position, reason)))
    }

    fn emit(&mut self, next: State, token: Token<'a>) -> Option<LexResult<'a>> {
        self.state = next;
        Some(Ok(token))
    }

    fn lex_start(&mut self) -> State {
        match self.peek() {
            Some(TAGS_START) => {
                self.pos += 1;
                State::TagKey
            }
            Some(PREFIX_START) => State::Prefix,
            _ => State::Command,
        }
    }

    /// One `key[=value]` pair plus its terminator.
    fn lex_tag(&mut self) -> Option<LexResult<'a>> {
        let input = self.input;
        let bytes = input.as_bytes();
        let key_start = self.pos;
        let mut i = key_start;

        let key_end = loop {
            match bytes.get(i).copied() {
                Some(TAG_VALUE_DELIM) | Some(TAG_DELIM) | Some(SPACE) => break i,
                Some(b) if is_tag_key_byte(b) => i += 1,
                Some(_) => {
                    let ch = input[i..].chars().next().unwrap_or('\u{fffd}');
                    return self.fail(
                        i,
                        format!("invalid character {:?} found while reading tag name", ch),
                    );
                }
                None => {
                    return self.fail(i, "unexpected end of input while reading tag name");
                }
            }
        };

        let value_start = if bytes[key_end] == TAG_VALUE_DELIM {
            key_end + 1
        } else {
            key_end
        };
        let value_end = match self.find_from(value_start, |b| b == TAG_DELIM || b == SPACE) {
            Some(end) => end,
            None => {
                return self.fail(
                    input.len(),
                    "unexpected end of input while reading tag value",
                );
            }
        };

        let token = Token::Tag {
            key: &input[key_start..key_end],
            value: &input[value_start..value_end],
        };

        self.pos = value_end;
        if bytes[value_end] == TAG_DELIM {
            self.pos += 1;
            if self.peek() != Some(SPACE) {
                return self.emit(State::TagKey, token);
            }
        }
        self.skip_spaces();
        self.emit(State::AfterTags, token)
    }

    fn lex_after_tags(&mut self) -> Option<LexResult<'a>> {
        match self.peek() {
            None => self.fail(self.pos, "unexpected end of input after message tags"),
            Some(PREFIX_START) => self.lex_prefix(),
            Some(_) => self.lex_command(),
        }
    }

    /// The prefix, starting at its `:`.
    fn lex_prefix(&mut self) -> Option<LexResult<'a>> {
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.pos + 1;

        let mut i = start;
        loop {
            match bytes.get(i).copied() {
                Some(SPACE) => {
                    let nick = &input[start..i];
                    self.pos = i;
                    self.skip_spaces();
                    if self.peek().is_none() {
                        return self.fail(self.pos, "unexpected end of input; expected command");
                    }
                    return self.emit(
                        State::Command,
                        Token::Source {
                            nick,
                            user: "",
                            host: "",
                        },
                    );
                }
                // a dot cannot appear in a nickname, so this is a server name
                Some(b'.') => return self.lex_host(start, "", "", i),
                Some(b'!') => break,
                Some(_) => i += 1,
                None => return self.fail(i, "unexpected end of input"),
            }
        }

        let nick = &input[start..i];
        let user_start = i + 1;
        let mut j = user_start;
        loop {
            match bytes.get(j).copied() {
                Some(b'@') => break,
                Some(SPACE) => return self.fail(j, "expected host, found end of prefix"),
                Some(_) => j += 1,
                None => return self.fail(j, "unexpected end of input"),
            }
        }

        let user = &input[user_start..j];
        self.lex_host(j + 1, nick, user, j + 1)
    }

    /// The host part of a prefix. `host_start` is where the host text
    /// begins and `scan_from` is where to resume looking for the space.
    fn lex_host(
        &mut self,
        host_start: usize,
        nick: &'a str,
        user: &'a str,
        scan_from: usize,
    ) -> Option<LexResult<'a>> {
        let input = self.input;
        match self.find_from(scan_from, |b| b == SPACE) {
            Some(end) => {
                let host = &input[host_start..end];
                self.pos = end;
                self.skip_spaces();
                self.emit(State::Command, Token::Source { nick, user, host })
            }
            None => self.fail(input.len(), "expected command, found end of input"),
        }
    }

    fn lex_command(&mut self) -> Option<LexResult<'a>> {
        let input = self.input;
        let start = self.pos;
        match self.find_from(start, |b| b == SPACE) {
            Some(end) => {
                if end == start {
                    return self.fail(end, "unexpected end of command; command is empty");
                }
                self.pos = end;
                self.skip_spaces();
                self.emit(State::Params, Token::Command(&input[start..end]))
            }
            None => {
                if start == input.len() {
                    return self.fail(start, "unexpected eof; command is empty");
                }
                self.pos = input.len();
                self.emit(State::End, Token::Command(&input[start..]))
            }
        }
    }

    fn lex_param(&mut self) -> Option<LexResult<'a>> {
        let input = self.input;
        let start = self.pos;
        if self.peek() == Some(TRAILING_START) {
            self.pos = input.len();
            return self.emit(State::End, Token::Param(&input[start + 1..]));
        }

        match self.find_from(start, |b| b == SPACE) {
            Some(end) => {
                self.pos = end;
                self.skip_spaces();
                self.emit(State::Params, Token::Param(&input[start..end]))
            }
            // a line that ends in a space yields one final empty parameter
            None => {
                self.pos = input.len();
                self.emit(State::End, Token::Param(&input[start..]))
            }
        }
    }
}

type LexResult<'a> = Result<Token<'a>, MessageParseError>;

impl<'a> Iterator for Lexer<'a> {
    type Item = LexResult<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            State::Start => {
                self.state = self.lex_start();
                self.next()
            }
            State::TagKey => self.lex_tag(),
            State::AfterTags => self.lex_after_tags(),
            State::Prefix => self.lex_prefix(),
            State::Command => self.lex_command(),
            State::Params => self.lex_param(),
            State::End => self.emit(State::Done, Token::End),
            State::Done => None,
        }
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

/// Tag key bytes: ASCII letters, digits and `-`, plus `+`, `/` and `.` for
/// client-only prefixes and vendor namespaces.
#[inline]
fn is_tag_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'+' | b'/' | b'.')
}
