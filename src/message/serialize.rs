use std::fmt::{self, Display, Formatter, Write};

use super::tags::escape_tag_value;
use super::types::Message;
use crate::encode::{measure, relay_overhead, IrcEncode};
use crate::error::{EncodeError, EncodeWarning};
use crate::prefix::Prefix;

/// Characters that would split or truncate a line.
#[inline]
fn breaks_line(c: char) -> bool {
    matches!(c, '\r' | '\n' | '\0')
}

fn check_field(field: &'static str, value: &str) -> Result<(), EncodeError> {
    match value.chars().find(|&c| breaks_line(c) || c == ' ') {
        Some(ch) => Err(EncodeError::IllegalChar { field, ch }),
        None => Ok(()),
    }
}

/// True when `source` decodes back to itself once written.
///
/// A nickname ends at the first `!` and a `.` in it marks a server name, so
/// neither may appear in a nickname. The user ends at the first `@`. A bare
/// host is only read as a server when a `.` comes before any `!`.
fn source_reads_back(source: &Prefix) -> bool {
    if source.nick.is_empty() {
        return source.user.is_empty()
            && match (source.host.find('.'), source.host.find('!')) {
                (Some(dot), Some(bang)) => dot < bang,
                (Some(_), None) => true,
                (None, _) => false,
            };
    }
    !source.nick.contains(['.', '!']) && !source.user.contains('@')
}

fn valid_tag_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'+' | b'/' | b'.'))
}

impl Message {
    fn writes_source(&self) -> bool {
        self.include_source && !self.source.is_empty()
    }

    /// Reject anything that cannot be written as a single well-formed line.
    fn validate(&self) -> Result<(), EncodeError> {
        if self.command.is_empty() {
            return Err(EncodeError::EmptyCommand);
        }
        check_field("command", self.command.as_str())?;
        if let Some(ch) = self.command.as_str().chars().next().filter(|c| matches!(c, ':' | '@')) {
            return Err(EncodeError::IllegalChar {
                field: "command",
                ch,
            });
        }

        for (key, _) in self.tags.iter() {
            if !valid_tag_key(key) {
                return Err(EncodeError::InvalidTagKey(key.to_owned()));
            }
        }

        if self.writes_source() {
            check_field("source nickname", &self.source.nick)?;
            check_field("source user", &self.source.user)?;
            check_field("source host", &self.source.host)?;
            if !source_reads_back(&self.source) {
                return Err(EncodeError::AmbiguousSource(self.source.clone()));
            }
        }

        let count = self.params.len();
        for (i, param) in self.params.iter().enumerate() {
            if let Some(ch) = param.chars().find(|&c| breaks_line(c)) {
                return Err(EncodeError::IllegalChar {
                    field: "parameter",
                    ch,
                });
            }
            let is_last = i + 1 == count;
            if !is_last && (param.is_empty() || param.starts_with(':') || param.contains(' ')) {
                return Err(EncodeError::InvalidMiddleParam {
                    index: i + 1,
                    value: param.to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Write the line without validation, returning the tag section length.
    fn write_wire(&self, out: &mut String) -> Result<usize, fmt::Error> {
        let start = out.len();
        if !self.tags.is_empty() {
            out.push('@');
            for (i, (key, value)) in self.tags.iter().enumerate() {
                if i > 0 {
                    out.push(';');
                }
                out.push_str(key);
                if !value.is_empty() {
                    out.push('=');
                    escape_tag_value(out, value)?;
                }
            }
            out.push(' ');
        }
        let tags_len = out.len() - start;

        if self.writes_source() {
            write!(out, ":{} ", self.source)?;
        }

        out.push_str(self.command.as_str());

        // the last parameter is always written as trailing so it round-trips
        // whatever it contains
        let count = self.params.len();
        for (i, param) in self.params.iter().enumerate() {
            out.push(' ');
            if i + 1 == count {
                out.push(':');
            }
            out.push_str(param);
        }
        out.push_str("\r\n");
        Ok(tags_len)
    }
}

impl IrcEncode for Message {
    fn encode_relayed(
        &self,
        buf: &mut Vec<u8>,
        origin: &Prefix,
    ) -> Result<Option<EncodeWarning>, EncodeError> {
        self.validate()?;

        let mut line = String::with_capacity(512);
        let tags_len = match self.write_wire(&mut line) {
            Ok(n) => n,
            // writing to a String cannot fail
            Err(fmt::Error) => 0,
        };
        buf.extend_from_slice(line.as_bytes());

        let overhead = if self.writes_source() {
            0
        } else {
            relay_overhead(origin)
        };
        let body_len = line.len() - tags_len + overhead;
        Ok(measure(tags_len, body_len, self.params.len()))
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut line = String::with_capacity(512);
        self.write_wire(&mut line)?;
        f.write_str(&line)
    }
}
