//! IRC messages: the structured form, the scanner, and the wire codec.

pub mod lexer;
mod params;
mod parse;
mod serialize;
pub mod tags;
mod types;

pub use self::params::Params;
pub use self::tags::Tags;
pub use self::types::Message;
pub(crate) use self::types::CTCP_DELIM;
