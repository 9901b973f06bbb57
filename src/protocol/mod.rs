//! Protocol Module
//!
//! The RouterOS API wire protocol.
//!
//! ## Framing
//! Every unit is a length-prefixed word (see [`word`]). A request is a
//! sentence of words closed by an empty word; a reply is a stream of
//! sentences closed by `!done` (or a `!trap` error report).
//!
//! ### Request
//! ```text
//! ┌────────┬─────────────┬────────┬──────────────┬─────────┬───────┐
//! │ <path> │ =name=value │ .tag=t │ =.proplist=… │ ?query  │ <nil> │
//! └────────┴─────────────┴────────┴──────────────┴─────────┴───────┘
//! ```
//!
//! ### Reply
//! ```text
//! ┌─────┬─────────────┬───────┬─────┬───────┐
//! │ !re │ =name=value │ <nil> │ ... │ !done │
//! └─────┴─────────────┴───────┴─────┴───────┘
//! ```

pub mod word;
mod command;
mod codec;
mod reply;

pub use command::{Command, Parameter};
pub use codec::{command_words, encode_command, write_command};
pub use reply::{read_done_sentence, read_reply, skip_to_done, Record, ReplyParser, Sentence, TAG_KEY};
pub use word::{read_word, write_word};
