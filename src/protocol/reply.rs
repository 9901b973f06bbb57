//! Reply parser
//!
//! Reassembles the router's stream of words into records.
//!
//! ## Reply Stream
//! ```text
//! !re                 record marker (ignored)
//! =name=ether1        attribute
//! .tag=7              echoed tag, stored as ".tag"
//! <empty word>        closes the current record
//! ...
//! !done               end of reply
//! ```
//!
//! A `!trap` marks the current record as an error report. The error is
//! raised when that record closes, or at the next terminal marker.

use std::collections::HashMap;
use std::io::Read;

use crate::error::{Result, RosError};
use super::word::read_word;

/// One row returned by the router
pub type Record = HashMap<String, String>;

/// Key under which an echoed tag is stored
pub const TAG_KEY: &str = ".tag";

/// A decoded word, classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentence<'a> {
    /// `!done`
    Done,

    /// `!trap`
    Trap,

    /// Any other `!xxx` marker, such as `!re`
    Marker(&'a str),

    /// `=name=value`
    Attribute { name: &'a str, value: &'a str },

    /// `.tag=value`
    Tag(&'a str),

    /// The empty word
    End,

    /// Anything else; ignored by the parser
    Other(&'a str),
}

impl<'a> Sentence<'a> {
    pub fn parse(word: &'a str) -> Self {
        match word {
            "" => Sentence::End,
            "!done" => Sentence::Done,
            "!trap" => Sentence::Trap,
            w if w.starts_with('!') => Sentence::Marker(w),
            w => {
                if let Some(value) = w.strip_prefix(".tag=") {
                    return Sentence::Tag(value);
                }

                let mut parts = w.splitn(3, '=');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(""), Some(name), Some(value)) if !name.is_empty() => {
                        Sentence::Attribute { name, value }
                    }
                    _ => Sentence::Other(w),
                }
            }
        }
    }
}

/// State machine folding sentences into records
///
/// Feed words one at a time with [`ReplyParser::feed`]; it yields the
/// record list once the reply is complete. After an error the parser must
/// not be fed again.
#[derive(Debug, Default)]
pub struct ReplyParser {
    records: Vec<Record>,
    current: Record,
    trapped: bool,
    done: bool,
}

impl ReplyParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one word
    ///
    /// Returns `Ok(Some(records))` on `!done`, `Ok(None)` while more words
    /// are needed, and `Err(RosError::Trap)` when the router reported an
    /// error.
    pub fn feed(&mut self, word: &str) -> Result<Option<Vec<Record>>> {
        match Sentence::parse(word) {
            Sentence::Attribute { name, value } => {
                self.current.insert(name.to_string(), value.to_string());
            }
            Sentence::Tag(value) => {
                self.current.insert(TAG_KEY.to_string(), value.to_string());
            }
            Sentence::Trap => {
                // A second trap before the first one closed still ends the reply
                if self.trapped {
                    return Err(self.trap_error());
                }
                self.trapped = true;
            }
            Sentence::End => {
                if self.trapped {
                    return Err(self.trap_error());
                }
                if !self.current.is_empty() {
                    self.records.push(std::mem::take(&mut self.current));
                }
            }
            Sentence::Done => {
                self.done = true;
                if self.trapped {
                    return Err(self.trap_error());
                }
                return Ok(Some(std::mem::take(&mut self.records)));
            }
            Sentence::Marker(marker) => {
                tracing::trace!("Skipping reply marker {}", marker);
            }
            Sentence::Other(word) => {
                tracing::trace!("Ignoring unrecognized word {:?}", word);
            }
        }
        Ok(None)
    }

    /// Records completed so far
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Whether `!done` has been consumed
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed words from a stream until the reply completes
    ///
    /// Transport failures abort the read; no partial record list is
    /// returned.
    pub fn read_from<R: Read>(&mut self, reader: &mut R) -> Result<Vec<Record>> {
        loop {
            let word = read_word(reader)?;
            tracing::trace!("Received {:?}", word);
            if let Some(records) = self.feed(&word)? {
                return Ok(records);
            }
        }
    }

    fn trap_error(&mut self) -> RosError {
        RosError::Trap {
            message: self.current.remove("message"),
        }
    }
}

/// Read a complete reply from a stream
///
/// Blocks until `!done` or a trap.
pub fn read_reply<R: Read>(reader: &mut R) -> Result<Vec<Record>> {
    ReplyParser::new().read_from(reader)
}

/// Discard words up to and including `!done`
///
/// A trap is raised when its record closes, but the router still sends
/// the `!done` that ends the reply.
pub fn skip_to_done<R: Read>(reader: &mut R) -> Result<()> {
    while read_word(reader)? != "!done" {}
    Ok(())
}

/// Read the rest of a `!done` sentence, up to its empty word
///
/// The parser stops at the `!done` marker itself; attributes the router
/// attaches to it (such as `=ret=*1A` after an `add`) follow.
pub fn read_done_sentence<R: Read>(reader: &mut R) -> Result<Record> {
    let mut record = Record::new();
    loop {
        let word = read_word(reader)?;
        match Sentence::parse(&word) {
            Sentence::End => return Ok(record),
            Sentence::Attribute { name, value } => {
                record.insert(name.to_string(), value.to_string());
            }
            Sentence::Tag(value) => {
                record.insert(TAG_KEY.to_string(), value.to_string());
            }
            _ => tracing::trace!("Ignoring {:?} in !done sentence", word),
        }
    }
}
