//! Command serializer
//!
//! Turns a [`Command`] into the sentence the router expects.
//!
//! ## Sentence Layout
//! ```text
//! <path>                   /system/resource/print
//! =<name>=<value>          one per parameter, in order
//! .tag=<tag>               if the tag is set and non-empty
//! =.proplist=<a>,<b>       if any properties were requested
//! <query>                  one per clause, verbatim
//! <empty word>             terminator
//! ```
//!
//! The router is position sensitive, so this order is fixed.

use std::io::Write;

use bytes::BytesMut;

use crate::error::Result;
use super::word::encode_word;
use super::Command;

/// The words of a command, in wire order, without the terminator
pub fn command_words(command: &Command) -> Vec<String> {
    let mut words = Vec::with_capacity(
        3 + command.parameters().len() + command.queries().len(),
    );

    words.push(command.path().to_string());

    for parameter in command.parameters() {
        words.push(format!(
            "={}={}",
            parameter.name,
            parameter.value.as_deref().unwrap_or("")
        ));
    }

    if let Some(tag) = command.tag().filter(|t| !t.is_empty()) {
        words.push(format!(".tag={}", tag));
    }

    if !command.properties().is_empty() {
        words.push(format!("=.proplist={}", command.properties().join(",")));
    }

    words.extend(command.queries().iter().cloned());

    words
}

/// Encode a command, terminator included
pub fn encode_command(command: &Command) -> Result<BytesMut> {
    let mut buf = BytesMut::new();
    for word in command_words(command) {
        encode_word(&word, &mut buf)?;
    }
    encode_word("", &mut buf)?;
    Ok(buf)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    tracing::trace!("Sending {} ({} bytes)", command, bytes.len());
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
