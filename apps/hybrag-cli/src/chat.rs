use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::warn;

pub const CHAT_PROMPT: &str = "> ";

/// Read questions line by line until an empty line or end of input.
///
/// A failed turn is reported on `err` and the session moves on to the next
/// question; only I/O errors on the terminal end the loop.
pub fn run_chat<R, W, E, F>(mut input: R, out: &mut W, err: &mut E, mut turn: F) -> Result<()>
where
    R: BufRead,
    W: Write,
    E: Write,
    F: FnMut(&str) -> Result<String>,
{
    loop {
        write!(out, "{}", CHAT_PROMPT)?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 { break; }
        let question = line.trim();
        if question.is_empty() { break; }
        match turn(question) {
            Ok(reply) => writeln!(out, "\n{}", reply)?,
            Err(e) => {
                warn!(error = %e, "chat turn failed");
                writeln!(err, "Error: {:#}", e)?;
            }
        }
    }
    Ok(())
}
