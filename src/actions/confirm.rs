//! Interactive confirmation before destructive actions.

use std::io::{self, BufRead, Write};

/// Prompt shown before deleting duplicates.
pub const DELETE_PROMPT: &str = "Do you want to delete duplicates? (y/N): ";

/// Write `prompt`, read one line, and report whether the answer is `y`.
///
/// Only a trimmed, case-insensitive `y` is affirmative. An empty line,
/// any other text and end of input are all negative.
///
/// # Errors
///
/// Returns an error if writing the prompt or reading the answer fails.
///
/// # Example
///
/// ```
/// use dupesweep::actions::confirm::confirm;
///
/// let mut input = &b"Y\n"[..];
/// let mut output = Vec::new();
/// assert!(confirm(&mut input, &mut output, "Continue? ").unwrap());
/// ```
pub fn confirm<R: BufRead + ?Sized, W: Write + ?Sized>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<bool> {
    output.write_all(prompt.as_bytes())?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        log::debug!("No answer on input, treating as declined");
        // Keep following output off the prompt line
        writeln!(output)?;
        return Ok(false);
    }

    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
