//! Yes/no confirmation on the terminal.

use std::io::{self, BufRead, Write};

/// Ask `question` until the answer is `y`, `n`, or empty (meaning yes).
///
/// End of input counts as "no" so a closed stdin never triggers printing.
pub fn confirm<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    let mut line = String::new();
    loop {
        write!(output, "{question} (Y/n): ")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(false);
        }
        match line.trim().to_lowercase().as_str() {
            "" | "y" => return Ok(true),
            "n" => return Ok(false),
            _ => writeln!(output, "Please enter 'y' for yes or 'n' for no.")?,
        }
    }
}
