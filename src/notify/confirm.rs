use std::io::{BufRead, Write};

use crate::error::Result;

/// Yes/no gate in front of sending.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Asks on a line-oriented stream until it gets y/yes/n/no.
///
/// End of input counts as "no".
pub struct LineConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LineConfirm<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for LineConfirm<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            write!(self.output, "     {} (y/n): ", question)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(false);
            }

            match line.trim().to_lowercase().as_str() {
                "y" | "yes" => {
                    writeln!(self.output)?;
                    return Ok(true);
                }
                "n" | "no" => {
                    writeln!(self.output)?;
                    return Ok(false);
                }
                _ => continue,
            }
        }
    }
}
