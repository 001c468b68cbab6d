use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

enum Sink {
    Stdout,
    Buffer(Mutex<Vec<String>>),
}

/// Numbered console progress for a single run.
///
/// Steps are numbered from 1 in the order they are logged. Substeps and
/// errors are indented under the current step.
pub struct StepLogger {
    next: AtomicU32,
    sink: Sink,
}

impl StepLogger {
    pub fn new() -> Self {
        Self {
            next: AtomicU32::new(1),
            sink: Sink::Stdout,
        }
    }

    /// Keeps lines in memory instead of printing them.
    pub fn buffered() -> Self {
        Self {
            next: AtomicU32::new(1),
            sink: Sink::Buffer(Mutex::new(Vec::new())),
        }
    }

    pub fn step(&self, msg: &str) {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(step = n, "{}", msg);
        self.emit(format!("{:<2} - {}", n, msg));
    }

    pub fn substep(&self, msg: &str) {
        tracing::debug!("{}", msg);
        self.emit(format!("     * {}", msg));
    }

    pub fn error(&self, msg: &str) {
        tracing::debug!("run failed: {}", msg);
        self.emit(format!("     ERROR: {}", msg));
    }

    /// Prints the rendered report under a banner.
    pub fn dump(&self, body: &str) {
        self.emit(String::new());
        self.emit("--------- Email Content --------".to_string());
        self.emit(String::new());
        self.emit(body.to_string());
        self.emit(String::new());
    }

    /// Lines captured by a buffered logger, empty for stdout.
    pub fn lines(&self) -> Vec<String> {
        match &self.sink {
            Sink::Stdout => Vec::new(),
            Sink::Buffer(lines) => lines.lock().map(|l| l.clone()).unwrap_or_default(),
        }
    }

    fn emit(&self, line: String) {
        match &self.sink {
            Sink::Stdout => println!("{}", line),
            Sink::Buffer(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(line);
                }
            }
        }
    }
}

impl Default for StepLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_are_numbered_sequentially() {
        let log = StepLogger::buffered();
        log.step("first");
        log.substep("detail");
        log.step("second");
        log.error("broken");

        assert_eq!(
            log.lines(),
            vec!["1  - first", "     * detail", "2  - second", "     ERROR: broken"]
        );
    }

    #[test]
    fn test_two_digit_steps_keep_alignment() {
        let log = StepLogger::buffered();
        for i in 0..10 {
            log.step(&format!("s{}", i));
        }
        assert_eq!(log.lines()[9], "10 - s9");
    }

    #[test]
    fn test_dump_frames_body() {
        let log = StepLogger::buffered();
        log.dump("hello");
        let lines = log.lines();
        assert_eq!(lines[1], "--------- Email Content --------");
        assert_eq!(lines[3], "hello");
    }
}
