use std::sync::{Arc, Mutex, MutexGuard};

/// Append-only log of echoed commands and shell output.
///
/// Logically one string with `\n` separators. Clones share the same buffer.
/// The only mutations are appends and a full reset, so a reader always sees
/// a consistent prefix.
#[derive(Clone, Default)]
pub struct Transcript {
    inner: Arc<Mutex<TranscriptState>>,
}

#[derive(Default)]
struct TranscriptState {
    text: String,
    /// Incremented on every mutation.
    revision: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line of shell output.
    pub fn append_line(&self, line: &str) {
        let mut state = self.lock();
        state.text.push('\n');
        state.text.push_str(line);
        state.revision += 1;
    }

    /// Append the prompt echo for a submitted command.
    pub fn echo_command(&self, raw: &str) {
        let mut state = self.lock();
        state.text.push_str("\n$ ");
        state.text.push_str(raw);
        state.revision += 1;
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.text.clear();
        state.revision += 1;
    }

    pub fn snapshot(&self) -> String {
        self.lock().text.clone()
    }

    /// Run `f` on the current text without copying it.
    pub fn with_text<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        f(&self.lock().text)
    }

    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    pub fn is_empty(&self) -> bool {
        self.lock().text.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, TranscriptState> {
        // Every mutation completes before the guard drops, so a poisoned
        // buffer is still consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_echo() {
        let t = Transcript::new();
        t.echo_command("echo hi");
        t.append_line("hi");
        assert_eq!(t.snapshot(), "\n$ echo hi\nhi");
        assert_eq!(t.revision(), 2);
    }

    #[test]
    fn test_clear_resets_text() {
        let t = Transcript::new();
        t.append_line("old");
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.snapshot(), "");
        assert_eq!(t.revision(), 2);
    }

    #[test]
    fn test_clones_share_buffer() {
        let t = Transcript::new();
        let other = t.clone();
        other.append_line("shared");
        assert_eq!(t.with_text(|s| s.len()), "\nshared".len());
    }

    #[test]
    fn test_concurrent_appends() {
        let t = Transcript::new();
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let t = t.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        t.append_line(&format!("{n}-{i}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(t.snapshot().lines().filter(|l| !l.is_empty()).count(), 400);
        assert_eq!(t.revision(), 400);
    }
}
