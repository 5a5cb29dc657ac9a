/// Hard-wrap a single logical line into rows of at most `width` characters.
///
/// Counting is by `char`, so multi-byte text is never split inside a code
/// point. An empty line yields no rows, and so does a zero width.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    if width == 0 {
        return rows;
    }

    let mut current = String::new();
    let mut count = 0usize;

    for ch in line.chars() {
        current.push(ch);
        count += 1;
        if count >= width {
            rows.push(std::mem::take(&mut current));
            count = 0;
        }
    }

    if !current.is_empty() {
        rows.push(current);
    }

    rows
}

/// Split the transcript into logical lines and wrap each of them.
///
/// A trailing `\r` is dropped from every logical line so CRLF output from the
/// shell does not leave a stray control character at the end of a row.
pub fn wrap_transcript(transcript: &str, width: usize) -> Vec<String> {
    transcript
        .split('\n')
        .flat_map(|line| wrap_line(line.strip_suffix('\r').unwrap_or(line), width))
        .collect()
}
