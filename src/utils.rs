/// Converts a 1-based line and column (as reported by `serde_json`) into a byte offset
/// into `source`. Positions past the end of a line or of the text are clamped, and the
/// result always falls on a character boundary.
pub fn offset_of(source: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for _ in 1..line.max(1) {
        match source[line_start..].find('\n') {
            Some(newline) => line_start += newline + 1,
            None => return source.len(),
        }
    }
    let line_end = source[line_start..]
        .find('\n')
        .map_or(source.len(), |newline| line_start + newline);

    let mut offset = (line_start + column.saturating_sub(1)).min(line_end);
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::offset_of;

    #[test]
    fn test_offset_of_first_line() {
        assert_eq!(offset_of("{ \"a\": 1 }", 1, 3), 2);
    }

    #[test]
    fn test_offset_of_later_line() {
        let source = "{\n  \"a\": x\n}";
        assert_eq!(&source[offset_of(source, 2, 8)..offset_of(source, 2, 8) + 1], "x");
    }

    #[test]
    fn test_offset_of_clamps() {
        let source = "{\n}";
        assert_eq!(offset_of(source, 1, 40), 1);
        assert_eq!(offset_of(source, 9, 1), source.len());
        assert_eq!(offset_of("", 0, 0), 0);
    }

    #[test]
    fn test_offset_of_respects_char_boundaries() {
        let source = "é";
        assert_eq!(offset_of(source, 1, 2), 0);
    }
}
