use arboard::Clipboard;

/// Replaces the system clipboard contents with `text`, minus stray line
/// breaks at the ends.
pub fn set_clipboard_text(text: &str) -> anyhow::Result<()> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(normalize_text(text))?;
    Ok(())
}

/// Drops NUL bytes and the line breaks surrounding a color literal.
pub fn normalize_text(input: &str) -> String {
    input
        .replace('\0', "")
        .trim_matches(|c: char| c == '\n' || c == '\r' || c == '\u{000B}' || c == '\u{000C}')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::normalize_text;

    #[test]
    fn strips_nulls_and_line_breaks_at_the_ends() {
        assert_eq!(normalize_text("\n#ff00aa\0\r\n"), "#ff00aa");
    }

    #[test]
    fn keeps_inner_spacing() {
        assert_eq!(normalize_text("rgb(1, 2, 3)"), "rgb(1, 2, 3)");
    }
}
