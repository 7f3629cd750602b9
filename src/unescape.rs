/// Unescape an iCalendar TEXT value (RFC 5545 section 3.3.11).
///
/// Escapes that RFC 5545 doesn't define, e.g. `\:`, and a trailing `\` are
/// left as they are.
pub fn unescape(s: &str) -> String {
    let mut chars = s.chars();
    let mut unescaped = String::with_capacity(s.len());

    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }

        match chars.next() {
            Some('n') | Some('N') => unescaped.push('\n'),
            Some(c @ ('\\' | ';' | ',')) => unescaped.push(c),
            Some(c) => {
                unescaped.push('\\');
                unescaped.push(c);
            }
            None => unescaped.push('\\'),
        };
    }

    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescapes_text() {
        assert_eq!(
            unescape(r"Mixing\, mastering\; #music\nthen #soundtrack"),
            "Mixing, mastering; #music\nthen #soundtrack"
        );
        assert_eq!(unescape(r"C:\\tmp"), r"C:\tmp");
    }

    #[test]
    fn keeps_unknown_escapes() {
        assert_eq!(unescape(r"Note\: mix #music"), r"Note\: mix #music");
        assert_eq!(unescape(r"\q"), r"\q");
        assert_eq!(unescape("dangling\\"), "dangling\\");
    }
}
