/// Builds a filesystem-safe file name: each of `\ / % * ? : " |` and every
/// control character 0x01–0x1F becomes `_`, then surrounding whitespace is
/// trimmed.
pub fn clean_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| match c {
            '\\' | '/' | '%' | '*' | '?' | ':' | '"' | '|' => '_',
            c if ('\u{01}'..='\u{1f}').contains(&c) => '_',
            c => c,
        })
        .collect();
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_reserved_characters() {
        assert_eq!(clean_file_name("a/b:c*d"), "a_b_c_d");
        assert_eq!(clean_file_name(r#"x\y%z?w"v|u"#), "x_y_z_w_v_u");
    }

    #[test]
    fn replaces_control_characters() {
        assert_eq!(clean_file_name("a\u{01}b\u{1f}c"), "a_b_c");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(clean_file_name("  track  "), "track");
    }

    #[test]
    fn keeps_ordinary_names_untouched() {
        assert_eq!(clean_file_name("Artist - Title.mp3"), "Artist - Title.mp3");
    }
}
