/*
** This file is a part of Ikswalk (forward-only XML walker from Iksemel)
** Copyright (C) 2025 Gurer Ozen
**
** Ikswalk is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

pub mod predefined {
    pub const LT: &str = "&lt;";
    pub const GT: &str = "&gt;";
    pub const AMP: &str = "&amp;";
    pub const APOS: &str = "&apos;";
    pub const QUOT: &str = "&quot;";
}

fn entity(c: char) -> Option<&'static str> {
    match c {
        '<' => Some(predefined::LT),
        '>' => Some(predefined::GT),
        '&' => Some(predefined::AMP),
        '\'' => Some(predefined::APOS),
        '"' => Some(predefined::QUOT),
        _ => None,
    }
}

/// Writes the string with the markup characters replaced by references.
pub fn escape_fmt(s: &str, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut back = 0;
    for (pos, c) in s.char_indices() {
        if let Some(reference) = entity(c) {
            f.write_str(&s[back..pos])?;
            f.write_str(reference)?;
            back = pos + c.len_utf8();
        }
    }
    f.write_str(&s[back..])
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Escaped<'a>(&'a str);

    impl std::fmt::Display for Escaped<'_> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            escape_fmt(self.0, f)
        }
    }

    #[test]
    fn escaping() {
        const NOESCAPE: &str = "abc$#@!%^*(){}[]=-+/.,;:FDSF3443";
        assert_eq!(Escaped(NOESCAPE).to_string(), NOESCAPE);
        assert_eq!(Escaped("abc&def").to_string(), "abc&amp;def");
        assert_eq!(
            Escaped("<>&'\"").to_string(),
            "&lt;&gt;&amp;&apos;&quot;"
        );
        assert_eq!(Escaped("ğü<ş>").to_string(), "ğü&lt;ş&gt;");
        assert_eq!(Escaped("").to_string(), "");
    }
}
