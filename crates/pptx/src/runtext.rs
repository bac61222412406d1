//! Inline run text recognizer.
//!
//! Run text inside `<a:t>` arrives raw from the XML reader, so it may still
//! hold character references (`&amp;`, `&#x2022;`) and OOXML `_xHHHH_`
//! escapes. The tokenizer splits such text into literal slices and decoded
//! escapes. Anything that looks like the start of an escape but does not
//! complete one is passed through as literal text; recognition never fails.

/// Longest entity body accepted between `&` and `;` (e.g. `#x10FFFF`).
const MAX_ENTITY_LEN: usize = 10;

/// Length of an OOXML escape: `_x` + four hex digits + `_`.
const OOXML_ESCAPE_LEN: usize = 7;

/// One lexical unit of run text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text copied through unchanged.
    Literal(&'a str),
    /// A recognized escape and the character it stands for.
    Escape { raw: &'a str, value: char },
}

/// Iterator over the tokens of one run's text.
#[derive(Debug, Clone)]
pub struct RunTextTokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> RunTextTokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

impl<'a> Iterator for RunTextTokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = &self.input[self.pos..];
        let first = rest.chars().next()?;

        if let Some((len, value)) = recognize_escape(rest) {
            self.pos += len;
            return Some(Token::Escape {
                raw: &rest[..len],
                value,
            });
        }

        // The first character is always consumed so a failed escape start
        // becomes literal text instead of being retried.
        let skip = first.len_utf8();
        let end = rest[skip..]
            .find(['&', '_'])
            .map(|i| i + skip)
            .unwrap_or(rest.len());
        self.pos += end;
        Some(Token::Literal(&rest[..end]))
    }
}

/// Tokenize raw run text.
pub fn tokenize(raw: &str) -> RunTextTokenizer<'_> {
    RunTextTokenizer::new(raw)
}

/// Decode raw run text into its display string.
pub fn decode(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    for token in tokenize(raw) {
        match token {
            Token::Literal(s) => text.push_str(s),
            Token::Escape { value, .. } => text.push(value),
        }
    }
    text
}

/// Try to read one escape at the start of `input`.
/// Returns its byte length and decoded character.
fn recognize_escape(input: &str) -> Option<(usize, char)> {
    match input.as_bytes().first()? {
        b'&' => recognize_entity(input),
        b'_' => recognize_ooxml_escape(input),
        _ => None,
    }
}

fn recognize_entity(input: &str) -> Option<(usize, char)> {
    let semicolon = input
        .bytes()
        .take(MAX_ENTITY_LEN + 2)
        .position(|b| b == b';')?;
    let body = &input[1..semicolon];

    let value = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let number = body.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => parse_code_point(hex, 16)?,
                None => parse_code_point(number, 10)?,
            };
            char::from_u32(code).filter(|c| *c != '\0')?
        }
    };

    Some((semicolon + 1, value))
}

fn recognize_ooxml_escape(input: &str) -> Option<(usize, char)> {
    let bytes = input.as_bytes().get(..OOXML_ESCAPE_LEN)?;
    if bytes[1] != b'x' || bytes[OOXML_ESCAPE_LEN - 1] != b'_' {
        return None;
    }

    let code = parse_code_point(&input[2..6], 16)?;
    let value = match code {
        // Vertical tab marks a soft line break; CR and LF are line breaks too.
        0x0B | 0x0D | 0x0A => '\n',
        _ => char::from_u32(code).filter(|c| *c != '\0')?,
    };

    Some((OOXML_ESCAPE_LEN, value))
}

fn parse_code_point(digits: &str, radix: u32) -> Option<u32> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(decode("Bullet point 1"), "Bullet point 1");
        assert_eq!(
            tokenize("Hello").collect::<Vec<_>>(),
            vec![Token::Literal("Hello")]
        );
        assert_eq!(tokenize("").next(), None);
    }

    #[test]
    fn test_named_entities() {
        assert_eq!(decode("AT&amp;T"), "AT&T");
        assert_eq!(decode("&lt;tag&gt;"), "<tag>");
        assert_eq!(decode("&quot;q&quot; &apos;a&apos;"), "\"q\" 'a'");
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode("&#8226; item"), "\u{2022} item");
        assert_eq!(decode("&#x2022;&#X41;"), "\u{2022}A");
    }

    #[test]
    fn test_ooxml_escapes() {
        assert_eq!(decode("snake_x005F_case"), "snake_case");
        assert_eq!(decode("line_x000B_break"), "line\nbreak");
        assert_eq!(decode("tab_x0009_here"), "tab\there");
    }

    #[test]
    fn test_line_break_escapes() {
        assert_eq!(decode("a_x000D_b"), "a\nb");
        assert_eq!(decode("a_x000A_b"), "a\nb");
        assert_eq!(decode("a_x000d__x000a_b"), "a\n\nb");
        assert_eq!(
            tokenize("_x000D_").collect::<Vec<_>>(),
            vec![Token::Escape { raw: "_x000D_", value: '\n' }]
        );
    }

    #[test]
    fn test_token_stream() {
        let tokens: Vec<Token> = tokenize("a&amp;b_x005F_c").collect();
        assert_eq!(
            tokens,
            vec![
                Token::Literal("a"),
                Token::Escape { raw: "&amp;", value: '&' },
                Token::Literal("b"),
                Token::Escape { raw: "_x005F_", value: '_' },
                Token::Literal("c"),
            ]
        );
    }

    #[test]
    fn test_malformed_tokens_stay_literal() {
        assert_eq!(decode("AT&T"), "AT&T");
        assert_eq!(decode("&amp"), "&amp");
        assert_eq!(decode("&unknown;"), "&unknown;");
        assert_eq!(decode("&#xZZ;"), "&#xZZ;");
        assert_eq!(decode("&#;"), "&#;");
        assert_eq!(decode("&#0;"), "&#0;");
        assert_eq!(decode("&#xD800;"), "&#xD800;");
        assert_eq!(decode("&#+65;"), "&#+65;");
        assert_eq!(decode("_x12G4_"), "_x12G4_");
        assert_eq!(decode("_x00"), "_x00");
        assert_eq!(decode("snake_case"), "snake_case");
        assert_eq!(decode("&;"), "&;");
        assert_eq!(decode("a & b"), "a & b");
    }

    #[test]
    fn test_overlong_entity_is_literal() {
        assert_eq!(decode("&averyveryverylongname;"), "&averyveryverylongname;");
    }

    #[test]
    fn test_recovery_continues_after_bad_token() {
        assert_eq!(decode("&bad;&amp;_x_x0041_"), "&bad;&_xA");
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(decode("é&amp;ü_ß"), "é&ü_ß");
        assert_eq!(decode("_é"), "_é");
        assert_eq!(decode("&é;"), "&é;");
    }
}
