use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, take, take_while, take_while_m_n};
use nom::character::complete::{char, none_of, not_line_ending, one_of, space0};
use nom::combinator::{map, map_opt, map_res, not, opt, peek, value, verify};
use nom::error::{context, FromExternalError, ParseError};
use nom::sequence::{delimited, preceded, terminated};
use nom::{IResult, Parser};

use crate::format::Child;
use crate::result::ParseResult;

use super::comment::{line_end, span0_inline};

/// `[character] text` or plain `text`
pub fn text_line(input: &str) -> ParseResult<&str, Child> {
    let (input, (_, character, text)) = (
        not(one_of("}@")),
        opt(terminated(character, space0)),
        text,
    )
        .parse(input)?;

    Ok((input, Child::Line(character.flatten(), text)))
}

/// the speaking character in brackets, `[]` is the narrator
pub fn character(input: &str) -> ParseResult<&str, Option<String>> {
    context(
        "character",
        delimited(
            char('['),
            alt((
                // a quoted name must be the only thing inside the brackets,
                // otherwise the whole content is taken as plain text
                map(
                    delimited(span0_inline, escaped_text, (span0_inline, peek(char(']')))),
                    Some,
                ),
                map(
                    take_while(|c| c != ']' && c != '\n' && c != '\r'),
                    |s: &str| {
                        let s = s.trim();
                        (!s.is_empty()).then(|| s.to_string())
                    },
                ),
            )),
            char(']'),
        ),
    )
    .parse(input)
}

pub fn text(input: &str) -> ParseResult<&str, String> {
    context("text", alt((terminated(escaped_text, line_end), plain_text))).parse(input)
}

/// the rest of the line, trailing spaces trimmed
///
/// A `//` or `/* */` comment after whitespace ends the text, and so does a `}`
/// after whitespace that closes the enclosing block. Quote the text to keep either.
pub fn plain_text(input: &str) -> ParseResult<&str, String> {
    let (_, line) = not_line_ending.parse(input)?;
    let len = line[..plain_text_end(line)].chars().count();

    let (input, s) = context(
        "plain_text",
        verify(take(len), |s: &str| !s.trim().is_empty()),
    )
    .parse(input)?;
    let (input, _) = space0.parse(input)?;

    Ok((input, s.trim_end().to_string()))
}

/// byte offset where the text of `line` stops
fn plain_text_end(line: &str) -> usize {
    let mut prev = None;
    for (i, c) in line.char_indices() {
        if matches!(prev, Some(' ' | '\t')) {
            let rest = &line[i..];
            let ends = match rest.strip_prefix('}') {
                Some(after) => line_end(after).is_ok(),
                None => (rest.starts_with("//") || rest.starts_with("/*")) && line_end(rest).is_ok(),
            };
            if ends {
                return i;
            }
        }
        prev = Some(c);
    }
    line.len()
}

/// double quoted text with JSON-like escapes
pub fn escaped_text(input: &str) -> ParseResult<&str, String> {
    context(
        "escaped_text",
        delimited(
            char('"'),
            map(
                opt(escaped_transform(
                    none_of("\"\\\n\r"),
                    '\\',
                    alt((
                        parse_unicode,
                        value('\n', char('n')),
                        value('\r', char('r')),
                        value('\t', char('t')),
                        value('\\', char('\\')),
                        value('/', char('/')),
                        value('"', char('"')),
                        value('\'', char('\'')),
                    )),
                )),
                Option::unwrap_or_default,
            ),
            char('"'),
        ),
    )
    .parse(input)
}

/// `\u{XXXXXX}` or `\uXXXX`
pub(crate) fn parse_unicode<'a, E>(input: &'a str) -> IResult<&'a str, char, E>
where
    E: ParseError<&'a str> + FromExternalError<&'a str, std::num::ParseIntError>,
{
    let parse_hex = take_while_m_n(1, 6, |c: char| c.is_ascii_hexdigit());
    let parse_hex4 = take_while_m_n(1, 4, |c: char| c.is_ascii_hexdigit());
    let parse_delimited_hex = preceded(
        char('u'),
        alt((delimited(char('{'), parse_hex, char('}')), parse_hex4)),
    );
    let parse_u32 = map_res(parse_delimited_hex, move |hex| u32::from_str_radix(hex, 16));

    // not every u32 is a code point
    map_opt(parse_u32, std::char::from_u32).parse(input)
}
