use nom::branch::alt;
use nom::bytes::complete::*;
use nom::character::complete::*;
use nom::combinator::*;
use nom::error::context;
use nom::multi::*;
use nom::sequence::*;
use nom::Parser;

use crate::result::ParseResult;

use super::Literal;

pub fn literal(input: &str) -> ParseResult<&str, Literal> {
    context("literal", alt((string, number, boolean))).parse(input)
}

pub fn string(input: &str) -> ParseResult<&str, Literal> {
    let (input, s) = context(
        "string",
        alt((
            delimited(tag("\""), take_until("\""), tag("\"")),
            delimited(tag("'"), take_until("'"), tag("'")),
        )),
    )
    .parse(input)?;
    Ok((input, Literal::String(s.to_string())))
}

pub fn number(input: &str) -> ParseResult<&str, Literal> {
    let (input, n) = context(
        "number",
        map_res(
            (
                opt(alt((tag("-"), tag("+")))),
                recognize(many1(terminated(digit1, many0(char('_'))))),
            ),
            |(sign, value)| {
                let value = &str::replace(value, "_", "");
                value
                    .parse::<i64>()
                    .map(|n| if sign == Some("-") { -n } else { n })
            },
        ),
    )
    .parse(input)?;
    Ok((input, Literal::Integer(n)))
}

pub fn boolean(input: &str) -> ParseResult<&str, Literal> {
    let (input, b) = context(
        "boolean",
        alt((value(true, tag("true")), value(false, tag("false")))),
    )
    .parse(input)?;
    Ok((input, Literal::Boolean(b)))
}
