use nom::branch::alt;
use nom::character::complete::char;
use nom::combinator::cut;
use nom::error::context;
use nom::multi::many0;
use nom::sequence::*;
use nom::Parser;

use crate::format::Child;
use crate::result::ParseResult;

use super::command_line::command_line;
use super::comment::span0;
use super::text::text_line;

pub fn block(input: &str) -> ParseResult<&str, Vec<Child>> {
    let (input, _) = char('{').parse(input)?;
    let (input, children) = many0(preceded(span0, child)).parse(input)?;
    let (input, _) = preceded(span0, context("block_end", cut(char('}')))).parse(input)?;
    Ok((input, children))
}

pub fn child(input: &str) -> ParseResult<&str, Child> {
    alt((command_line, text_line)).parse(input)
}
