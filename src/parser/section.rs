use nom::bytes::complete::*;
use nom::combinator::*;
use nom::sequence::*;
use nom::Parser;

use crate::result::ParseResult;

use super::block::block;
use super::comment::span0;
use super::identifier::identifier;
use super::Section;

pub fn section(input: &str) -> ParseResult<&str, Section> {
    let (input, _) = tag("::").parse(input)?;
    let (input, name) = cut(identifier).parse(input)?;
    let (input, children) = preceded(span0, cut(block)).parse(input)?;
    Ok((
        input,
        Section {
            name: name.to_string(),
            children,
        },
    ))
}
