use nom::character::complete::char;
use nom::combinator::cut;
use nom::error::context;
use nom::sequence::*;
use nom::Parser;

use crate::result::ParseResult;

use super::argument::arguments;
use super::comment::line_end;
use super::identifier::identifier;
use super::Child;
use super::CommandLine;

pub fn command_line(input: &str) -> ParseResult<&str, Child> {
    let (input, (command, arguments, _)) = context(
        "command_line",
        preceded(char('@'), cut((identifier, arguments, line_end))),
    )
    .parse(input)?;

    Ok((
        input,
        Child::Command(CommandLine {
            command: command.to_string(),
            arguments,
        }),
    ))
}
