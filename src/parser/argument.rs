use nom::branch::alt;
use nom::bytes::complete::*;
use nom::combinator::*;
use nom::multi::{many0, separated_list0};
use nom::sequence::*;
use nom::Parser;

use crate::result::ParseResult;

use super::comment::{span0, span0_inline};
use super::identifier::identifier;
use super::primitive::literal;
use super::Argument;

/// either `(a=1, b="x")` or `a=1 b="x"` until the end of the line
pub fn arguments(input: &str) -> ParseResult<&str, Vec<Argument>> {
    let (input, _) = span0_inline.parse(input)?;
    alt((arguments_parenthesized, arguments_inline)).parse(input)
}

pub fn arguments_parenthesized(input: &str) -> ParseResult<&str, Vec<Argument>> {
    let (input, _) = tag("(").parse(input)?;
    let (input, arguments) = cut(delimited(
        span0,
        separated_list0(delimited(span0, tag(","), span0), argument),
        preceded(span0, tag(")")),
    ))
    .parse(input)?;
    Ok((input, arguments))
}

pub fn arguments_inline(input: &str) -> ParseResult<&str, Vec<Argument>> {
    many0(terminated(argument, span0_inline)).parse(input)
}

pub fn argument(input: &str) -> ParseResult<&str, Argument> {
    let (input, name) = identifier.parse(input)?;
    let (input, _) = span0_inline.parse(input)?;
    let (input, value) =
        opt(preceded(terminated(tag("="), span0_inline), cut(literal))).parse(input)?;
    Ok((
        input,
        Argument {
            name: name.to_string(),
            value,
        },
    ))
}

#[cfg(test)]
mod tests {
    use crate::format::Literal;

    use super::*;

    fn arg(name: &str, value: Option<Literal>) -> Argument {
        Argument {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_argument() {
        assert_eq!(argument("enabled"), Ok(("", arg("enabled", None))));
        assert_eq!(
            argument("src = \"school\" "),
            Ok((
                " ",
                arg("src", Some(Literal::String("school".to_string())))
            ))
        );
        assert!(matches!(argument("src = school"), Err(nom::Err::Failure(_))));
    }

    #[test]
    fn test_arguments() {
        assert_eq!(arguments(""), Ok(("", vec![])));
        assert_eq!(arguments("()"), Ok(("", vec![])));
        assert_eq!(
            arguments("(text='Go', \n enabled=false)"),
            Ok((
                "",
                vec![
                    arg("text", Some(Literal::String("Go".to_string()))),
                    arg("enabled", Some(Literal::Boolean(false))),
                ]
            ))
        );
        assert_eq!(
            arguments(" text=\"Go\" enabled=false\nnext"),
            Ok((
                "\nnext",
                vec![
                    arg("text", Some(Literal::String("Go".to_string()))),
                    arg("enabled", Some(Literal::Boolean(false))),
                ]
            ))
        );
        // the next line is never taken as an argument
        assert_eq!(arguments("\nHello"), Ok(("\nHello", vec![])));
        assert!(matches!(arguments("(a=1"), Err(nom::Err::Failure(_))));
    }
}
