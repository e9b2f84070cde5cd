use nom::branch::*;
use nom::bytes::complete::*;
use nom::character::complete::*;
use nom::combinator::*;
use nom::multi::*;
use nom::sequence::*;
use nom::Parser;

use crate::result::ParseResult;

/// parse comment like `// EOL-style` or `/* block-style */`
pub fn comment(input: &str) -> ParseResult<&str, &str> {
    alt((comment_single, comment_multi)).parse(input)
}

/// parse comment like `// EOL-style comments`, which may be empty
pub fn comment_single(input: &str) -> ParseResult<&str, &str> {
    preceded(tag("//"), not_line_ending).parse(input)
}

/// parse comment like `/* C-style comments */`, returns the content without delimiters
pub fn comment_multi(input: &str) -> ParseResult<&str, &str> {
    delimited(tag("/*"), take_until("*/"), tag("*/")).parse(input)
}

/// match contiguous comments or whitespaces, which can be multiple lines
pub fn span0(input: &str) -> ParseResult<&str, ()> {
    value(
        (),
        many0(alt((map(comment, |_| ()), value((), multispace1)))),
    )
    .parse(input)
}

/// match contiguous comments or whitespaces, which is only one line
pub fn span0_inline(input: &str) -> ParseResult<&str, ()> {
    value((), many0(alt((map(comment, |_| ()), value((), space1))))).parse(input)
}

/// match trailing spaces and comments, then a line break, the end of input,
/// or a `}` which is left for the enclosing block
pub fn line_end(input: &str) -> ParseResult<&str, ()> {
    preceded(
        span0_inline,
        alt((
            value((), line_ending),
            value((), eof),
            value((), peek(char('}'))),
        )),
    )
    .parse(input)
}
