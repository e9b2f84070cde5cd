mod argument;
mod block;
mod command_line;
mod comment;
mod identifier;
mod primitive;
mod section;
mod text;

use nom::combinator::all_consuming;
use nom::multi::*;
use nom::sequence::*;
use nom::Parser;
use nom_language::error::convert_error;

use crate::error::{Result, RuntimeError};
use crate::format::*;
use crate::result::ParseResult;

use self::comment::span0;
use self::section::section;

/// parse a script file which is a sequence of sections
pub fn parse<'a>(name: &'a str, input: &'a str) -> ParseResult<&'a str, Story> {
    let (input, sections) =
        all_consuming(terminated(many0(preceded(span0, section)), span0)).parse(input)?;

    Ok((
        input,
        Story {
            name: name.to_string(),
            sections,
        },
    ))
}

/// Same as [`parse`], with syntax errors rendered against the source text.
pub fn parse_script(name: &str, input: &str) -> Result<Story> {
    match parse(name, input) {
        Ok((_, story)) => Ok(story),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(RuntimeError::ParseError {
            name: name.to_string(),
            message: convert_error(input, e),
        }),
        Err(nom::Err::Incomplete(_)) => Err(RuntimeError::ParseError {
            name: name.to_string(),
            message: "unexpected end of input".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
// opening
::entry {
    @bg src="school"
    [Alice] Good morning.
    The bell rings.
    @switch text="Go left" target="left"
    @switch(text="Go right", enabled=false)
}

::left {
    [Alice] "Left it is.\n"
}
"#;

    #[test]
    fn test_parse() {
        let (rest, story) = parse("en", SAMPLE).unwrap();
        assert_eq!(rest, "");
        assert_eq!(story.name, "en");
        assert_eq!(
            story
                .sections
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>(),
            vec!["entry", "left"]
        );
        assert_eq!(story.sections[0].children.len(), 5);
        assert_eq!(
            story.sections[0].children[1],
            Child::Line(Some("Alice".to_string()), "Good morning.".to_string())
        );
        assert_eq!(
            story.sections[0].children[2],
            Child::Line(None, "The bell rings.".to_string())
        );
        assert_eq!(
            story.sections[1].children,
            vec![Child::Line(
                Some("Alice".to_string()),
                "Left it is.\n".to_string()
            )]
        );
    }

    #[test]
    fn test_parse_inline_ends() {
        let story = parse_script("t", "::a { Hello. }\n::b {\n    Bye. // reword later\n}").unwrap();
        assert_eq!(
            story.sections[0].children,
            vec![Child::Line(None, "Hello.".to_string())]
        );
        assert_eq!(
            story.sections[1].children,
            vec![Child::Line(None, "Bye.".to_string())]
        );
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(
            parse("en", "  // nothing here\n"),
            Ok((
                "",
                Story {
                    name: "en".to_string(),
                    sections: vec![],
                }
            ))
        );
    }

    #[test]
    fn test_parse_script_error() {
        let err = parse_script("en", "::entry {\n    @bg src=\n}").unwrap_err();
        assert!(matches!(err, RuntimeError::ParseError { ref name, .. } if name == "en"));

        let err = parse_script("en", "::entry {\n    Hello\n").unwrap_err();
        assert!(matches!(err, RuntimeError::ParseError { .. }));

        let err = parse_script("en", "Hello outside of a section").unwrap_err();
        assert!(matches!(err, RuntimeError::ParseError { .. }));
    }
}
