//! Nom-based line parser.
//!
//! Splits a raw line into borrowed tag block, prefix, command, middle
//! parameters and trailing text without allocating.

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::{char, space0},
    combinator::opt,
    error::ErrorKind,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

/// Middle parameters allowed before everything else is treated as trailing.
const MAX_PARAMS: usize = 15;

/// Parse the tag block (the part after `@` and before the first space).
fn parse_tags(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), take_until(" "))(input)
}

/// Parse the prefix (the part after `:` and before the first space).
fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// Parse the command name (1*letter or 3digit).
fn parse_command(input: &str) -> IResult<&str, &str> {
    let (rest, cmd) = take_while1(|c: char| c.is_ascii_alphanumeric())(input)?;

    let is_all_letters = cmd.chars().all(|c| c.is_ascii_alphabetic());
    let is_three_digits = cmd.len() == 3 && cmd.chars().all(|c| c.is_ascii_digit());

    if is_all_letters || is_three_digits {
        Ok((rest, cmd))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::AlphaNumeric,
        )))
    }
}

/// Split the remainder after the command into middle params and trailing.
///
/// Runs of spaces count as one separator.
fn parse_params(input: &str) -> (SmallVec<[&str; MAX_PARAMS]>, Option<&str>) {
    let mut params: SmallVec<[&str; MAX_PARAMS]> = SmallVec::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            return (params, None);
        }

        if let Some(trailing) = rest.strip_prefix(':') {
            return (params, Some(trailing));
        }

        if params.len() == MAX_PARAMS - 1 {
            // The last slot absorbs the remainder, colon or not.
            return (params, Some(rest));
        }

        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }
}

/// Parse a complete line into its components.
///
/// ```text
/// [@tags] [:prefix] <command> [params...] [:trailing]
/// ```
fn parse_message(input: &str) -> IResult<&str, ParsedMessage<'_>> {
    let (input, tags) = opt(parse_tags)(input)?;
    let (input, _) = space0(input)?;

    let (input, prefix) = opt(parse_prefix)(input)?;
    let (input, _) = space0(input)?;

    let (input, command) = parse_command(input)?;

    if !input.is_empty() && !input.starts_with(' ') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Space,
        )));
    }

    let (params, trailing) = parse_params(input);

    Ok((
        "",
        ParsedMessage {
            tags,
            prefix,
            command,
            params,
            trailing,
        },
    ))
}

/// A parsed line with borrowed string slices.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedMessage<'a> {
    /// Raw tag block (without the leading `@`), if present.
    pub tags: Option<&'a str>,
    /// Raw prefix (without the leading `:`), if present.
    pub prefix: Option<&'a str>,
    /// The command name.
    pub command: &'a str,
    /// Middle parameters.
    pub params: SmallVec<[&'a str; MAX_PARAMS]>,
    /// Trailing parameter (without the leading `:`), if present.
    pub trailing: Option<&'a str>,
}

impl<'a> ParsedMessage<'a> {
    /// Parse a line (without its terminator) into a `ParsedMessage`.
    pub fn parse(input: &'a str) -> Result<Self, DetailedParseError> {
        let line = input.trim_end_matches(['\r', '\n']);
        match parse_message(line) {
            Ok((_, msg)) => Ok(msg),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(DetailedParseError {
                position: line.len() - e.input.len(),
                kind: e.code,
            }),
            Err(nom::Err::Incomplete(_)) => Err(DetailedParseError {
                position: line.len(),
                kind: ErrorKind::Eof,
            }),
        }
    }
}

/// Parse failure with the byte position it happened at.
#[derive(Debug, Clone)]
pub(crate) struct DetailedParseError {
    pub position: usize,
    pub kind: ErrorKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_line() {
        let parsed = ParsedMessage::parse(
            "@badges=;color=#FF0000 :foo!foo@foo.tmi.twitch.tv PRIVMSG #room :hello world",
        )
        .unwrap();

        assert_eq!(parsed.tags, Some("badges=;color=#FF0000"));
        assert_eq!(parsed.prefix, Some("foo!foo@foo.tmi.twitch.tv"));
        assert_eq!(parsed.command, "PRIVMSG");
        assert_eq!(parsed.params.as_slice(), &["#room"]);
        assert_eq!(parsed.trailing, Some("hello world"));
    }

    #[test]
    fn test_parse_without_trailing() {
        let parsed = ParsedMessage::parse("JOIN #room").unwrap();
        assert_eq!(parsed.params.as_slice(), &["#room"]);
        assert_eq!(parsed.trailing, None);
    }

    #[test]
    fn test_parse_empty_trailing() {
        let parsed = ParsedMessage::parse("PRIVMSG #room :").unwrap();
        assert_eq!(parsed.trailing, Some(""));
    }

    #[test]
    fn test_parse_collapses_spaces() {
        let parsed = ParsedMessage::parse("USER  bot   0 *  :Bot").unwrap();
        assert_eq!(parsed.params.as_slice(), &["bot", "0", "*"]);
        assert_eq!(parsed.trailing, Some("Bot"));
    }

    #[test]
    fn test_parse_rejects_bad_command() {
        let err = ParsedMessage::parse(":server 12 nick").unwrap_err();
        assert_eq!(err.position, 8);
    }

    #[test]
    fn test_parse_rejects_unterminated_tags() {
        assert!(ParsedMessage::parse("@a=b").is_err());
    }

    #[test]
    fn test_parse_param_limit() {
        let line = "CMD a b c d e f g h i j k l m n o p";
        let parsed = ParsedMessage::parse(line).unwrap();
        assert_eq!(parsed.params.len(), MAX_PARAMS - 1);
        assert_eq!(parsed.trailing, Some("o p"));
    }
}
