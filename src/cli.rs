//! # Argument Parsing
//! The program's only configuration surface is argv: an optional
//! `-d DELIMS` flag and two required positional arguments, `SCRIPT` and
//! `FILE`. A small dedicated parser is enough here — there's no case for a
//! general-purpose argument-parsing crate over such a tiny, fixed shape.
use crate::error::SpsError;

/// The parsed command line: the delimiter set (defaults to a single
/// space), the raw command script string, and the table file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub delimiters: Vec<u8>,
    pub script: String,
    pub file: String,
}

/// Parses `args` (the argv tail, without the program name) into a [`Cli`].
///
/// `-d` is only recognized as the delimiter flag when it is the very first
/// argv item *and* the full tail has exactly 4 items — i.e. the invocation
/// is `-d DELIMS SCRIPT FILE`. Any other shape, including a `-d` that
/// trails the positionals or appears when the tail isn't exactly 4 items
/// long, falls through to the no-flag branch: `-d` and whatever follows it
/// are ordinary positional arguments there, not a flag.
///
/// Rejects fewer than 2 positional arguments ([`SpsError::TooFewArguments`])
/// or more than 4 total argv items ([`SpsError::TooManyArguments`]).
pub fn parse_args(args: &[String]) -> Result<Cli, SpsError> {
    if args.len() > 4 {
        return Err(SpsError::TooManyArguments);
    }

    let (delimiters, positional): (Option<Vec<u8>>, &[String]) = if args.len() == 4 && args[0] == "-d" {
        if args[1].is_empty() {
            return Err(SpsError::TooFewArguments);
        }
        (Some(args[1].as_bytes().to_vec()), &args[2..])
    } else {
        (None, args)
    };

    if positional.len() < 2 {
        return Err(SpsError::TooFewArguments);
    }
    if positional.len() > 2 {
        return Err(SpsError::TooManyArguments);
    }

    Ok(Cli {
        delimiters: delimiters.unwrap_or_else(|| b" ".to_vec()),
        script: positional[0].clone(),
        file: positional[1].clone(),
    })
}
