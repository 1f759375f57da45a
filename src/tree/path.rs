//! Dotted path addresses with optional bracketed list indices
//!
//! `a.b[2].c`, `a.b[1:3].c` and `a.b[:].c` are all valid paths. Each segment
//! is a field name optionally followed by a single position or a
//! `start:stop:step` range with any part omitted.

use crate::error::{ModelError, Result};
use crate::tree::index::ListIndex;
use nom::{
    branch::alt,
    bytes::complete::is_not,
    character::complete::{char, digit1},
    combinator::{all_consuming, map, map_res, opt, recognize},
    multi::separated_list1,
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};
use std::fmt;

/// One `.`-separated component of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub name: String,
    pub index: Option<ListIndex>,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match &self.index {
            None | Some(ListIndex::ByIdentity(_)) => Ok(()),
            Some(ListIndex::All) => write!(f, "[:]"),
            Some(ListIndex::Single(i)) => write!(f, "[{}]", i),
            Some(ListIndex::Range { start, stop, step }) => {
                let part = |p: &Option<isize>| p.map(|v| v.to_string()).unwrap_or_default();
                write!(f, "[{}:{}", part(start), part(stop))?;
                if step.is_some() {
                    write!(f, ":{}", part(step))?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Parse a path into its segments. The empty path has no segments.
///
/// # Examples
///
/// ```
/// use rietveld_model::tree::{parse_path, ListIndex};
///
/// let segments = parse_path("Phase[0].Atom[1:3].Biso").unwrap();
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments[0].index, Some(ListIndex::Single(0)));
/// assert_eq!(segments[1].index, Some(ListIndex::range(1, 3)));
/// assert_eq!(segments[2].index, None);
///
/// assert!(parse_path("Phase[0").is_err());
/// ```
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>> {
    if path.is_empty() {
        return Ok(Vec::new());
    }

    match all_consuming(separated_list1(char('.'), segment)).parse(path) {
        Ok((_, segments)) => Ok(segments),
        Err(e) => Err(ModelError::InvalidPathSyntax {
            path: path.to_string(),
            message: format!("{:?}", e),
        }),
    }
}

/// Render segments back into path text.
pub fn join_path(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

fn segment(input: &str) -> IResult<&str, PathSegment> {
    let (input, name) = is_not(".[]").parse(input)?;
    let (input, index) = opt(bracketed_index).parse(input)?;
    Ok((
        input,
        PathSegment {
            name: name.to_string(),
            index,
        },
    ))
}

fn bracketed_index(input: &str) -> IResult<&str, ListIndex> {
    delimited(char('['), alt((range_index, single_index)), char(']')).parse(input)
}

fn integer(input: &str) -> IResult<&str, isize> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<isize>()
    })
    .parse(input)
}

fn single_index(input: &str) -> IResult<&str, ListIndex> {
    map(integer, ListIndex::Single).parse(input)
}

fn range_index(input: &str) -> IResult<&str, ListIndex> {
    let (input, start) = opt(integer).parse(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, stop) = opt(integer).parse(input)?;
    let (input, step) = opt(preceded(char(':'), opt(integer))).parse(input)?;
    Ok((
        input,
        ListIndex::Range {
            start,
            stop,
            step: step.flatten(),
        },
    ))
}
