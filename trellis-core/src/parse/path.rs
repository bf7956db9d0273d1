use winnow::{Parser, combinator::eof};

/// Splits a path pattern, like `/v1/pets/{petId}/toys`, into its
/// non-empty slash-delimited segments.
///
/// Empty segments from leading, trailing, or doubled slashes are skipped,
/// so `/` has no segments at all.
pub fn segments(input: &str) -> Vec<PathSegment<'_>> {
    input
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(PathSegment::parse)
        .collect()
}

/// A single path segment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PathSegment<'input> {
    /// Literal text, kept verbatim.
    Literal(&'input str),
    /// A whole-segment template parameter, like `{petId}`.
    Param(&'input str),
}

impl<'input> PathSegment<'input> {
    /// Classifies a segment. Only a segment that is exactly one
    /// `{name}` expression is a parameter; anything else, including
    /// mixed segments like `{id}.pdf`, is literal text.
    pub fn parse(segment: &'input str) -> Self {
        (self::parser::param, eof)
            .map(|(name, _)| name)
            .parse(segment)
            .map_or(Self::Literal(segment), Self::Param)
    }

    /// Returns the literal text or the parameter name.
    pub fn name(&self) -> &'input str {
        match *self {
            Self::Literal(text) | Self::Param(text) => text,
        }
    }
}

mod parser {
    use winnow::{Parser, combinator::delimited, token::take_while};

    pub fn param<'a>(input: &mut &'a str) -> winnow::Result<&'a str> {
        delimited('{', take_while(1.., |c| c != '{' && c != '}'), '}').parse_next(input)
    }
}
