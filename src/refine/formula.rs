//! Constraint formula grammar
//!
//! A user formula is `<int>*<variable>`, e.g. `2*k` or `-1*shift`. Text that
//! does not have that form names a variable with multiplier 1. The engine
//! formula produced for the refinement engine is
//! `<value>+<multiplier>*<variable>` in fixed-point notation.

use nom::{
    character::complete::{char, digit1, multispace0, one_of},
    bytes::complete::take_while1,
    combinator::{all_consuming, map_res, opt, recognize},
    number::complete::double,
    sequence::pair,
    IResult, Parser,
};

/// A parsed user formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    /// Multiplier of the variable.
    pub dev: f64,
    /// Name of the variable.
    pub variable: String,
}

/// Parse a user formula. Never fails: text without a leading `<int>*` is a
/// bare variable name with multiplier 1.
///
/// # Examples
///
/// ```
/// use rietveld_model::refine::parse_formula;
///
/// let f = parse_formula("3*k");
/// assert_eq!((f.dev, f.variable.as_str()), (3.0, "k"));
///
/// let f = parse_formula("x*y*z");
/// assert_eq!((f.dev, f.variable.as_str()), (1.0, "x*y*z"));
/// ```
pub fn parse_formula(text: &str) -> Formula {
    match all_consuming(scaled_name).parse(text) {
        Ok((_, (dev, variable))) => Formula {
            dev: dev as f64,
            variable,
        },
        Err(_) => Formula {
            dev: 1.0,
            variable: text.to_string(),
        },
    }
}

fn signed_int(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), |s: &str| {
        s.parse::<i64>()
    })
    .parse(input)
}

fn scaled_name(input: &str) -> IResult<&str, (i64, String)> {
    let (input, _) = multispace0.parse(input)?;
    let (input, dev) = signed_int(input)?;
    let (input, _) = multispace0.parse(input)?;
    let (input, _) = char('*').parse(input)?;
    let (input, name) = take_while1(|c: char| c != '*').parse(input)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::TakeWhile1,
        )));
    }
    Ok((input, (dev, name.to_string())))
}

/// Render the engine formula with right-aligned fixed-point numbers.
pub fn render_engine_formula(
    value: f64,
    dev: f64,
    variable: &str,
    width: usize,
    precision: usize,
) -> String {
    format!(
        "{:>w$.p$}+{:>w$.p$}*{}",
        value,
        dev,
        variable,
        w = width,
        p = precision
    )
}

/// A parsed engine formula.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineFormula {
    pub value: f64,
    pub dev: f64,
    pub variable: String,
}

/// Parse text produced by [`render_engine_formula`].
pub fn parse_engine_formula(text: &str) -> Option<EngineFormula> {
    fn engine(input: &str) -> IResult<&str, EngineFormula> {
        let (input, _) = multispace0.parse(input)?;
        let (input, value) = double.parse(input)?;
        let (input, _) = char('+').parse(input)?;
        let (input, _) = multispace0.parse(input)?;
        let (input, dev) = double.parse(input)?;
        let (input, _) = char('*').parse(input)?;
        let (input, variable) = take_while1(|_: char| true).parse(input)?;
        Ok((
            input,
            EngineFormula {
                value,
                dev,
                variable: variable.to_string(),
            },
        ))
    }

    all_consuming(engine).parse(text).ok().map(|(_, f)| f)
}
