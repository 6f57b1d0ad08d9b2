// Token-level parsers shared by the command parsers

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0},
    combinator::{map, recognize},
    multi::{many0_count, separated_list0},
    number::complete::double,
    sequence::{delimited, pair, separated_pair},
    IResult,
};

/// Wrap a parser so it skips surrounding whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0_count(alt((alphanumeric1, tag("_")))),
        )),
        String::from,
    )(input)
}

/// A data column: a name, or `#N` for the N-th column
pub fn column_ref(input: &str) -> IResult<&str, String> {
    alt((
        identifier,
        map(recognize(pair(char('#'), digit1)), String::from),
    ))(input)
}

/// Double-quoted string without escapes
pub fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        String::from,
    )(input)
}

pub fn number_literal(input: &str) -> IResult<&str, f64> {
    double(input)
}

/// `[col, col, ...]`
pub fn column_list(input: &str) -> IResult<&str, Vec<String>> {
    delimited(
        ws(char('[')),
        separated_list0(ws(char(',')), ws(column_ref)),
        ws(char(']')),
    )(input)
}

/// `[lo, hi]`
pub fn range_literal(input: &str) -> IResult<&str, (f64, f64)> {
    delimited(
        ws(char('[')),
        separated_pair(ws(number_literal), ws(char(',')), ws(number_literal)),
        ws(char(']')),
    )(input)
}
