// Command parsers for the plotwire script DSL

use super::ast::{FigureArgs, GlyphCall, ImageCall, SliderCall, Source};
use super::lexer::{column_list, column_ref, identifier, number_literal, range_literal, string_literal, ws};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, verify},
    error::{Error, ErrorKind},
    multi::separated_list0,
    sequence::{delimited, pair, preceded},
    IResult,
};

/// Component names that are not glyph kinds
const RESERVED: &[&str] = &["figure", "image", "slider"];

/// `key: value`
fn arg<'a, O, F>(key: &'static str, value: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    preceded(pair(ws(tag(key)), ws(char(':'))), ws(value))
}

/// `name( arg, arg, ... )`
fn call<'a, O, F>(name: &'static str, args: F) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<O>>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    preceded(
        ws(tag(name)),
        delimited(ws(char('(')), separated_list0(ws(char(',')), args), ws(char(')'))),
    )
}

enum FigureArg {
    Title(String),
    Width(f64),
    Height(f64),
    XRange((f64, f64)),
    YRange((f64, f64)),
    XTicker(String),
    YTicker(String),
}

/// Parse figure settings
/// Format: figure(title: "T", width: 640, height: 480, x_range: [0, 10], x_ticker: "log")
pub fn parse_figure(input: &str) -> IResult<&str, FigureArgs> {
    let (input, args) = call(
        "figure",
        alt((
            map(arg("title", string_literal), FigureArg::Title),
            map(arg("width", number_literal), FigureArg::Width),
            map(arg("height", number_literal), FigureArg::Height),
            map(arg("x_range", range_literal), FigureArg::XRange),
            map(arg("y_range", range_literal), FigureArg::YRange),
            map(arg("x_ticker", string_literal), FigureArg::XTicker),
            map(arg("y_ticker", string_literal), FigureArg::YTicker),
        )),
    )(input)?;

    let mut figure = FigureArgs::default();
    for a in args {
        match a {
            FigureArg::Title(t) => figure.title = Some(t),
            FigureArg::Width(w) => figure.width = Some(w),
            FigureArg::Height(h) => figure.height = Some(h),
            FigureArg::XRange(r) => figure.x_range = Some(r),
            FigureArg::YRange(r) => figure.y_range = Some(r),
            FigureArg::XTicker(t) => figure.x_ticker = Some(t),
            FigureArg::YTicker(t) => figure.y_ticker = Some(t),
        }
    }
    Ok((input, figure))
}

enum GlyphArg {
    X(String),
    Y(String),
    Color(Source<String>),
    Size(Source<f64>),
    Marker(Source<String>),
    Width(f64),
    Alpha(f64),
    Legend(String),
}

fn text_or_column(input: &str) -> IResult<&str, Source<String>> {
    alt((
        map(string_literal, Source::Fixed),
        map(column_ref, Source::Column),
    ))(input)
}

fn number_or_column(input: &str) -> IResult<&str, Source<f64>> {
    alt((
        map(column_ref, Source::Column),
        map(number_literal, Source::Fixed),
    ))(input)
}

/// Parse a glyph call. The name is not checked here; the dispatcher rejects
/// kinds it does not know.
/// Format: circle(x: a, y: b, color: c, size: 5) or vbar(x: a, top: b, width: 0.8)
pub fn parse_glyph(input: &str) -> IResult<&str, GlyphCall> {
    let (input, name) = ws(verify(identifier, |n: &str| !RESERVED.contains(&n)))(input)?;
    let (input, args) = delimited(
        ws(char('(')),
        separated_list0(
            ws(char(',')),
            alt((
                map(arg("x", column_ref), GlyphArg::X),
                map(arg("y", column_ref), GlyphArg::Y),
                map(arg("top", column_ref), GlyphArg::Y),
                map(arg("color", text_or_column), GlyphArg::Color),
                map(arg("size", number_or_column), GlyphArg::Size),
                map(arg("marker", text_or_column), GlyphArg::Marker),
                map(arg("width", number_literal), GlyphArg::Width),
                map(arg("alpha", number_literal), GlyphArg::Alpha),
                map(arg("legend", string_literal), GlyphArg::Legend),
            )),
        ),
        ws(char(')')),
    )(input)?;

    let mut glyph = GlyphCall {
        name,
        ..GlyphCall::default()
    };
    for a in args {
        match a {
            GlyphArg::X(x) => glyph.x = Some(x),
            GlyphArg::Y(y) => glyph.y = Some(y),
            GlyphArg::Color(c) => glyph.color = Some(c),
            GlyphArg::Size(s) => glyph.size = Some(s),
            GlyphArg::Marker(m) => glyph.marker = Some(m),
            GlyphArg::Width(w) => glyph.width = Some(w),
            GlyphArg::Alpha(a) => glyph.alpha = Some(a),
            GlyphArg::Legend(l) => glyph.legend = Some(l),
        }
    }
    Ok((input, glyph))
}

enum ImageArg {
    Columns(Vec<String>),
    Mapper(String),
    Alpha(f64),
}

/// Parse an image call
/// Format: image(columns: [a, b, c], mapper: "linear")
pub fn parse_image(input: &str) -> IResult<&str, ImageCall> {
    let (input, args) = call(
        "image",
        alt((
            map(arg("columns", column_list), ImageArg::Columns),
            map(arg("mapper", string_literal), ImageArg::Mapper),
            map(arg("alpha", number_literal), ImageArg::Alpha),
        )),
    )(input)?;

    let mut image = ImageCall::default();
    for a in args {
        match a {
            ImageArg::Columns(c) => image.columns = c,
            ImageArg::Mapper(m) => image.mapper = Some(m),
            ImageArg::Alpha(a) => image.alpha = Some(a),
        }
    }
    if image.columns.is_empty() {
        return Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify)));
    }
    Ok((input, image))
}

enum SliderArg {
    Label(String),
    Column(String),
    Frames(Vec<String>),
    Play(f64),
}

/// Parse a slider bound to the previous glyph
/// Format: slider(column: y, frames: [y0, y1, y2], label: "Frame", play: 200)
pub fn parse_slider(input: &str) -> IResult<&str, SliderCall> {
    let (input, args) = call(
        "slider",
        alt((
            map(arg("label", string_literal), SliderArg::Label),
            map(arg("column", identifier), SliderArg::Column),
            map(arg("frames", column_list), SliderArg::Frames),
            map(arg("play", number_literal), SliderArg::Play),
        )),
    )(input)?;

    let mut slider = SliderCall::default();
    for a in args {
        match a {
            SliderArg::Label(l) => slider.label = Some(l),
            SliderArg::Column(c) => slider.column = c,
            SliderArg::Frames(f) => slider.frames = f,
            SliderArg::Play(ms) => slider.play = Some(ms),
        }
    }
    if slider.column.is_empty() {
        return Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify)));
    }
    Ok((input, slider))
}
