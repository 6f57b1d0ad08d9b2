// Pipeline parser for the plotwire script DSL

use super::ast::{FigureArgs, Script, Step};
use super::command::{parse_figure, parse_glyph, parse_image, parse_slider};
use super::lexer::ws;
use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{eof, map},
    error::{Error, ErrorKind},
    multi::separated_list1,
    IResult,
};

#[derive(Debug)]
enum PipelineComponent {
    Figure(FigureArgs),
    Step(Step),
}

fn parse_pipeline_component(input: &str) -> IResult<&str, PipelineComponent> {
    alt((
        map(parse_figure, PipelineComponent::Figure),
        map(parse_image, |i| PipelineComponent::Step(Step::Image(i))),
        map(parse_slider, |s| PipelineComponent::Step(Step::Slider(s))),
        map(parse_glyph, |g| PipelineComponent::Step(Step::Glyph(g))),
    ))(input)
}

/// Parse a complete script
/// Format: component | component | ...
pub fn parse_script(input: &str) -> IResult<&str, Script> {
    let (input, components) = separated_list1(ws(tag("|")), parse_pipeline_component)(input)?;
    let (input, _) = ws(eof)(input)?;

    let mut script = Script::default();
    for comp in components {
        match comp {
            // Later figure settings override earlier ones
            PipelineComponent::Figure(f) => script.figure = Some(f),
            PipelineComponent::Step(s) => script.steps.push(s),
        }
    }

    // A script must draw something
    if !script.steps.iter().any(|s| matches!(s, Step::Glyph(_) | Step::Image(_))) {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    }

    Ok((input, script))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_glyph() {
        let (_, script) = parse_script("line(x: a, y: b)").unwrap();
        assert!(script.figure.is_none());
        assert_eq!(script.steps.len(), 1);
    }

    #[test]
    fn test_parse_full_script() {
        let input = r#"figure(title: "Demo") | line(x: t, y: v) | circle(x: t, y: v, size: 8) | slider(column: y, frames: [v0, v1], play: 50)"#;
        let (_, script) = parse_script(input).unwrap();
        assert_eq!(script.figure.unwrap().title, Some("Demo".to_string()));
        assert_eq!(script.steps.len(), 3);
        assert!(matches!(&script.steps[2], Step::Slider(s) if s.frames.len() == 2));
    }

    #[test]
    fn test_steps_keep_source_order() {
        let (_, script) = parse_script("square(x: a, y: b) | image(columns: [c]) | line(x: a, y: b)").unwrap();
        let kinds: Vec<&str> = script
            .steps
            .iter()
            .map(|s| match s {
                Step::Glyph(g) => g.name.as_str(),
                Step::Image(_) => "image",
                Step::Slider(_) => "slider",
            })
            .collect();
        assert_eq!(kinds, vec!["square", "image", "line"]);
    }

    #[test]
    fn test_parse_script_multiline() {
        let input = "figure()\n  | line(x: a, y: b)\n  | slider(column: y, frames: [c, d])\n";
        assert!(parse_script(input).is_ok());
    }

    #[test]
    fn test_parse_script_trailing_pipe() {
        assert!(parse_script("line(x: a, y: b) |").is_err());
    }

    #[test]
    fn test_parse_script_without_glyph() {
        assert!(parse_script(r#"figure(title: "Empty")"#).is_err());
        assert!(parse_script("slider(column: y, frames: [a])").is_err());
    }

    #[test]
    fn test_parse_script_empty_input() {
        assert!(parse_script("").is_err());
    }

    #[test]
    fn test_parse_script_garbage_suffix() {
        assert!(parse_script("line(x: a, y: b) extra").is_err());
    }
}
