/// Line-oriented text commands for driving a scene
use nalgebra::Vector3;
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{anychar, multispace0, multispace1, u32 as decimal},
    combinator::{all_consuming, map, map_opt, value},
    number::complete::float,
    sequence::preceded,
    IResult,
};

use crate::error::CommandError;
use crate::letter::{LetterKind, LetterParam};
use crate::render::{DisplayMode, ShadingMode};
use crate::scene::SceneCommand;
use crate::transform::Axis;

/// Parse a single command such as `rotate y 30` or `letter 0 kind h`
pub fn parse_command(input: &str) -> Result<SceneCommand, CommandError> {
    let line = input.trim();
    if line.is_empty() {
        return Err(CommandError::Empty);
    }
    match all_consuming(command)(line) {
        Ok((_, command)) => Ok(command),
        Err(e) => {
            let message = match e {
                nom::Err::Error(e) | nom::Err::Failure(e) if e.input.is_empty() => {
                    "unexpected end of command".to_string()
                }
                nom::Err::Error(e) | nom::Err::Failure(e) => format!("unexpected `{}`", e.input),
                nom::Err::Incomplete(_) => "incomplete command".to_string(),
            };
            Err(CommandError::Syntax {
                input: line.to_string(),
                message,
            })
        }
    }
}

/// Parse a script of one command per line; blank lines and `#` comments are skipped
pub fn parse_script(text: &str) -> Result<Vec<SceneCommand>, CommandError> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(parse_command)
        .collect()
}

fn command(input: &str) -> IResult<&str, SceneCommand> {
    let (input, command) = alt((
        display,
        shading,
        mirror,
        rotate,
        camera,
        move_camera,
        translate,
        zoom,
        drag,
        scale,
        light_position,
        light_direction,
        letter,
        resize,
        value(SceneCommand::ToggleAxes, tag_no_case("axes")),
        value(SceneCommand::ToggleLightMarker, tag_no_case("marker")),
        value(SceneCommand::ResetView, tag_no_case("reset")),
    ))(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, command))
}

fn display(input: &str) -> IResult<&str, SceneCommand> {
    let (input, _) = tag_no_case("display")(input)?;
    let (input, mode) = preceded(
        multispace1,
        alt((
            value(DisplayMode::Points, tag_no_case("points")),
            value(DisplayMode::Wireframe, tag_no_case("wireframe")),
            value(DisplayMode::Filled, tag_no_case("filled")),
        )),
    )(input)?;
    Ok((input, SceneCommand::SetDisplayMode(mode)))
}

fn shading(input: &str) -> IResult<&str, SceneCommand> {
    let (input, _) = tag_no_case("shading")(input)?;
    let (input, mode) = preceded(
        multispace1,
        alt((
            value(ShadingMode::Flat, tag_no_case("flat")),
            value(ShadingMode::Flat, tag_no_case("monotone")),
            value(ShadingMode::Gouraud, tag_no_case("gouraud")),
            value(ShadingMode::Phong, tag_no_case("phong")),
        )),
    )(input)?;
    Ok((input, SceneCommand::SetShadingMode(mode)))
}

fn mirror(input: &str) -> IResult<&str, SceneCommand> {
    let (input, _) = tag_no_case("mirror")(input)?;
    let (input, axis) = preceded(multispace1, axis)(input)?;
    Ok((input, SceneCommand::ToggleMirror(axis)))
}

fn rotate(input: &str) -> IResult<&str, SceneCommand> {
    let (input, _) = tag_no_case("rotate")(input)?;
    let (input, axis) = preceded(multispace1, axis)(input)?;
    let (input, degrees) = number(input)?;
    Ok((input, SceneCommand::RotateObject { axis, degrees }))
}

fn camera(input: &str) -> IResult<&str, SceneCommand> {
    let (input, _) = tag_no_case("camera")(input)?;
    let (input, axis) = preceded(multispace1, axis)(input)?;
    let (input, degrees) = number(input)?;
    Ok((input, SceneCommand::RotateCamera { axis, degrees }))
}

fn move_camera(input: &str) -> IResult<&str, SceneCommand> {
    let (input, _) = tag_no_case("move")(input)?;
    let (input, (dx, dy, dz)) = triple(input)?;
    Ok((input, SceneCommand::MoveCamera { dx, dy, dz }))
}

fn translate(input: &str) -> IResult<&str, SceneCommand> {
    let (input, _) = tag_no_case("translate")(input)?;
    let (input, (dx, dy, dz)) = triple(input)?;
    Ok((input, SceneCommand::TranslateObject { dx, dy, dz }))
}

fn zoom(input: &str) -> IResult<&str, SceneCommand> {
    let (input, _) = tag_no_case("zoom")(input)?;
    let (input, delta) = number(input)?;
    Ok((input, SceneCommand::Zoom { delta }))
}

fn drag(input: &str) -> IResult<&str, SceneCommand> {
    let (input, _) = tag_no_case("drag")(input)?;
    let (input, dx) = number(input)?;
    let (input, dy) = number(input)?;
    Ok((input, SceneCommand::Drag { dx, dy }))
}

fn scale(input: &str) -> IResult<&str, SceneCommand> {
    let (input, _) = tag_no_case("scale")(input)?;
    let (input, s) = number(input)?;
    Ok((input, SceneCommand::SetScale(s)))
}

fn light_position(input: &str) -> IResult<&str, SceneCommand> {
    let (input, _) = tag_no_case("lightpos")(input)?;
    let (input, (x, y, z)) = triple(input)?;
    Ok((input, SceneCommand::SetLightPosition(Vector3::new(x, y, z))))
}

fn light_direction(input: &str) -> IResult<&str, SceneCommand> {
    let (input, _) = tag_no_case("light")(input)?;
    let (input, (x, y, z)) = triple(input)?;
    Ok((input, SceneCommand::SetLightDirection(Vector3::new(x, y, z))))
}

fn letter(input: &str) -> IResult<&str, SceneCommand> {
    let (input, _) = tag_no_case("letter")(input)?;
    let (input, index) = preceded(multispace1, decimal)(input)?;
    let (input, param) = preceded(multispace1, letter_param)(input)?;
    Ok((
        input,
        SceneCommand::SetLetterParam {
            index: index as usize,
            param,
        },
    ))
}

fn letter_param(input: &str) -> IResult<&str, LetterParam> {
    alt((
        map(preceded(tag_no_case("height"), number), LetterParam::Height),
        map(preceded(tag_no_case("width"), number), LetterParam::Width),
        map(preceded(tag_no_case("depth"), number), LetterParam::Depth),
        map(preceded(tag_no_case("offset"), number), LetterParam::OffsetX),
        map(
            preceded(
                tag_no_case("kind"),
                preceded(multispace1, map_opt(anychar, LetterKind::from_char)),
            ),
            LetterParam::Kind,
        ),
    ))(input)
}

fn resize(input: &str) -> IResult<&str, SceneCommand> {
    let (input, _) = tag_no_case("resize")(input)?;
    let (input, width) = preceded(multispace1, decimal)(input)?;
    let (input, height) = preceded(multispace1, decimal)(input)?;
    Ok((input, SceneCommand::Resize { width, height }))
}

fn axis(input: &str) -> IResult<&str, Axis> {
    alt((
        value(Axis::X, tag_no_case("x")),
        value(Axis::Y, tag_no_case("y")),
        value(Axis::Z, tag_no_case("z")),
    ))(input)
}

/// Whitespace-separated float operand
fn number(input: &str) -> IResult<&str, f32> {
    preceded(multispace1, float)(input)
}

fn triple(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, x) = number(input)?;
    let (input, y) = number(input)?;
    let (input, z) = number(input)?;
    Ok((input, (x, y, z)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!(
            parse_command("display wireframe"),
            Ok(SceneCommand::SetDisplayMode(DisplayMode::Wireframe))
        );
        assert_eq!(
            parse_command("  SHADING Gouraud  "),
            Ok(SceneCommand::SetShadingMode(ShadingMode::Gouraud))
        );
        assert_eq!(
            parse_command("shading monotone"),
            Ok(SceneCommand::SetShadingMode(ShadingMode::Flat))
        );
    }

    #[test]
    fn test_parse_transforms() {
        assert_eq!(
            parse_command("rotate y -30.5"),
            Ok(SceneCommand::RotateObject {
                axis: Axis::Y,
                degrees: -30.5
            })
        );
        assert_eq!(
            parse_command("camera x 10"),
            Ok(SceneCommand::RotateCamera {
                axis: Axis::X,
                degrees: 10.0
            })
        );
        assert_eq!(
            parse_command("move 1 2 3"),
            Ok(SceneCommand::MoveCamera {
                dx: 1.0,
                dy: 2.0,
                dz: 3.0
            })
        );
        assert_eq!(
            parse_command("translate 0 -5 2.5"),
            Ok(SceneCommand::TranslateObject {
                dx: 0.0,
                dy: -5.0,
                dz: 2.5
            })
        );
        assert_eq!(parse_command("zoom 120"), Ok(SceneCommand::Zoom { delta: 120.0 }));
        assert_eq!(
            parse_command("drag 4 -2"),
            Ok(SceneCommand::Drag { dx: 4.0, dy: -2.0 })
        );
        assert_eq!(parse_command("mirror z"), Ok(SceneCommand::ToggleMirror(Axis::Z)));
        assert_eq!(parse_command("scale 0.75"), Ok(SceneCommand::SetScale(0.75)));
    }

    #[test]
    fn test_parse_light() {
        assert_eq!(
            parse_command("light 0.5 0.5 -1"),
            Ok(SceneCommand::SetLightDirection(Vector3::new(0.5, 0.5, -1.0)))
        );
        assert_eq!(
            parse_command("lightpos 10 20 -30"),
            Ok(SceneCommand::SetLightPosition(Vector3::new(10.0, 20.0, -30.0)))
        );
    }

    #[test]
    fn test_parse_letter_params() {
        assert_eq!(
            parse_command("letter 1 height 50"),
            Ok(SceneCommand::SetLetterParam {
                index: 1,
                param: LetterParam::Height(50.0)
            })
        );
        assert_eq!(
            parse_command("letter 0 offset -75"),
            Ok(SceneCommand::SetLetterParam {
                index: 0,
                param: LetterParam::OffsetX(-75.0)
            })
        );
        assert_eq!(
            parse_command("letter 0 kind H"),
            Ok(SceneCommand::SetLetterParam {
                index: 0,
                param: LetterParam::Kind(LetterKind::H)
            })
        );
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(
            parse_command("resize 1024 768"),
            Ok(SceneCommand::Resize {
                width: 1024,
                height: 768
            })
        );
        assert_eq!(parse_command("axes"), Ok(SceneCommand::ToggleAxes));
        assert_eq!(parse_command("marker"), Ok(SceneCommand::ToggleLightMarker));
        assert_eq!(parse_command("Reset"), Ok(SceneCommand::ResetView));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert!(matches!(parse_command("spin x 10"), Err(CommandError::Syntax { .. })));
        assert!(matches!(parse_command("rotate w 10"), Err(CommandError::Syntax { .. })));
        assert!(matches!(parse_command("rotate x"), Err(CommandError::Syntax { .. })));
        assert!(matches!(parse_command("letter 0 kind q"), Err(CommandError::Syntax { .. })));
        assert!(matches!(parse_command("resize -1 5"), Err(CommandError::Syntax { .. })));
        assert!(matches!(parse_command("axes now"), Err(CommandError::Syntax { .. })));
    }

    #[test]
    fn test_parse_script() {
        let script = "# set up a side view\n\
                      display filled\n\
                      \n\
                      rotate y 90   # quarter turn\n\
                      zoom 240\n";
        let commands = parse_script(script).unwrap();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[2], SceneCommand::Zoom { delta: 240.0 });

        let err = parse_script("display filled\nbogus\n").unwrap_err();
        assert_eq!(
            err,
            CommandError::Syntax {
                input: "bogus".to_string(),
                message: "unexpected `bogus`".to_string()
            }
        );
    }
}
