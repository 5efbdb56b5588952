#![cfg(unix)]

use std::time::{Duration, Instant};

use renderer::{CommandRenderer, ImageFormat, RenderError, Renderer};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn pipes_source_through_the_command() {
    let cat = CommandRenderer::new("cat", Vec::new());
    let output = cat.render("digraph { a -> b }\n", ImageFormat::Svg).unwrap();
    assert_eq!(output, b"digraph { a -> b }\n");
}

#[test]
fn large_input_does_not_deadlock() {
    let source = "x".repeat(1 << 20);
    let cat = CommandRenderer::new("cat", Vec::new()).with_timeout(Some(Duration::from_secs(30)));
    let output = cat.render(&source, ImageFormat::Svg).unwrap();
    assert_eq!(output.len(), source.len());
}

#[test]
fn png_uses_its_own_arguments() {
    let renderer = CommandRenderer::new("echo", args(&["svg"])).with_png_args(args(&["png"]));
    assert_eq!(renderer.render("", ImageFormat::Svg).unwrap(), b"svg\n");
    assert_eq!(renderer.render("", ImageFormat::Png).unwrap(), b"png\n");
}

#[test]
fn png_without_arguments_is_unsupported() {
    let err = CommandRenderer::new("cat", Vec::new())
        .render("", ImageFormat::Png)
        .unwrap_err();
    assert!(matches!(err, RenderError::UnsupportedFormat { format: ImageFormat::Png, .. }), "{:?}", err);
}

#[test]
fn missing_program() {
    let err = CommandRenderer::new("mdrender-no-such-renderer", Vec::new())
        .render("", ImageFormat::Svg)
        .unwrap_err();
    assert!(matches!(err, RenderError::CommandNotFound { .. }), "{:?}", err);
}

#[test]
fn nonzero_exit_is_a_failure() {
    let err = CommandRenderer::new("sh", args(&["-c", "cat >/dev/null; exit 3"]))
        .render("bad input", ImageFormat::Svg)
        .unwrap_err();
    let RenderError::Failed { status, .. } = &err else {
        panic!("expected failure, got {:?}", err);
    };
    assert_eq!(status.code(), Some(3));
}

#[test]
fn slow_command_is_killed() {
    let started = Instant::now();
    let err = CommandRenderer::new("sleep", args(&["10"]))
        .with_timeout(Some(Duration::from_millis(200)))
        .render("", ImageFormat::Svg)
        .unwrap_err();
    assert!(matches!(err, RenderError::TimedOut { .. }), "{:?}", err);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn builtin_programs() {
    assert_eq!(CommandRenderer::graphviz().program(), "dot");
    assert_eq!(CommandRenderer::plantuml().program(), "plantuml");
}
