//! External command renderers.

use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::RenderError;
use crate::format::ImageFormat;
use crate::registry::Renderer;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A renderer that pipes the diagram source into a command and reads the
/// image from its stdout. The command's stderr goes straight to the operator.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    svg_args: Vec<String>,
    png_args: Option<Vec<String>>,
    timeout: Option<Duration>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, svg_args: Vec<String>) -> Self {
        CommandRenderer {
            program: program.into(),
            svg_args,
            png_args: None,
            timeout: None,
        }
    }

    pub fn with_png_args(mut self, args: Vec<String>) -> Self {
        self.png_args = Some(args);
        self
    }

    /// Kill the command if it runs longer than `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Graphviz: `dot -Tsvg`.
    pub fn graphviz() -> Self {
        CommandRenderer::new("dot", args(&["-Tsvg"])).with_png_args(args(&["-Tpng"]))
    }

    /// PlantUML in pipe mode.
    pub fn plantuml() -> Self {
        CommandRenderer::new("plantuml", args(&["-pipe", "-tsvg"]))
            .with_png_args(args(&["-pipe", "-tpng"]))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn args_for(&self, format: ImageFormat) -> Option<&[String]> {
        match format {
            ImageFormat::Svg => Some(&self.svg_args),
            ImageFormat::Png => self.png_args.as_deref(),
        }
    }
}

impl Renderer for CommandRenderer {
    fn render(&self, source: &str, format: ImageFormat) -> Result<Vec<u8>, RenderError> {
        let args = self
            .args_for(format)
            .ok_or_else(|| RenderError::UnsupportedFormat {
                program: self.program.clone(),
                format,
            })?;
        run(&self.program, args, source.as_bytes(), self.timeout)
    }
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Run `program`, feeding `input` on stdin, and return everything it wrote to stdout.
pub fn run(
    program: &str,
    args: &[String],
    input: &[u8],
    timeout: Option<Duration>,
) -> Result<Vec<u8>, RenderError> {
    debug!("running {} {}", program, args.join(" "));
    let io_error = |source: io::Error| RenderError::Io {
        program: program.to_string(),
        source,
    };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| RenderError::CommandNotFound {
            program: program.to_string(),
            source,
        })?;

    // stdin and stdout are serviced on their own threads so a command that
    // writes before it has read all of its input cannot deadlock.
    let writer = child.stdin.take().map(|mut stdin| {
        let input = input.to_vec();
        thread::spawn(move || stdin.write_all(&input))
    });
    let reader = child.stdout.take().map(|mut stdout| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        })
    });

    let status = wait(&mut child, program, timeout)?;

    if let Some(writer) = writer {
        match writer.join() {
            Ok(Ok(())) => {}
            // The command may legitimately exit without reading everything.
            Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(io_error(e)),
            Err(_) => return Err(io_error(io::Error::other("stdin writer panicked"))),
        }
    }
    let output = match reader {
        Some(reader) => reader
            .join()
            .map_err(|_| io_error(io::Error::other("stdout reader panicked")))?
            .map_err(io_error)?,
        None => Vec::new(),
    };

    if !status.success() {
        return Err(RenderError::Failed {
            program: program.to_string(),
            status,
        });
    }
    Ok(output)
}

fn wait(
    child: &mut Child,
    program: &str,
    timeout: Option<Duration>,
) -> Result<ExitStatus, RenderError> {
    let io_error = |source| RenderError::Io {
        program: program.to_string(),
        source,
    };
    let Some(timeout) = timeout else {
        return child.wait().map_err(io_error);
    };

    let start = Instant::now();
    loop {
        match child.try_wait().map_err(io_error)? {
            Some(status) => return Ok(status),
            None if start.elapsed() >= timeout => {
                // Reap the killed child; its status carries no information here.
                let _ = child.kill();
                let _ = child.wait();
                return Err(RenderError::TimedOut {
                    program: program.to_string(),
                    timeout,
                });
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    }
}
