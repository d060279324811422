//! Running external programs out of process
//!
//! Override scripts are user code. They are evaluated by a separate
//! interpreter process that shares no memory with the formatter and is
//! killed when it exceeds its time budget; whatever goes wrong in there
//! comes back as `None` and a log line. External foreign formatters use the
//! same process plumbing, without a time limit.

use anyhow::{Context, Result, anyhow, bail};
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Program that imports a module given as its last argument and prints the
/// module's default export as JSON.
pub const NODE_LOADER: &str = r#"
import { pathToFileURL } from "node:url";
const mod = await import(pathToFileURL(process.argv[process.argv.length - 1]).href);
process.stdout.write(JSON.stringify(mod.default ?? mod.overrides ?? []));
"#;

/// Evaluates override scripts in a child process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptRunner {
    /// Interpreter argv; the script path is appended as the last argument
    pub command: Vec<String>,
    pub timeout: Duration,
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self {
            command: vec![
                "node".to_string(),
                "--input-type=module".to_string(),
                "--eval".to_string(),
                NODE_LOADER.to_string(),
            ],
            timeout: Duration::from_millis(5000),
        }
    }
}

impl ScriptRunner {
    /// Runs `script` and returns its standard output, or `None` if the
    /// interpreter could not start, failed, or ran out of time.
    pub fn evaluate(&self, script: &Path) -> Option<String> {
        let mut argv = self.command.clone();
        argv.push(script.display().to_string());
        match run(&argv, None, &[], Some(self.timeout)) {
            Ok(stdout) => Some(stdout),
            Err(err) => {
                tracing::warn!(script = %script.display(), "override script failed: {err:#}");
                None
            }
        }
    }
}

/// Spawns `argv`, feeds it `input` on stdin and collects stdout.
///
/// A non-zero exit status is an error carrying the program's stderr. With a
/// `timeout`, the child is killed once it runs longer than that. The reader
/// and writer threads are not joined after a timeout: a grandchild that
/// inherited the pipes keeps them alive until it exits on its own.
pub(crate) fn run(
    argv: &[String],
    input: Option<&str>,
    envs: &[(&str, String)],
    timeout: Option<Duration>,
) -> Result<String> {
    let (program, args) = argv.split_first().context("empty command line")?;
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in envs {
        command.env(key, value);
    }

    let mut child = command
        .spawn()
        .with_context(|| format!("failed to start `{program}`"))?;

    let writer = match (input, child.stdin.take()) {
        (Some(text), Some(mut stdin)) => {
            let text = text.to_string();
            Some(thread::spawn(move || stdin.write_all(text.as_bytes())))
        }
        _ => None,
    };
    let stdout = child.stdout.take().context("stdout was not captured")?;
    let stderr = child.stderr.take().context("stderr was not captured")?;
    let stdout_reader = thread::spawn(move || read_all(stdout));
    let stderr_reader = thread::spawn(move || read_all(stderr));

    let status = wait(&mut child, timeout).with_context(|| format!("`{program}` did not finish"))?;

    if let Some(writer) = writer {
        // A child that exits without reading all of stdin closes the pipe.
        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::debug!(program = %program, "stdin not fully written: {err}"),
            Err(_) => bail!("stdin writer panicked"),
        }
    }

    let stdout = stdout_reader
        .join()
        .map_err(|_| anyhow!("stdout reader panicked"))??;
    let stderr = stderr_reader
        .join()
        .map_err(|_| anyhow!("stderr reader panicked"))??;

    if !status.success() {
        bail!("`{program}` exited with {status}: {}", stderr.trim());
    }
    Ok(stdout)
}

fn wait(child: &mut Child, timeout: Option<Duration>) -> Result<ExitStatus> {
    let Some(timeout) = timeout else {
        return Ok(child.wait()?);
    };
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if started.elapsed() >= timeout {
            child.kill().ok();
            child.wait().ok();
            bail!("timed out after {timeout:?}");
        }
        thread::sleep(Duration::from_millis(10));
    }
}

fn read_all(mut reader: impl Read) -> std::io::Result<String> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text)
}
