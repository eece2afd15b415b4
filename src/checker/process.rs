//! Subprocess-backed native resolver and add tool.
//!
//! The native tool is handed the manifest set as JSON on stdin and answers
//! on stdout: a `[{"name", "version"}]` array for `resolve`, a
//! `{"coherent": bool}` object for `validate`. The checker may be slow
//! (seconds), so `validate` enforces the caller-supplied timeout by
//! polling the child and killing it at the deadline.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::checker::{CheckVerdict, NativeResolver, ResolvedDependency, TopLevelAdder};
use crate::graph::ManifestGraph;

/// A [`NativeResolver`] that shells out to a configured program.
pub struct CommandResolver {
    program: String,
    args: Vec<String>,
}

#[derive(Deserialize)]
struct WireDependency {
    name: String,
    version: String,
}

#[derive(Deserialize)]
struct WireVerdict {
    coherent: bool,
}

impl CommandResolver {
    /// Create a resolver invoking `program` with leading `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandResolver {
            program: program.into(),
            args,
        }
    }

    fn payload(
        graph: &ManifestGraph,
        target: &str,
        requested: &[ResolvedDependency],
    ) -> String {
        let files: BTreeMap<&str, &str> = graph
            .files()
            .map(|f| (f.path(), f.content()))
            .collect();
        let requested: Vec<_> = requested
            .iter()
            .map(|r| serde_json::json!({ "name": r.name, "version": r.version }))
            .collect();
        serde_json::json!({
            "target": target,
            "requested": requested,
            "files": files,
        })
        .to_string()
    }

    fn spawn(&self, verb: &str, target: &str) -> Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .arg(verb)
            .arg("--target")
            .arg(target)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn native resolver `{}`", self.program))
    }
}

impl NativeResolver for CommandResolver {
    fn resolved_dependencies(
        &self,
        graph: &ManifestGraph,
        target: &str,
        requested: &[ResolvedDependency],
    ) -> Result<Vec<ResolvedDependency>> {
        let mut child = self.spawn("resolve", target)?;
        feed_stdin(&mut child, &Self::payload(graph, target, requested))?;
        let output = child
            .wait_with_output()
            .context("native resolver did not exit cleanly")?;
        if !output.status.success() {
            bail!(
                "native resolver failed for target `{}`: {}",
                target,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let deps: Vec<WireDependency> = serde_json::from_slice(&output.stdout)
            .context("native resolver produced malformed JSON")?;
        Ok(deps
            .into_iter()
            .map(|d| ResolvedDependency {
                name: d.name,
                version: d.version,
            })
            .collect())
    }

    fn validate(
        &self,
        graph: &ManifestGraph,
        target: &str,
        timeout: Duration,
    ) -> Result<CheckVerdict> {
        let mut child = self.spawn("validate", target)?;
        feed_stdin(&mut child, &Self::payload(graph, target, &[]))?;

        // Drain both pipes off-thread while polling: a checker emitting
        // more than a pipe buffer of diagnostics would otherwise block on
        // a full pipe and be misreported as a timeout.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + timeout;
        loop {
            if child.try_wait().context("failed to poll checker")?.is_some() {
                break;
            }
            if Instant::now() >= deadline {
                tracing::warn!(target, "consistency check timed out; killing checker");
                let _ = child.kill();
                let _ = child.wait();
                return Ok(CheckVerdict::TimedOut);
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();
        if !stderr.trim().is_empty() {
            tracing::debug!(target, stderr = stderr.trim(), "checker diagnostics");
        }

        let verdict: WireVerdict =
            serde_json::from_str(&stdout).context("checker produced malformed JSON")?;
        Ok(if verdict.coherent {
            CheckVerdict::Coherent
        } else {
            CheckVerdict::Incoherent
        })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}

fn feed_stdin(child: &mut Child, payload: &str) -> Result<()> {
    let mut stdin = child
        .stdin
        .take()
        .context("native tool stdin unavailable")?;
    stdin
        .write_all(payload.as_bytes())
        .context("failed to write native tool payload")?;
    Ok(())
}

/// A [`TopLevelAdder`] that shells out, e.g. to the ecosystem's own
/// `add` command.
pub struct CommandAdder {
    program: String,
    args: Vec<String>,
}

impl CommandAdder {
    /// Create an adder invoking `program` with leading `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandAdder {
            program: program.into(),
            args,
        }
    }
}

impl TopLevelAdder for CommandAdder {
    fn add_top_level(&self, manifest_path: &str, name: &str, version: &str) -> Result<bool> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg("add")
            .arg(manifest_path)
            .arg(name)
            .arg("--version")
            .arg(version)
            .status()
            .with_context(|| format!("failed to spawn add tool `{}`", self.program))?;
        Ok(status.success())
    }
}
