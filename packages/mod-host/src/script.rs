use std::process::Stdio;

use common::event::EngineEvent;
use mod_loader::{ApplyError, EventBus, ModManifest, StyleDocument, UiHost};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::{info, warn};

/// Stdout prefix a script uses to raise an event on the bus.
pub const TRIGGER_PREFIX: &str = "trigger ";

/// UI host that keeps styles in a [`StyleDocument`] and runs each script in
/// an external interpreter, source piped over stdin.
///
/// Scripts talk back through stdout: a line `trigger <event>` is forwarded to
/// the bus, anything else is logged. Evaluation returns once the process is
/// spawned, the same way an injected script keeps running after `eval`.
#[derive(Clone)]
pub struct ProcessUi {
    document: StyleDocument,
    interpreter: String,
    args: Vec<String>,
    bus: EventBus,
}

impl ProcessUi {
    pub fn new(
        document: StyleDocument,
        interpreter: impl Into<String>,
        args: Vec<String>,
        bus: EventBus,
    ) -> Self {
        Self {
            document,
            interpreter: interpreter.into(),
            args,
            bus,
        }
    }

    pub fn document(&self) -> &StyleDocument {
        &self.document
    }
}

impl UiHost for ProcessUi {
    fn append_style(&self, container_id: &str, html: &str) -> Result<(), ApplyError> {
        self.document.append_style(container_id, html)
    }

    fn eval_script(&self, manifest: &ModManifest, source: &str) -> Result<(), ApplyError> {
        let handle = Handle::try_current()
            .map_err(|e| ApplyError::Script(format!("no runtime to run script on: {e}")))?;

        // Spawning needs the runtime's reactor entered.
        let _guard = handle.enter();
        let mut child = Command::new(&self.interpreter)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ApplyError::Script(format!("Failed to spawn {}: {}", self.interpreter, e))
            })?;

        self.document.eval_script(manifest, source)?;

        let name = manifest.name.clone();
        let bus = self.bus.clone();
        let source = source.to_string();
        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        handle.spawn(async move {
            if let Some(mut stdin) = stdin {
                if let Err(e) = stdin.write_all(source.as_bytes()).await {
                    warn!(mod_name = %name, error = %e, "Failed to write script to interpreter");
                }
                // Dropping stdin closes it so the interpreter starts running.
            }

            let forward = async {
                if let Some(stdout) = stdout {
                    let mut lines = BufReader::new(stdout).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        forward_line(&bus, &name, &line);
                    }
                }
            };
            let collect_stderr = async {
                let mut buf = Vec::new();
                if let Some(mut stderr) = stderr {
                    let _ = stderr.read_to_end(&mut buf).await;
                }
                String::from_utf8_lossy(&buf).trim().to_string()
            };
            let ((), stderr_text) = tokio::join!(forward, collect_stderr);

            match child.wait().await {
                Ok(status) if status.success() => {
                    info!(mod_name = %name, "Script exited");
                }
                Ok(status) => {
                    warn!(mod_name = %name, status = %status, stderr = %stderr_text, "Script exited with failure");
                }
                Err(e) => warn!(mod_name = %name, error = %e, "Failed to wait for script"),
            }
        });

        Ok(())
    }
}

/// Route one line of script output.
fn forward_line(bus: &EventBus, mod_name: &str, line: &str) {
    match parse_trigger(line) {
        Some(event) => {
            info!(mod_name, event, "Script triggered event");
            bus.trigger(&EngineEvent::new(event));
        }
        None => info!(mod_name, "{}", line),
    }
}

fn parse_trigger(line: &str) -> Option<&str> {
    let event = line.trim_end().strip_prefix(TRIGGER_PREFIX)?.trim();
    (!event.is_empty()).then_some(event)
}
