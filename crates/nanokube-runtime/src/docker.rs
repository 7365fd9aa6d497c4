//! A `ContainerRuntime` backed by shelling out to the `docker` CLI.
//!
//! Grounded on `original_source/agent/node_agent.go`'s `exec.Command("docker", ...)`
//! calls: the same `run -d --memory=.. --memory-swap=.. --cpus=.. --pids-limit=100
//! --security-opt=no-new-privileges -p host:container` argument shape, and the
//! same `docker inspect -f <template>` probing idiom, ported from
//! `os/exec` to `tokio::process::Command`.

use tokio::process::Command;
use tokio_util::io::ReaderStream;

use crate::error::RuntimeError;
use crate::runtime::{ContainerRuntime, ContainerSpec, Inspection, LogStream};

pub struct DockerCliRuntime {
    binary: String,
}

impl Default for DockerCliRuntime {
    fn default() -> Self {
        DockerCliRuntime {
            binary: "docker".to_string(),
        }
    }
}

impl DockerCliRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the `docker` binary path, for tests that point at a stub.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        DockerCliRuntime { binary: binary.into() }
    }

    fn command(&self) -> Command {
        Command::new(&self.binary)
    }
}

#[async_trait::async_trait]
impl ContainerRuntime for DockerCliRuntime {
    async fn create_and_start(&self, spec: &ContainerSpec) -> Result<String, RuntimeError> {
        let existing = self.inspect(&spec.name).await?;
        if existing.exists {
            return Err(RuntimeError::DuplicateName(spec.name.clone()));
        }

        let mut args: Vec<String> = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            spec.name.clone(),
            format!("--memory={}", spec.memory_limit),
            format!("--memory-swap={}", spec.memory_limit),
            format!("--cpus={}", spec.cpu_limit),
            "--pids-limit=100".to_string(),
            "--security-opt=no-new-privileges".to_string(),
        ];
        for mapping in &spec.port_mappings {
            args.push("-p".to_string());
            args.push(format!("{}:{}", mapping.host_port, mapping.container_port));
        }
        args.push(spec.image.clone());
        if let Some(command) = &spec.command {
            args.extend(command.iter().cloned());
        }

        let output = self.command().args(&args).output().await?;
        if !output.status.success() {
            return Err(RuntimeError::Backend(format!(
                "docker run failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let inspected = self.inspect(&spec.name).await?;
        inspected.id.ok_or_else(|| {
            RuntimeError::Backend(format!("started container {} but could not read its id", spec.name))
        })
    }

    async fn inspect(&self, name: &str) -> Result<Inspection, RuntimeError> {
        let output = self
            .command()
            .args(["inspect", "-f", "{{.State.Running}}|{{.Id}}", name])
            .output()
            .await?;
        if !output.status.success() {
            return Ok(Inspection::absent());
        }
        let text = String::from_utf8_lossy(&output.stdout);
        let mut parts = text.trim().splitn(2, '|');
        let running = parts.next() == Some("true");
        let id = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
        Ok(Inspection {
            exists: true,
            running,
            id,
        })
    }

    async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
        if !self.inspect(name).await?.exists {
            return Ok(());
        }
        // docker's default grace period is 10s: SIGTERM, then SIGKILL.
        let output = self.command().args(["stop", "-t", "10", name]).output().await?;
        if !output.status.success() {
            return Err(RuntimeError::Backend(format!(
                "docker stop failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), RuntimeError> {
        if !self.inspect(name).await?.exists {
            return Ok(());
        }
        let output = self.command().args(["rm", name]).output().await?;
        if !output.status.success() {
            return Err(RuntimeError::Backend(format!(
                "docker rm failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }

    async fn logs(&self, name: &str) -> Result<LogStream, RuntimeError> {
        let mut child = self
            .command()
            .args(["logs", "-f", name])
            .stdout(std::process::Stdio::piped())
            .spawn()?;
        let stdout = child.stdout.take().ok_or_else(|| {
            RuntimeError::Backend(format!("docker logs for {} did not open a stdout pipe", name))
        })?;
        // The child is detached once dropped; `docker logs -f` exits on its
        // own once the container stops, matching the streaming contract.
        Ok(Box::pin(ReaderStream::new(stdout)))
    }
}
