//! Docker sandbox runner
//!
//! Every run gets a throwaway container with no network and capped memory and
//! pids. The container is removed whatever the outcome.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use base64::Engine;
use bollard::{
    Docker,
    container::LogOutput,
    exec::{CreateExecOptions, StartExecResults},
    models::{ContainerCreateBody, HostConfig},
    query_parameters::{
        CreateContainerOptionsBuilder, RemoveContainerOptionsBuilder, StartContainerOptions,
    },
};
use futures::StreamExt;
use uuid::Uuid;

use crate::{
    config::RunnerConfig,
    constants::TIMEOUT_EXIT_CODE,
    error::{AppError, AppResult},
    models::{RunOutcome, TestCase},
};

use super::{CodeRunner, LanguageHandler};

/// Output of one command executed inside a container
#[derive(Debug)]
struct ExecResult {
    stdout: String,
    stderr: String,
    exit_code: i64,
}

pub struct DockerRunner {
    docker: Docker,
    config: RunnerConfig,
}

impl DockerRunner {
    /// Connect to the local Docker daemon
    pub async fn connect(config: RunnerConfig) -> AppResult<Self> {
        let docker = Docker::connect_with_socket_defaults()?;

        let version = docker.version().await?;
        tracing::info!(
            version = %version.version.unwrap_or_default(),
            "Connected to Docker"
        );

        Ok(Self { docker, config })
    }

    async fn create_container(&self, handler: &LanguageHandler) -> AppResult<String> {
        let run_id = Uuid::new_v4();
        let options = CreateContainerOptionsBuilder::default()
            .name(&format!("codeduel-run-{}", run_id))
            .build();

        let memory_bytes = self.config.memory_limit_bytes().ok_or_else(|| {
            AppError::Configuration(format!(
                "Memory limit of {} MB is out of range",
                self.config.memory_limit_mb
            ))
        })?;
        let host_config = HostConfig {
            memory: Some(memory_bytes),
            memory_swap: Some(memory_bytes),
            cpu_period: Some(100000),
            cpu_quota: Some(100000), // 1 CPU
            network_mode: Some("none".to_string()),
            pids_limit: Some(64),
            ..Default::default()
        };

        let body = ContainerCreateBody {
            image: Some(handler.image().to_string()),
            cmd: Some(vec!["sleep".to_string(), "infinity".to_string()]),
            host_config: Some(host_config),
            working_dir: Some("/workspace".to_string()),
            env: Some(vec!["LANG=C.UTF-8".to_string()]),
            labels: Some(HashMap::from([(
                "codeduel.run".to_string(),
                run_id.to_string(),
            )])),
            ..Default::default()
        };

        let container = self.docker.create_container(Some(options), body).await?;

        self.docker
            .start_container(&container.id, None::<StartContainerOptions>)
            .await?;

        Ok(container.id)
    }

    async fn remove_container(&self, container_id: &str) -> AppResult<()> {
        let options = RemoveContainerOptionsBuilder::default().force(true).build();
        self.docker
            .remove_container(container_id, Some(options))
            .await?;
        Ok(())
    }

    /// Compile (if needed) and run the program against one input
    async fn execute(
        &self,
        container_id: &str,
        handler: &LanguageHandler,
        source: &str,
        input: &str,
    ) -> AppResult<RunOutcome> {
        self.write_file(container_id, &handler.source_path(), source)
            .await?;

        if let Some(compile_cmd) = handler.compile_command() {
            let compiled = self.exec_command(container_id, compile_cmd).await?;
            if compiled.exit_code != 0 {
                return Ok(RunOutcome {
                    stdout: String::new(),
                    stderr: format!("Compilation failed:\n{}{}", compiled.stdout, compiled.stderr),
                    exit_code: compiled.exit_code,
                    duration_ms: 0.0,
                    timed_out: false,
                });
            }
        }

        self.write_file(container_id, "/workspace/input.txt", input)
            .await?;

        let timeout_secs = self.config.time_limit_ms as f64 / 1000.0;
        let run_cmd = format!(
            "timeout {}s sh -c '{} < /workspace/input.txt'",
            timeout_secs,
            handler.run_command()
        );

        let start = Instant::now();
        let result = self.exec_command(container_id, &run_cmd).await?;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        Ok(RunOutcome {
            stdout: result.stdout,
            stderr: result.stderr,
            exit_code: result.exit_code,
            duration_ms,
            timed_out: result.exit_code == TIMEOUT_EXIT_CODE,
        })
    }

    /// Write a file to the container
    async fn write_file(&self, container_id: &str, path: &str, content: &str) -> AppResult<()> {
        // Use echo with base64 to handle special characters
        let encoded = base64::engine::general_purpose::STANDARD.encode(content);
        let cmd = format!("echo '{}' | base64 -d > {}", encoded, path);

        let result = self.exec_command(container_id, &cmd).await?;
        if result.exit_code != 0 {
            return Err(anyhow::anyhow!("Failed to write {}: {}", path, result.stderr).into());
        }

        Ok(())
    }

    /// Execute a command in the container
    async fn exec_command(&self, container_id: &str, cmd: &str) -> AppResult<ExecResult> {
        let exec = self
            .docker
            .create_exec(
                container_id,
                CreateExecOptions {
                    cmd: Some(vec!["/bin/sh", "-c", cmd]),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        let output = self.docker.start_exec(&exec.id, None).await?;

        let mut stdout = String::new();
        let mut stderr = String::new();

        if let StartExecResults::Attached { mut output, .. } = output {
            while let Some(msg) = output.next().await {
                match msg? {
                    LogOutput::StdOut { message } => {
                        stdout.push_str(&String::from_utf8_lossy(&message));
                    }
                    LogOutput::StdErr { message } => {
                        stderr.push_str(&String::from_utf8_lossy(&message));
                    }
                    _ => {}
                }
            }
        }

        let inspect = self.docker.inspect_exec(&exec.id).await?;

        Ok(ExecResult {
            stdout,
            stderr,
            exit_code: inspect.exit_code.unwrap_or(-1),
        })
    }
}

#[async_trait]
impl CodeRunner for DockerRunner {
    fn name(&self) -> &'static str {
        "docker"
    }

    async fn run(
        &self,
        language: &str,
        source: &str,
        test_case: &TestCase,
    ) -> AppResult<RunOutcome> {
        let handler = LanguageHandler::for_language(language)?;
        let container_id = self.create_container(&handler).await?;

        let outcome = self
            .execute(&container_id, &handler, source, &test_case.input)
            .await;

        if let Err(e) = self.remove_container(&container_id).await {
            tracing::warn!(container_id = %container_id, error = %e, "Failed to remove container");
        }

        outcome
    }
}
