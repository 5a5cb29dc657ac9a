use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

use crate::error::ShellError;

/// Program and arguments used to start the shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShellCommand {
    program: String,
    args: Vec<String>,
}

impl ShellCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn build(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

/// The three pipe ends of a freshly spawned shell.
pub struct ShellPipes {
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
}

/// Owns one running shell child process.
///
/// The child is killed when this handle is dropped.
pub struct ShellProcess {
    child: Child,
}

impl ShellProcess {
    /// Spawn the shell with all three standard streams piped.
    ///
    /// A missing pipe counts as a spawn failure: the half-started child is
    /// killed and the error is returned so the caller can retry.
    pub fn spawn(command: &ShellCommand) -> Result<(Self, ShellPipes), ShellError> {
        let mut child = command.build().spawn().map_err(ShellError::SpawnFailed)?;

        let pipes = match take_pipes(&mut child) {
            Ok(pipes) => pipes,
            Err(e) => {
                let _ = child.start_kill();
                return Err(e);
            }
        };

        Ok((Self { child }, pipes))
    }

    /// OS process id, while the child has not been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the child to exit and reap it.
    pub async fn wait(&mut self) -> Result<ExitStatus, ShellError> {
        Ok(self.child.wait().await?)
    }

    /// Kill the child and reap it.
    pub async fn kill(&mut self) -> Result<(), ShellError> {
        Ok(self.child.kill().await?)
    }
}

fn take_pipes(child: &mut Child) -> Result<ShellPipes, ShellError> {
    let stdin = child.stdin.take().ok_or(ShellError::PipeMissing("stdin"))?;
    let stdout = child.stdout.take().ok_or(ShellError::PipeMissing("stdout"))?;
    let stderr = child.stderr.take().ok_or(ShellError::PipeMissing("stderr"))?;
    Ok(ShellPipes {
        stdin,
        stdout,
        stderr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_spawn_and_echo() {
        let (mut process, mut pipes) = ShellProcess::spawn(&ShellCommand::new("/bin/sh")).unwrap();
        assert!(process.id().is_some());

        pipes.stdin.write_all(b"echo INKTERM_OK\n").await.unwrap();
        drop(pipes.stdin);

        let mut out = String::new();
        pipes.stdout.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "INKTERM_OK\n");

        let status = process.wait().await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_exit_code_reported() {
        let cmd = ShellCommand::new("/bin/sh").args(["-c", "exit 7"]);
        let (mut process, _pipes) = ShellProcess::spawn(&cmd).unwrap();
        let status = process.wait().await.unwrap();
        assert_eq!(status.code(), Some(7));
    }

    #[tokio::test]
    async fn test_spawn_missing_binary_fails() {
        let result = ShellProcess::spawn(&ShellCommand::new("/nonexistent/inkterm-shell"));
        assert!(matches!(result, Err(ShellError::SpawnFailed(_))));
    }

    #[tokio::test]
    async fn test_kill_running_shell() {
        let (mut process, _pipes) = ShellProcess::spawn(&ShellCommand::new("/bin/sh")).unwrap();
        process.kill().await.unwrap();
        assert!(process.id().is_none());
    }

    #[test]
    fn test_command_builder() {
        let cmd = ShellCommand::new("/bin/sh").arg("-c").args(["true"]);
        assert_eq!(cmd.program(), "/bin/sh");
        assert_eq!(cmd.args, vec!["-c".to_string(), "true".to_string()]);
    }
}
