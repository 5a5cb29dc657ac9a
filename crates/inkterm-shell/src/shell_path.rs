use std::path::Path;

use crate::error::ShellError;

/// Shell used when neither the passwd record nor `$SHELL` gives one.
pub const DEFAULT_SHELL: &str = "sh";

/// Location of the local account database.
pub const PASSWD_PATH: &str = "/etc/passwd";

/// Real user id of this process.
pub fn current_uid() -> u32 {
    nix::unistd::getuid().as_raw()
}

/// Find the login shell for `uid` in passwd-formatted text.
///
/// Lines that do not have exactly seven fields, or whose uid field is not a
/// number, are skipped.
pub fn login_shell_from_passwd(contents: &str, uid: u32) -> Option<String> {
    contents.lines().find_map(|line| {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() != 7 {
            return None;
        }
        let entry_uid: u32 = fields[2].parse().ok()?;
        (entry_uid == uid).then(|| fields[6].to_string())
    })
}

/// Read the login shell for `uid` from a passwd file.
pub fn login_shell(passwd: &Path, uid: u32) -> Result<String, ShellError> {
    let contents = std::fs::read_to_string(passwd)?;
    login_shell_from_passwd(&contents, uid).ok_or(ShellError::NoPasswdEntry(uid))
}

/// Pick the shell to run: passwd record, then `env_shell`, then [`DEFAULT_SHELL`].
pub fn resolve_shell_from(passwd: &Path, uid: u32, env_shell: Option<String>) -> String {
    match login_shell(passwd, uid) {
        Ok(shell) if !shell.trim().is_empty() => return shell,
        Ok(_) => log::warn!("passwd entry for uid {uid} has an empty shell"),
        Err(e) => log::warn!("could not read login shell: {e}"),
    }

    match env_shell {
        Some(shell) if !shell.trim().is_empty() => shell,
        _ => DEFAULT_SHELL.to_string(),
    }
}

/// Resolve the current user's shell. Never fails.
pub fn resolve_shell() -> String {
    let shell = resolve_shell_from(
        Path::new(PASSWD_PATH),
        current_uid(),
        std::env::var("SHELL").ok(),
    );
    log::info!("using shell {shell}");
    shell
}
