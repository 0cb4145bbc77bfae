use anyhow::anyhow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OpenCommand {
    pub(crate) program: &'static str,
    pub(crate) args: Vec<std::ffi::OsString>,
}

pub(crate) fn open_url_command(url: &str) -> anyhow::Result<OpenCommand> {
    let program = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "linux") {
        "xdg-open"
    } else {
        return Err(anyhow!("opening a browser is not supported on this platform"));
    };

    Ok(OpenCommand {
        program,
        args: vec![url.into()],
    })
}

/// Full-page handoff to the provider's consent screen. Irreversible from the
/// caller's point of view; the next signal is the redirect callback.
pub(crate) fn open_in_browser(url: &str) -> anyhow::Result<()> {
    let command = open_url_command(url)?;
    let status = std::process::Command::new(command.program)
        .args(&command.args)
        .status()
        .map_err(|err| anyhow!("failed to spawn {}: {err}", command.program))?;
    if !status.success() {
        return Err(anyhow!("{} exited with {status}", command.program));
    }
    Ok(())
}
