//! Shell completion scripts for the `grow` binary.

use std::fs;
use std::io;

use anyhow::{Context, Result, bail};
use clap::CommandFactory;
use clap_complete::{Shell as CompletionShell, generate, generate_to};

use crate::cli::{Cli, CompletionsArgs, Shell};

impl From<Shell> for CompletionShell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => Self::Bash,
            Shell::Zsh => Self::Zsh,
            Shell::Fish => Self::Fish,
            Shell::PowerShell => Self::PowerShell,
            Shell::Elvish => Self::Elvish,
        }
    }
}

/// Emit a completion script to stdout, or into `--out-dir` under the
/// shell's conventional file name.
pub fn run(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let shell = CompletionShell::from(args.shell);

    if args.stdout {
        generate(shell, &mut cmd, "grow", &mut io::stdout());
        return Ok(());
    }
    let Some(dir) = args.out_dir else {
        bail!("pass --out-dir DIR or --stdout to choose a destination");
    };
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let script = generate_to(shell, &mut cmd, "grow", &dir)
        .with_context(|| format!("write completion script into {}", dir.display()))?;
    eprintln!("completion script written to {}", script.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_cli_shell_maps_to_a_generator() {
        let mapped: Vec<CompletionShell> = [
            Shell::Bash,
            Shell::Zsh,
            Shell::Fish,
            Shell::PowerShell,
            Shell::Elvish,
        ]
        .into_iter()
        .map(CompletionShell::from)
        .collect();
        assert_eq!(
            format!("{mapped:?}"),
            "[Bash, Zsh, Fish, PowerShell, Elvish]"
        );
    }

    #[test]
    fn out_dir_receives_a_script_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = CompletionsArgs {
            shell: Shell::Bash,
            out_dir: Some(dir.path().to_path_buf()),
            stdout: false,
        };
        run(args).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
