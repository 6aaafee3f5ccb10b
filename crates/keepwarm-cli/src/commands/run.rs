//! `keepwarm run`: arm the warmer and relay stdin commands

use super::config;
use crate::args::RunArgs;
use crate::console::{CliConsole, ConsoleReporter};
use anyhow::{Context, Result};
use keepwarm_core::llm::backend_from_config;
use keepwarm_core::{BackendProvider, CacheWarmer, CachedMessages, WarmSnapshot, WarmingConfig};
use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::debug;

/// Line commands accepted on stdin while warming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdinCommand {
    /// Reload the messages file and arm again
    Rearm,
    /// Close the gate; the loop stops at its next tick
    Pause,
    /// Reopen the gate and arm again
    Resume,
    Status,
    Quit,
}

impl FromStr for StdinCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rearm" | "r" => Ok(Self::Rearm),
            "pause" | "p" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "status" | "s" => Ok(Self::Status),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!(
                "Unknown command '{other}' (expected rearm, pause, resume, status or quit)"
            )),
        }
    }
}

/// Apply command-line overrides on top of the loaded configuration
pub fn apply_overrides(config: &mut WarmingConfig, args: &RunArgs, verbose: bool) -> Result<()> {
    if let Some(provider) = &args.provider {
        config.backend.provider = provider
            .parse::<BackendProvider>()
            .context("Invalid --provider")?;
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(pings) = args.pings {
        config.ping_count = pings;
    }
    if verbose {
        config.verbose = true;
    }
    Ok(())
}

fn load_payload(path: &Path) -> Result<Arc<CachedMessages>> {
    let messages = CachedMessages::from_json_file(path)
        .with_context(|| format!("Failed to load messages from {}", path.display()))?;
    Ok(Arc::new(messages))
}

/// Run the warmer until `quit`, EOF or Ctrl-C
pub async fn execute(args: RunArgs, verbose: bool) -> Result<()> {
    let console = CliConsole::new(verbose);

    let loaded = config::load(args.config.as_deref())?;
    let mut config = loaded.config;
    apply_overrides(&mut config, &args, verbose)?;

    if !config.is_warming_enabled() {
        console.warn("Cache warming is disabled (caching off or zero pings); nothing to do");
        return Ok(());
    }

    let payload = load_payload(&args.messages)?;
    if payload.breakpoints() == 0 {
        console.warn("No message carries a cache-control marker; pings may not hit the cache");
    }

    let backend =
        backend_from_config(&config.backend).context("Failed to create completion backend")?;
    let summary = format!(
        "Warming {} messages with {} ({}), {} pings per arming",
        payload.len(),
        backend.name(),
        config.model,
        config.ping_count
    );

    let warmer = CacheWarmer::builder(config, backend)
        .reporter(Arc::new(ConsoleReporter))
        .build()?;

    warmer.arm(payload);
    console.success(&summary);

    relay_commands(
        BufReader::new(tokio::io::stdin()),
        tokio::signal::ctrl_c(),
        &warmer,
        &args.messages,
        &console,
    )
    .await?;

    warmer.shutdown();
    warmer.wait_stopped().await;
    print_status(&warmer.snapshot());
    Ok(())
}

/// Feed line commands to the warmer until `quit`, EOF or `interrupt` resolves.
///
/// The interrupt future is created once and polled across iterations, so an
/// interrupt arriving while a command is handled is not lost.
async fn relay_commands<R, F>(
    input: R,
    interrupt: F,
    warmer: &CacheWarmer,
    messages: &Path,
    console: &CliConsole,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    F: Future,
{
    let mut lines = input.lines();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            _ = &mut interrupt => {
                debug!("Interrupted");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<StdinCommand>() {
                    Ok(StdinCommand::Quit) => break,
                    Ok(command) => handle(warmer, messages, command, console),
                    Err(message) => console.error(&message),
                }
            }
        }
    }
    Ok(())
}

fn handle(warmer: &CacheWarmer, messages: &Path, command: StdinCommand, console: &CliConsole) {
    match command {
        StdinCommand::Rearm => match load_payload(messages) {
            Ok(payload) => {
                warmer.arm(payload);
                console.success("Re-armed");
            }
            Err(err) => console.error(&format!("{err:#}")),
        },
        StdinCommand::Pause => {
            warmer.gate().close();
            console.success("Paused");
        }
        StdinCommand::Resume => match load_payload(messages) {
            Ok(payload) => {
                warmer.gate().open();
                warmer.arm(payload);
                console.success("Resumed");
            }
            Err(err) => console.error(&format!("{err:#}")),
        },
        StdinCommand::Status => print_status(&warmer.snapshot()),
        StdinCommand::Quit => {}
    }
}

fn print_status(snapshot: &WarmSnapshot) {
    println!("{}", render_status(snapshot, Instant::now()));
}

fn render_status(snapshot: &WarmSnapshot, now: Instant) -> String {
    let next = match snapshot.next_fire_at {
        Some(at) if snapshot.remaining_pings > 0 => {
            format!("{}s", at.saturating_duration_since(now).as_secs())
        }
        _ => "-".to_string(),
    };
    format!(
        "phase={:?} remaining={}/{} next_in={} ok={} failed={} launches={}",
        snapshot.phase,
        snapshot.remaining_pings,
        snapshot.configured_pings,
        next,
        snapshot.pings_succeeded,
        snapshot.pings_failed,
        snapshot.worker_launches
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepwarm_core::LoopPhase;
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    fn run_args() -> RunArgs {
        RunArgs {
            messages: PathBuf::from("prefix.json"),
            config: None,
            provider: Some("deepseek".to_string()),
            model: Some("deepseek-chat".to_string()),
            pings: Some(2),
        }
    }

    #[test]
    fn test_stdin_commands() {
        assert_eq!("rearm".parse::<StdinCommand>(), Ok(StdinCommand::Rearm));
        assert_eq!(" PAUSE \n".parse::<StdinCommand>(), Ok(StdinCommand::Pause));
        assert_eq!("resume".parse::<StdinCommand>(), Ok(StdinCommand::Resume));
        assert_eq!("s".parse::<StdinCommand>(), Ok(StdinCommand::Status));
        assert_eq!("exit".parse::<StdinCommand>(), Ok(StdinCommand::Quit));
        assert!("warm".parse::<StdinCommand>().is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = WarmingConfig::default();
        apply_overrides(&mut config, &run_args(), true).unwrap();

        assert_eq!(config.backend.provider, BackendProvider::OpenAi);
        assert_eq!(config.model, "deepseek-chat");
        assert_eq!(config.ping_count, 2);
        assert!(config.verbose);
    }

    #[test]
    fn test_apply_overrides_rejects_unknown_provider() {
        let mut args = run_args();
        args.provider = Some("bedrock".to_string());

        let mut config = WarmingConfig::default();
        assert!(apply_overrides(&mut config, &args, false).is_err());
    }

    #[test]
    fn test_load_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefix.json");
        std::fs::write(
            &path,
            r#"[{"role": "system", "content": "repo map", "cache_control": {"type": "ephemeral"}}]"#,
        )
        .unwrap();

        let payload = load_payload(&path).unwrap();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload.breakpoints(), 1);
        assert!(load_payload(&dir.path().join("missing.json")).is_err());
    }

    fn idle_warmer() -> CacheWarmer {
        let config = WarmingConfig::default();
        let backend = backend_from_config(&config.backend).unwrap();
        CacheWarmer::builder(config, backend)
            .reporter(Arc::new(ConsoleReporter))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_interrupt_stops_relay_with_input_open() {
        let warmer = idle_warmer();
        let console = CliConsole::new(false);
        let (mut writer, reader) = tokio::io::duplex(256);
        writer.write_all(b"pause\nstatus\n").await.unwrap();

        let (interrupt_tx, interrupt_rx) = tokio::sync::oneshot::channel::<()>();
        interrupt_tx.send(()).unwrap();

        // The writer stays alive, so only the interrupt can end the relay
        tokio::time::timeout(
            Duration::from_secs(5),
            relay_commands(
                BufReader::new(reader),
                interrupt_rx,
                &warmer,
                Path::new("prefix.json"),
                &console,
            ),
        )
        .await
        .expect("relay should stop on interrupt")
        .unwrap();
        drop(writer);
    }

    #[tokio::test]
    async fn test_relay_handles_commands_until_quit() {
        let warmer = idle_warmer();
        let console = CliConsole::new(false);

        relay_commands(
            BufReader::new(&b"pause\nbogus\n\nquit\nresume\n"[..]),
            std::future::pending::<()>(),
            &warmer,
            Path::new("prefix.json"),
            &console,
        )
        .await
        .unwrap();

        // `resume` after `quit` is never read
        assert!(!warmer.gate().is_open());
    }

    #[test]
    fn test_render_status() {
        let now = Instant::now();
        let snapshot = WarmSnapshot {
            phase: LoopPhase::Running,
            configured_pings: 3,
            remaining_pings: 2,
            interval: Duration::from_secs(295),
            next_fire_at: Some(now + Duration::from_secs(120)),
            armed: true,
            worker_launches: 1,
            pings_succeeded: 1,
            pings_failed: 0,
        };

        assert_eq!(
            render_status(&snapshot, now),
            "phase=Running remaining=2/3 next_in=120s ok=1 failed=0 launches=1"
        );
    }
}
