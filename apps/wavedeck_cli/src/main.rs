//! wavedeck-cli - 命令行播放器
//!
//! 不带界面地挂载播放器：查看音频信息或直接播放到结尾。

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use wavedeck_engine::{EngineFactory, NativeEngineFactory, WaveformOptions};
use wavedeck_player::{format_time, AudioSource, Player, PlayerState};

/// 轮询引擎事件的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Parser, Debug)]
#[command(name = "wavedeck-cli", about = "Headless waveform audio player")]
struct Cli {
    /// 波形展示参数（TOML）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 等待引擎就绪的最长秒数
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 加载音频并以 JSON 输出播放器状态
    Info { source: String },
    /// 播放到结尾，每秒输出一次进度
    Play {
        source: String,
        /// 播放音量 (0.0 - 1.0)
        #[arg(long)]
        volume: Option<f32>,
    },
}

#[derive(Serialize)]
struct InfoReport<'a> {
    valid: bool,
    source: &'a AudioSource,
    duration_text: String,
    #[serde(flatten)]
    state: &'a PlayerState,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Info { source } => info(&cli, source),
        Command::Play { source, volume } => play(&cli, source, *volume),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(2);
    }
}

fn mount(cli: &Cli, source: &str) -> anyhow::Result<Player<NativeEngineFactory>> {
    let options = WaveformOptions::load_or_default(cli.config.as_deref())
        .context("Failed to load config")?;

    let mut player = Player::new(NativeEngineFactory, options);
    player.mount(source)?;
    wait_ready(&mut player, Duration::from_secs(cli.timeout))?;
    Ok(player)
}

/// 轮询直到 `ready` 或出错
fn wait_ready<F: EngineFactory>(player: &mut Player<F>, timeout: Duration) -> anyhow::Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        player.poll_events();
        let state = player.state();
        if let Some(error) = &state.last_error {
            bail!("{}", error);
        }
        if state.duration > 0.0 || !state.file_name.is_empty() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            bail!("Timed out waiting for the engine");
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn info(cli: &Cli, source: &str) -> anyhow::Result<()> {
    let player = match mount(cli, source) {
        Ok(player) => player,
        Err(e) => {
            println!("{}", serde_json::json!({ "valid": false, "error": format!("{:#}", e) }));
            std::process::exit(2);
        }
    };

    let state = player.state();
    let report = InfoReport {
        valid: true,
        source: player.source().context("Player not mounted")?,
        duration_text: format_time(state.duration),
        state,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn play(cli: &Cli, source: &str, volume: Option<f32>) -> anyhow::Result<()> {
    if let Some(volume) = volume {
        if !(0.0..=1.0).contains(&volume) {
            bail!("Volume must be between 0.0 and 1.0, got {}", volume);
        }
    }

    let mut player = mount(cli, source)?;
    if let Some(volume) = volume {
        player.set_volume(volume);
    }

    let view = player.view();
    println!("Playing: {}", view.file_name);
    println!("Duration: {} | Volume: {}", view.duration_text, view.volume_text);

    player.toggle_play_pause();

    let mut last_report = Instant::now();
    while player.state().playing {
        player.poll_events();

        if let Some(error) = &player.state().last_error {
            bail!("{}", error);
        }

        if last_report.elapsed() >= Duration::from_secs(1) {
            let view = player.view();
            println!("{} / {}", view.current_time_text, view.duration_text);
            last_report = Instant::now();
        }

        thread::sleep(POLL_INTERVAL);
    }

    tracing::debug!(%source, "playback finished");
    println!("Finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_play() {
        let cli = Cli::try_parse_from([
            "wavedeck-cli",
            "play",
            "/assets/chapter-1.mp3",
            "--volume",
            "0.5",
            "--timeout",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.timeout, 5);
        match cli.command {
            Command::Play { source, volume } => {
                assert_eq!(source, "/assets/chapter-1.mp3");
                assert_eq!(volume, Some(0.5));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_play_rejects_out_of_range_volume() {
        let cli = Cli::try_parse_from(["wavedeck-cli", "play", "a.mp3", "--volume", "1.5"]).unwrap();
        let err = play(&cli, "a.mp3", Some(1.5)).unwrap_err();
        assert!(err.to_string().contains("between 0.0 and 1.0"));
    }
}
