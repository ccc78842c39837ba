//! wavedeck - 波形音频播放器

mod logging;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use eframe::egui;
use wavedeck_engine::{NativeEngineFactory, WaveformOptions};
use wavedeck_player::Player;

use ui::deck::DeckAction;
use ui::{DeckTheme, PlayerDeck, WaveformView};

/// 播放中界面刷新间隔
const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "wavedeck", about = "Waveform audio player")]
struct Args {
    /// 音频文件路径或 file:// URL
    #[arg(default_value = "assets/chapter-1.mp3")]
    source: String,

    /// 波形展示参数（TOML）
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init().map_err(|e| anyhow::anyhow!("failed to init logging: {}", e))?;

    let options = WaveformOptions::load_or_default(args.config.as_deref())?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 320.0])
            .with_min_inner_size([360.0, 260.0])
            .with_title("wavedeck"),
        ..Default::default()
    };

    eframe::run_native(
        "wavedeck",
        native_options,
        Box::new(move |cc| {
            DeckTheme::apply(&cc.egui_ctx);
            Ok(Box::new(WavedeckApp::new(options, args.source)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))
}

struct WavedeckApp {
    player: Player<NativeEngineFactory>,
    mount_error: Option<String>,
}

impl WavedeckApp {
    fn new(options: WaveformOptions, source: String) -> Self {
        let mut app = Self {
            player: Player::new(NativeEngineFactory, options),
            mount_error: None,
        };
        app.open(source);
        app
    }

    /// 切换音频源，旧引擎在新引擎创建前释放
    fn open(&mut self, source: String) {
        tracing::info!(%source, "opening");
        self.mount_error = match self.player.mount(source) {
            Ok(()) => None,
            Err(e) => {
                tracing::error!("failed to mount player: {}", e);
                Some(e.to_string())
            }
        };
    }
}

impl eframe::App for WavedeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 处理引擎事件
        self.player.poll_events();

        let mut action = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                WaveformView::show(ui, &self.player);
                ui.add_space(8.0);
                action = PlayerDeck::show(ui, &mut self.player);
                ui.add_space(15.0);
                PlayerDeck::info(ui, &self.player, self.mount_error.as_deref());
            });
        });

        if let Some(DeckAction::Open(path)) = action {
            self.open(path.to_string_lossy().into_owned());
        }

        // 播放中或等待 ready 时定时刷新
        let state = self.player.state();
        let waiting = self.player.is_mounted()
            && state.file_name.is_empty()
            && state.last_error.is_none();
        if state.playing || waiting {
            ctx.request_repaint_after(REPAINT_INTERVAL);
        }
    }
}
