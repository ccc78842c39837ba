//! UI 模块

pub mod deck;
pub mod theme;
pub mod waveform;

pub use deck::PlayerDeck;
pub use theme::DeckTheme;
pub use waveform::WaveformView;
