//! wavedeck_player - 播放器状态同步层
//!
//! 把界面操作转发给音频引擎，并把引擎事件同步到可观察的播放器状态。

mod binding;
mod format;
mod player;
mod source;
mod state;
mod view;

#[cfg(test)]
mod testing;

pub use binding::*;
pub use format::*;
pub use player::*;
pub use source::*;
pub use state::*;
pub use view::*;
