//! wavedeck_engine - 波形音频引擎
//!
//! 定义播放器依赖的引擎接口，并提供基于 symphonia + cpal 的本地实现。

mod command;
mod decoder;
mod engine;
mod native;
mod options;
mod output;
mod peaks;
mod worker;

pub use command::*;
pub use decoder::*;
pub use engine::*;
pub use native::*;
pub use options::*;
pub use output::*;
pub use peaks::*;
