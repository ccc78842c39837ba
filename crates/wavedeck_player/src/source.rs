//! 音频源

use std::fmt;

use serde::Serialize;

/// 音频源：路径或 URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AudioSource(String);

impl AudioSource {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 最后一个 `/` 之后的部分，作为界面显示的文件名
    pub fn display_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }
}

impl From<&str> for AudioSource {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<String> for AudioSource {
    fn from(source: String) -> Self {
        Self(source)
    }
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
