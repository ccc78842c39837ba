//! 波形展示参数
//!
//! 默认值即播放器固定使用的展示配置，也可以从 TOML 文件覆盖。

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

/// 配置错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid color: {0}")]
    Color(String),
}

/// RGBA 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

impl FromStr for Rgba {
    type Err = ConfigError;

    /// 支持 `#rgb`、`#rrggbb` 和 `transparent`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("transparent") {
            return Ok(Rgba::TRANSPARENT);
        }

        let invalid = || ConfigError::Color(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());

        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Rgba::opaque(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Rgba::opaque(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_transparent() {
            f.write_str("transparent")
        } else {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        }
    }
}

/// 波形展示参数
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaveformOptions {
    /// 波形绘制到的宿主容器名
    pub container: String,
    pub wave_color: Rgba,
    pub progress_color: Rgba,
    /// 播放光标颜色，透明即隐藏
    pub cursor_color: Rgba,
    /// 容器尺寸变化时重新布局
    pub responsive: bool,
    pub height: f32,
    /// 按最大峰值归一化振幅
    pub normalize: bool,
    pub bar_width: f32,
    pub bar_gap: f32,
    /// 波形峰值采样数
    pub peak_buckets: usize,
}

impl Default for WaveformOptions {
    fn default() -> Self {
        Self {
            container: "waveform".to_string(),
            wave_color: Rgba::opaque(0xcc, 0xcc, 0xcc),
            progress_color: Rgba::opaque(0x01, 0x78, 0xff),
            cursor_color: Rgba::TRANSPARENT,
            responsive: true,
            height: 80.0,
            normalize: true,
            bar_width: 2.0,
            bar_gap: 3.0,
            peak_buckets: 512,
        }
    }
}

impl WaveformOptions {
    /// 从 TOML 文件读取，未出现的字段取默认值
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// 读取可选配置文件
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_colors() {
        assert_eq!("#ccc".parse::<Rgba>().unwrap(), Rgba::opaque(204, 204, 204));
        assert_eq!("#0178ff".parse::<Rgba>().unwrap(), Rgba::opaque(1, 120, 255));
        assert_eq!("transparent".parse::<Rgba>().unwrap(), Rgba::TRANSPARENT);
        assert!("#12".parse::<Rgba>().is_err());
        assert!("0178ff".parse::<Rgba>().is_err());
        assert!("#zzzzzz".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Rgba::opaque(1, 120, 255).to_string(), "#0178ff");
        assert_eq!(Rgba::TRANSPARENT.to_string(), "transparent");
    }

    #[test]
    fn test_default_options() {
        let options = WaveformOptions::default();
        assert_eq!(options.wave_color.to_string(), "#cccccc");
        assert_eq!(options.progress_color.to_string(), "#0178ff");
        assert!(options.cursor_color.is_transparent());
        assert!(options.responsive);
        assert!(options.normalize);
        assert_eq!(options.height, 80.0);
        assert_eq!(options.bar_width, 2.0);
        assert_eq!(options.bar_gap, 3.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let options = WaveformOptions::from_toml(
            r##"
height = 120.0
wave_color = "#ff0000"
"##,
        )
        .unwrap();

        assert_eq!(options.height, 120.0);
        assert_eq!(options.wave_color, Rgba::opaque(255, 0, 0));
        assert_eq!(options.progress_color, WaveformOptions::default().progress_color);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(WaveformOptions::from_toml("bar_radius = 2.0").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bar_gap = 1.0\ncursor_color = \"#000\"").unwrap();

        let options = WaveformOptions::load_or_default(Some(file.path())).unwrap();
        assert_eq!(options.bar_gap, 1.0);
        assert_eq!(options.cursor_color, Rgba::opaque(0, 0, 0));

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            WaveformOptions::load(&missing),
            Err(ConfigError::Io(_))
        ));
    }
}
