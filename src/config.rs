//! Configuration for prn-analyser
//!
//! Settings come from, lowest to highest priority: built-in defaults, a TOML
//! config file, `PRN_ANALYSER_*` environment variables and command-line flags.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use prn_parser::{FontCharConfig, OffsetFormat, SubstitutePolicy, TextConfig, TextParseMethod, XlConfig};

use crate::error::{Error, Result};

/// Largest accepted read chunk
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Command-line arguments
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "prn-analyse")]
#[command(version)]
#[command(about = "Decode PJL and PCL XL print jobs into annotated rows", long_about = None)]
pub struct CliArgs {
    /// Print file to analyse (stdin when omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bytes read per chunk
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<usize>,

    /// Offset column format (dec, hex, none)
    #[arg(short, long, value_name = "FORMAT")]
    pub offset: Option<String>,

    /// Emit JSON instead of a text table
    #[arg(short, long)]
    pub json: bool,

    /// Append the tag statistics summary
    #[arg(short, long)]
    pub stats: bool,

    /// Keep tags that were never seen in the summary
    #[arg(long)]
    pub zero_counts: bool,

    /// With --zero-counts, still drop unused reserved tags
    #[arg(long)]
    pub exclude_reserved: bool,

    /// Text parse method (one-byte, one-byte-alt, two-byte, asian-7bit,
    /// shift-jis, asian-8bit, utf8, utf8-alt)
    #[arg(short, long, value_name = "METHOD")]
    pub method: Option<String>,

    /// Control character display (mnemonic, mnemonic-and-space, hex, dot,
    /// space, byte:X)
    #[arg(long, value_name = "POLICY")]
    pub substitute: Option<String>,

    /// Maximum text columns per row
    #[arg(long, value_name = "COLUMNS")]
    pub max_line_len: Option<usize>,

    /// Draw soft-font character bitmaps
    #[arg(long)]
    pub draw_chars: bool,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AnalyserConfig {
    pub chunk_size: usize,
    pub offset_format: OffsetFormat,
    /// Bytes per row of embedded binary data
    pub binary_slice_len: usize,
    pub output: OutputFormat,
    pub text: TextSettings,
    pub font: FontSettings,
    pub stats: StatsSettings,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4096,
            offset_format: OffsetFormat::Decimal,
            binary_slice_len: 16,
            output: OutputFormat::Text,
            text: TextSettings::default(),
            font: FontSettings::default(),
            stats: StatsSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TextSettings {
    pub method: TextParseMethod,
    pub substitute: SubstitutePolicy,
    pub max_line_len: usize,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            method: TextParseMethod::OneByte,
            substitute: SubstitutePolicy::Mnemonic,
            max_line_len: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FontSettings {
    pub draw_chars: bool,
    pub max_width: u16,
    pub max_height: u16,
    /// Largest bitmap, in bytes, that will be drawn
    pub max_size: u32,
}

impl Default for FontSettings {
    fn default() -> Self {
        let font = FontCharConfig::default();
        Self {
            draw_chars: font.draw_chars,
            max_width: font.max_width,
            max_height: font.max_height,
            max_size: font.max_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StatsSettings {
    pub show: bool,
    pub include_zero: bool,
    pub exclude_unused_reserved: bool,
}

impl AnalyserConfig {
    /// Load configuration with full precedence:
    /// CLI args > environment variables > config file > defaults
    pub fn load_with_args(args: &CliArgs) -> Result<Self> {
        let mut config = match &args.config {
            // An explicitly named file must load
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::load_from_file(&path).unwrap_or_else(|e| {
                    log::warn!("Failed to load config from {:?}: {}", path, e);
                    AnalyserConfig::default()
                }),
                _ => AnalyserConfig::default(),
            },
        };

        config.apply_env_vars();
        config.apply_cli_args(args)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AnalyserConfig = toml::from_str(&content)?;
        log::debug!("loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("prn-analyser").join("config.toml"))
    }

    fn apply_env_vars(&mut self) {
        if let Ok(val) = env::var("PRN_ANALYSER_CHUNK_SIZE") {
            if let Ok(size) = val.parse() {
                self.chunk_size = size;
            }
        }
        if let Ok(val) = env::var("PRN_ANALYSER_OFFSET") {
            if let Some(format) = OffsetFormat::from_name(&val) {
                self.offset_format = format;
            }
        }
        if let Ok(val) = env::var("PRN_ANALYSER_METHOD") {
            if let Some(method) = TextParseMethod::from_name(&val) {
                self.text.method = method;
            }
        }
    }

    /// Apply CLI arguments. Unlike file values, a bad flag value is an error.
    fn apply_cli_args(&mut self, args: &CliArgs) -> Result<()> {
        if let Some(size) = args.chunk_size {
            self.chunk_size = size;
        }
        if let Some(name) = &args.offset {
            self.offset_format = OffsetFormat::from_name(name)
                .ok_or_else(|| Error::config("offset", format!("unknown offset format '{name}'")))?;
        }
        if let Some(name) = &args.method {
            self.text.method = TextParseMethod::from_name(name)
                .ok_or_else(|| Error::config("text.method", format!("unknown text method '{name}'")))?;
        }
        if let Some(name) = &args.substitute {
            self.text.substitute = SubstitutePolicy::from_name(name).ok_or_else(|| {
                Error::config("text.substitute", format!("unknown substitute policy '{name}'"))
            })?;
        }
        if let Some(len) = args.max_line_len {
            self.text.max_line_len = len;
        }
        if args.json {
            self.output = OutputFormat::Json;
        }
        if args.stats {
            self.stats.show = true;
        }
        if args.zero_counts {
            self.stats.include_zero = true;
        }
        if args.exclude_reserved {
            self.stats.exclude_unused_reserved = true;
        }
        if args.draw_chars {
            self.font.draw_chars = true;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunk-size", "must be at least 1"));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::config(
                "chunk-size",
                format!("must be at most {MAX_CHUNK_SIZE}"),
            ));
        }
        if self.binary_slice_len == 0 {
            return Err(Error::config("binary-slice-len", "must be at least 1"));
        }
        if self.text.max_line_len == 0 {
            return Err(Error::config("text.max-line-len", "must be at least 1"));
        }
        if self.font.draw_chars && (self.font.max_width == 0 || self.font.max_height == 0) {
            return Err(Error::config("font", "drawing limits must be non-zero"));
        }
        Ok(())
    }

    pub fn text_config(&self) -> TextConfig {
        TextConfig {
            method: self.text.method,
            substitute: self.text.substitute,
            max_line_len: self.text.max_line_len,
            ..TextConfig::default()
        }
    }

    pub fn xl_config(&self) -> XlConfig {
        XlConfig {
            font: FontCharConfig {
                draw_chars: self.font.draw_chars,
                max_width: self.font.max_width,
                max_height: self.font.max_height,
                max_size: self.font.max_size,
                slice_len: self.binary_slice_len,
            },
            max_line_len: self.text.max_line_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AnalyserConfig::default();
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.text.max_line_len, 64);
        assert_eq!(config.offset_format, OffsetFormat::Decimal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AnalyserConfig::default();
        config.chunk_size = 0;
        assert!(config.validate().is_err());
        config.chunk_size = 1;

        config.text.max_line_len = 0;
        assert!(config.validate().is_err());
        config.text.max_line_len = 64;

        config.binary_slice_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chunk_size_upper_bound() {
        let mut config = AnalyserConfig::default();
        config.chunk_size = MAX_CHUNK_SIZE;
        assert!(config.validate().is_ok());

        for size in [MAX_CHUNK_SIZE + 1, usize::MAX / 2, usize::MAX] {
            config.chunk_size = size;
            assert!(matches!(
                config.validate(),
                Err(Error::Config { ref field, .. }) if field == "chunk-size"
            ));
        }
    }

    #[test]
    fn test_huge_cli_chunk_size_rejected() {
        let mut config = AnalyserConfig::default();
        let args = CliArgs {
            chunk_size: Some(usize::MAX),
            ..CliArgs::default()
        };
        config.apply_cli_args(&args).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
chunk-size = 512
offset-format = "hexadecimal"

[text]
method = "shift-jis"
substitute = "dot"

[font]
draw-chars = true
"#
        )
        .unwrap();

        let config = AnalyserConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.chunk_size, 512);
        assert_eq!(config.offset_format, OffsetFormat::Hexadecimal);
        assert_eq!(config.text.method, TextParseMethod::ShiftJis);
        assert_eq!(config.text.substitute, SubstitutePolicy::Dot);
        assert_eq!(config.text.max_line_len, 64);
        assert!(config.font.draw_chars);
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk-size = \"lots\"").unwrap();
        assert!(matches!(
            AnalyserConfig::load_from_file(file.path()),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk-size = 512").unwrap();

        let args = CliArgs {
            config: Some(file.path().to_path_buf()),
            chunk_size: Some(7),
            method: Some("utf8".to_string()),
            json: true,
            ..CliArgs::default()
        };
        let config = AnalyserConfig::load_with_args(&args).unwrap();
        assert_eq!(config.chunk_size, 7);
        assert_eq!(config.text.method, TextParseMethod::Utf8);
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_cli_value_rejected() {
        let mut config = AnalyserConfig::default();
        let args = CliArgs {
            offset: Some("octal".to_string()),
            ..CliArgs::default()
        };
        assert!(matches!(
            config.apply_cli_args(&args),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_derived_decoder_configs() {
        let mut config = AnalyserConfig::default();
        config.binary_slice_len = 8;
        config.font.draw_chars = true;
        let xl = config.xl_config();
        assert_eq!(xl.font.slice_len, 8);
        assert!(xl.font.draw_chars);
        assert_eq!(config.text_config().method, TextParseMethod::OneByte);
    }
}
