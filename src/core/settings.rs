//! Settings module
//!
//! User-configurable settings read from `procviewrc`. The file is a list of
//! `key=value` lines; blank lines and lines starting with `#` are ignored,
//! as are unknown keys and unparseable values.
//!
//! Sort, filter and selection are per-session and never stored here.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Shortest allowed refresh period
pub const MIN_REFRESH_INTERVAL_MS: u64 = 100;
/// Longest allowed refresh period
pub const MAX_REFRESH_INTERVAL_MS: u64 = 60_000;

/// Color schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Default,
    Monochrome,
}

impl ColorScheme {
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => ColorScheme::Monochrome,
            _ => ColorScheme::Default,
        }
    }
}

/// Signal sent by the "Kill process" action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KillSignal {
    #[default]
    Kill,
    Term,
}

impl KillSignal {
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_uppercase();
        match upper.trim_start_matches("SIG") {
            "KILL" | "9" => Some(KillSignal::Kill),
            "TERM" | "15" => Some(KillSignal::Term),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KillSignal::Kill => "KILL",
            KillSignal::Term => "TERM",
        }
    }
}

/// Main settings structure
#[derive(Debug, Clone)]
pub struct Settings {
    pub filename: Option<PathBuf>,
    pub readonly: bool,

    pub refresh_interval_ms: u64,
    pub enable_mouse: bool,
    pub allow_unicode: bool,
    pub color_scheme: ColorScheme,
    pub kill_signal: KillSignal,
    /// How long a status notice stays on screen
    pub notice_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::new()
    }
}

impl Settings {
    pub fn new() -> Self {
        Settings {
            filename: Self::default_config_path(),
            readonly: false,
            refresh_interval_ms: 5000,
            enable_mouse: true,
            allow_unicode: true,
            color_scheme: ColorScheme::Default,
            kill_signal: KillSignal::Kill,
            notice_secs: 4,
        }
    }

    /// Get the default config file path
    fn default_config_path() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("procview").join("procviewrc"))
        } else {
            dirs::home_dir().map(|home| home.join(".config").join("procview").join("procviewrc"))
        }
    }

    /// Load settings from the config file
    pub fn load(&mut self) -> anyhow::Result<()> {
        let path = match &self.filename {
            Some(p) => p.clone(),
            None => return Ok(()),
        };

        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(());
        }

        self.load_from(&path)
    }

    fn load_from(&mut self, path: &Path) -> anyhow::Result<()> {
        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                self.parse_setting(key.trim(), value.trim());
            }
        }

        debug!(path = %path.display(), "settings loaded");
        Ok(())
    }

    /// Parse a single setting line
    fn parse_setting(&mut self, key: &str, value: &str) {
        match key {
            "refresh_interval_ms" => {
                if let Ok(v) = value.parse::<u64>() {
                    self.refresh_interval_ms =
                        v.clamp(MIN_REFRESH_INTERVAL_MS, MAX_REFRESH_INTERVAL_MS);
                }
            }
            "enable_mouse" => {
                self.enable_mouse = value == "1";
            }
            "allow_unicode" => {
                self.allow_unicode = value == "1";
            }
            "color_scheme" => {
                if let Ok(v) = value.parse::<i32>() {
                    self.color_scheme = ColorScheme::from_i32(v);
                }
            }
            "kill_signal" => match KillSignal::from_name(value) {
                Some(sig) => self.kill_signal = sig,
                None => warn!(value, "unknown kill_signal in settings"),
            },
            "notice_secs" => {
                if let Ok(v) = value.parse::<u64>() {
                    self.notice_secs = v.clamp(1, 60);
                }
            }
            _ => {
                debug!(key, "ignoring unknown setting");
            }
        }
    }

    /// Apply the `--delay` command line value (tenths of a second)
    pub fn set_delay_tenths(&mut self, tenths: u32) {
        let tenths = tenths.clamp(1, 600) as u64;
        self.refresh_interval_ms = tenths * 100;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_text(text: &str) -> Settings {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        let mut settings = Settings::new();
        settings.filename = Some(file.path().to_path_buf());
        settings.load().unwrap();
        settings
    }

    #[test]
    fn test_defaults() {
        let s = Settings::new();
        assert_eq!(s.refresh_interval_ms, 5000);
        assert!(s.enable_mouse);
        assert_eq!(s.kill_signal, KillSignal::Kill);
    }

    #[test]
    fn test_load_parses_known_keys() {
        let s = load_text(
            "# procview settings\n\
             refresh_interval_ms=2000\n\
             enable_mouse=0\n\
             \n\
             color_scheme = 1\n\
             kill_signal=SIGTERM\n\
             notice_secs=9\n\
             sort_key=cpu\n",
        );
        assert_eq!(s.refresh_interval_ms, 2000);
        assert!(!s.enable_mouse);
        assert_eq!(s.color_scheme, ColorScheme::Monochrome);
        assert_eq!(s.kill_signal, KillSignal::Term);
        assert_eq!(s.notice_secs, 9);
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let s = load_text("refresh_interval_ms=soon\nkill_signal=HUP\nallow_unicode=1\n");
        assert_eq!(s.refresh_interval_ms, 5000);
        assert_eq!(s.kill_signal, KillSignal::Kill);
        assert!(s.allow_unicode);
    }

    #[test]
    fn test_interval_clamped() {
        let s = load_text("refresh_interval_ms=1\n");
        assert_eq!(s.refresh_interval_ms, MIN_REFRESH_INTERVAL_MS);
    }

    #[test]
    fn test_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = Settings::new();
        s.filename = Some(dir.path().join("nope"));
        assert!(s.load().is_ok());
        assert_eq!(s.refresh_interval_ms, 5000);
    }

    #[test]
    fn test_delay_tenths() {
        let mut s = Settings::new();
        s.set_delay_tenths(15);
        assert_eq!(s.refresh_interval_ms, 1500);
        s.set_delay_tenths(0);
        assert_eq!(s.refresh_interval_ms, 100);
        s.set_delay_tenths(9999);
        assert_eq!(s.refresh_interval_ms, 60_000);
    }
}
