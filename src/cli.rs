use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Custom enum for log levels that can be used with clap's ValueEnum
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convert our custom LogLevel enum to log crate's LevelFilter
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Output image formats
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Png,
    Jpg,
    Tga,
    Exr,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Tga => "tga",
            OutputFormat::Exr => "exr",
        }
    }
}

/// Command line arguments structure using clap derive macros
#[derive(Parser)]
#[command(name = "chromabake")]
#[command(about = "Bakes high-poly detail into the UV textures of a low-poly mesh")]
pub struct Args {
    /// Low-poly mesh whose UV layout defines the output textures
    #[arg(short, long, help = "Path to the low-poly OBJ mesh")]
    pub lowpoly: PathBuf,

    /// High-poly mesh providing the baked detail
    #[arg(short = 'H', long, help = "Path to the high-poly OBJ mesh")]
    pub highpoly: PathBuf,

    /// Output texture size in pixels
    #[arg(short, long, default_value = "1024", help = "Size of the output textures in pixels")]
    pub size: u32,

    /// Directory for the baked textures (defaults to the low-poly mesh directory)
    #[arg(short, long, help = "Directory for the baked textures")]
    pub output_dir: Option<PathBuf>,

    /// Image format of the baked textures
    #[arg(long, value_enum, default_value = "png", help = "Image format of the baked textures")]
    pub format: OutputFormat,

    /// Use all logical cores instead of half of them
    #[arg(long, help = "Use all logical cores instead of half of them")]
    pub all_cores: bool,

    /// Explicit worker thread count (overrides --all-cores)
    #[arg(short = 'j', long, help = "Number of worker threads")]
    pub workers: Option<usize>,

    /// Set the logging level (defaults to "info")
    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub debug_level: LogLevel,

    /// Hide the progress bar
    #[arg(long, help = "Hide the progress bar")]
    pub no_progress: bool,

    /// Send baked textures to TEV
    #[arg(long, help = "Send baked textures to TEV")]
    pub tev: bool,

    /// TEV client IP address and port (automatically enables --tev)
    #[arg(long, help = "TEV client IP address and port (automatically enables --tev)")]
    pub tev_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["chromabake", "-l", "low.obj", "-H", "high.obj"]);
        assert_eq!(args.size, 1024);
        assert!(matches!(args.format, OutputFormat::Png));
        assert!(!args.all_cores);
        assert!(args.workers.is_none());
        assert_eq!(LevelFilter::from(args.debug_level), LevelFilter::Info);
    }

    #[test]
    fn explicit_values() {
        let args = Args::parse_from([
            "chromabake", "--lowpoly", "a.obj", "--highpoly", "b.obj", "-s", "256", "--format", "exr",
            "-j", "3", "--tev-address", "127.0.0.1",
        ]);
        assert_eq!(args.size, 256);
        assert_eq!(args.format.extension(), "exr");
        assert_eq!(args.workers, Some(3));
        assert_eq!(args.tev_address.as_deref(), Some("127.0.0.1"));
    }
}
