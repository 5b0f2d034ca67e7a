use std::{
    fs::{OpenOptions, create_dir_all},
    path::Path,
};

use env_logger::{Builder, Target};
use log::LevelFilter;

pub fn parse_level(log_level: &str) -> Option<LevelFilter> {
    match log_level.trim().to_lowercase().as_str() {
        "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "off" => Some(LevelFilter::Off),
        _ => None,
    }
}

/// Installs the global logger. Output goes to stderr unless `log_file` is set.
pub fn init_logger(log_level: &str, log_file: Option<&str>) -> Result<(), String> {
    let level = parse_level(log_level).unwrap_or_else(|| {
        eprintln!("Invalid log level '{}', defaulting to 'info'", log_level);
        LevelFilter::Info
    });

    let mut builder = Builder::new();
    builder.filter_level(level).format_timestamp_secs();

    if let Some(log_file) = log_file {
        if let Some(parent) = Path::new(log_file).parent() {
            create_dir_all(parent)
                .map_err(|err| format!("Failed to create log directory: {}", err))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .map_err(|err| format!("Failed to open log file '{}': {}", log_file, err))?;

        builder.target(Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .map_err(|err| format!("Failed to install logger: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_levels() {
        assert_eq!(parse_level("DEBUG"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" warn "), Some(LevelFilter::Warn));
        assert_eq!(parse_level("off"), Some(LevelFilter::Off));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn log_file_in_missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("slist.log");

        // a second logger in the same process fails to install; the file
        // must exist either way
        let _ = init_logger("info", path.to_str());
        assert!(path.exists());
    }
}
