use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// A log line shipped by a browser client.
#[derive(Debug, Clone)]
pub struct ClientLog {
    pub level: LogLevel,
    pub message: String,
    pub username: Option<String>,
    pub timestamp: Option<String>,
}

/// A server log file name, restricted to a plain file in the log directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileName(String);

impl LogFileName {
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && !raw.starts_with('.')
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_names_cannot_escape_the_directory() {
        assert!(LogFileName::parse("server.log").is_some());
        assert!(LogFileName::parse("server.log.2024-01-01").is_some());
        assert!(LogFileName::parse("../etc/passwd").is_none());
        assert!(LogFileName::parse("a/b.log").is_none());
        assert!(LogFileName::parse(".hidden").is_none());
        assert!(LogFileName::parse("").is_none());
    }

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("fatal".parse::<LogLevel>().unwrap(), LogLevel::Fatal);
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
