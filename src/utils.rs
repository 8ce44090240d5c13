use chrono::{FixedOffset, Local, Offset};
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

/// Install the stderr log subscriber. `RUST_LOG` wins; otherwise `warn`, or
/// `debug` when `debug` is set.
pub fn setup_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

/// Standard roots the assistant writes project logs under, most common first.
pub fn standard_claude_paths() -> Vec<PathBuf> {
    let basedirs = directories::BaseDirs::new();
    let home = basedirs
        .as_ref()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~"));
    let xdg_config = basedirs
        .as_ref()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| home.join(".config"));
    vec![
        home.join(".claude").join("projects"),
        xdg_config.join("claude").join("projects"),
    ]
}

/// Split a path list. A colon separates only when no comma is present, so
/// comma-separated lists may contain drive letters.
pub fn parse_path_list(list: &str) -> Vec<PathBuf> {
    let list = list.trim();
    if list.is_empty() {
        return Vec::new();
    }
    let sep = if list.contains(',') {
        ','
    } else if list.contains(':') {
        ':'
    } else {
        return vec![PathBuf::from(list)];
    };
    list.split(sep)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Candidate roots from `CLAUDE_DATA_PATHS`, then `CLAUDE_DATA_PATH`, then the
/// standard locations.
pub fn default_data_paths() -> Vec<PathBuf> {
    if let Ok(list) = env::var("CLAUDE_DATA_PATHS") {
        let paths = parse_path_list(&list);
        if !paths.is_empty() {
            return paths;
        }
    }
    if let Ok(single) = env::var("CLAUDE_DATA_PATH") {
        let single = single.trim();
        if !single.is_empty() {
            return vec![PathBuf::from(single)];
        }
    }
    standard_claude_paths()
}

/// Keep the candidates that exist as directories, made absolute.
pub fn discover_data_paths(candidates: &[PathBuf]) -> Vec<PathBuf> {
    candidates
        .iter()
        .filter(|p| p.is_dir())
        .map(|p| absolute(p))
        .collect()
}

fn absolute(p: &Path) -> PathBuf {
    std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf())
}

/// The machine's current UTC offset, used to read reset hours as local time.
pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// `1234567` -> `1,234,567`
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_currency(v: f64) -> String {
    format!("${v:.2}")
}

/// Minutes as `2h 5m`, or `45m` under an hour. Negative input reads as zero.
pub fn format_duration(minutes: i64) -> String {
    let minutes = minutes.max(0);
    let (h, m) = (minutes / 60, minutes % 60);
    if h > 0 { format!("{h}h {m}m") } else { format!("{m}m") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_parse_path_list() {
        assert!(parse_path_list("  ").is_empty());
        assert_eq!(parse_path_list("/a"), vec![PathBuf::from("/a")]);
        assert_eq!(
            parse_path_list("/a:/b: "),
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
        assert_eq!(
            parse_path_list("C:/logs, /b"),
            vec![PathBuf::from("C:/logs"), PathBuf::from("/b")]
        );
    }

    #[test]
    #[serial]
    fn test_default_data_paths_from_env() {
        unsafe {
            env::set_var("CLAUDE_DATA_PATHS", "/one,/two");
            env::set_var("CLAUDE_DATA_PATH", "/single");
        }
        assert_eq!(
            default_data_paths(),
            vec![PathBuf::from("/one"), PathBuf::from("/two")]
        );

        unsafe { env::remove_var("CLAUDE_DATA_PATHS") };
        assert_eq!(default_data_paths(), vec![PathBuf::from("/single")]);

        unsafe { env::remove_var("CLAUDE_DATA_PATH") };
        let standard = default_data_paths();
        assert_eq!(standard.len(), 2);
        assert!(standard.iter().all(|p| p.ends_with("projects")));
    }

    #[test]
    fn test_discover_keeps_existing_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let present = tmp.path().join("projects");
        fs::create_dir(&present).unwrap();
        let file = tmp.path().join("file.jsonl");
        fs::write(&file, "").unwrap();

        let found = discover_data_paths(&[present.clone(), tmp.path().join("missing"), file]);
        assert_eq!(found, vec![present]);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(44_000), "44,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
        assert_eq!(format_currency(0.4567), "$0.46");
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(125), "2h 5m");
        assert_eq!(format_duration(-3), "0m");
    }
}
