use anyhow::Result;
use log::warn;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Parse a `KEY=value` env file. Blank lines and `#` comments are skipped,
/// single or double quotes around a value are stripped, and a line without
/// `=` is warned about and ignored. The process environment is not touched.
pub fn parse_env_path(path: &Path) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    if !path.exists() {
        return Ok(map);
    }
    let content = fs::read_to_string(path)?;
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) => {
                map.insert(key.trim().to_string(), unquote(value.trim()).to_string());
            }
            None => warn!(
                "{} line {} has no '=' and was ignored: {}",
                path.display(),
                idx + 1,
                line
            ),
        }
    }
    Ok(map)
}

/// Entries of `./.env`, if it exists.
pub fn parse_env_file() -> Result<HashMap<String, String>> {
    parse_env_path(Path::new(".env"))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
}

/// Seed the process environment from `./.env`. Variables already present in
/// the environment win over file entries.
pub fn load_dotenv_if_present() -> Result<()> {
    for (key, value) in parse_env_file()? {
        if std::env::var_os(&key).is_none() {
            unsafe {
                std::env::set_var(&key, &value);
            }
        }
    }
    Ok(())
}

/// Generate a .env.template file with placeholder values and comments.
pub fn write_env_template(path: &str) -> Result<()> {
    let mut f = fs::File::create(path)?;
    let template = r#"# table_matcher environment configuration template
# Copy this file to .env and adjust as needed.
# Any of these variables can also be provided via the system environment.

# Corpus to run against: stock | flight | wikipedia
TABLE_MATCHER_DATASET=flight

# Table variant for the stock corpus: raw | clean (ignored elsewhere)
#TABLE_MATCHER_VARIANT=clean

# Root directory holding the corpus artifacts
#TABLE_MATCHER_DATA_DIR=./data

# Root directory for the per-window result logs
#TABLE_MATCHER_RESULTS_DIR=./results

# Near-duplicate pair set for the wikipedia corpus (gzip JSON array of pairs)
#TABLE_MATCHER_CANDIDATE_FILE=./data/wikipedia/candidates.json.gz
"#;
    f.write_all(template.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_strips_quotes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("env");
        fs::write(
            &path,
            "# comment\n\nTABLE_MATCHER_DATASET=stock\nTABLE_MATCHER_DATA_DIR=\"/srv/data\"\nBROKEN LINE\nQUOTED='x'\n",
        )
        .unwrap();
        let map = parse_env_path(&path).unwrap();
        assert_eq!(map.get("TABLE_MATCHER_DATASET").unwrap(), "stock");
        assert_eq!(map.get("TABLE_MATCHER_DATA_DIR").unwrap(), "/srv/data");
        assert_eq!(map.get("QUOTED").unwrap(), "x");
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let map = parse_env_path(&tmp.path().join("absent")).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_unquote_requires_matching_pair() {
        assert_eq!(unquote("\"a b\""), "a b");
        assert_eq!(unquote("'a'"), "a");
        assert_eq!(unquote("\"half"), "\"half");
        assert_eq!(unquote("plain"), "plain");
    }

    #[test]
    fn test_template_round_trips_through_parser() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join(".env.template");
        write_env_template(path.to_str().unwrap()).unwrap();
        let map = parse_env_path(&path).unwrap();
        assert_eq!(map.get("TABLE_MATCHER_DATASET").unwrap(), "flight");
        assert_eq!(map.len(), 1);
    }
}
