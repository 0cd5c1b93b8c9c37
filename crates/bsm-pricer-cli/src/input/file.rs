use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON or YAML file (chosen by extension) into a typed struct.
pub fn read_structured<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    parse_contents(&canonical, &contents)
}

/// Read CSV rows with a header line into typed records.
pub fn read_csv<T: DeserializeOwned>(path: &str) -> Result<Vec<T>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let mut rows = Vec::new();
    for (line, record) in rdr.deserialize().enumerate() {
        let row: T = record.map_err(|e| {
            format!(
                "Failed to parse '{}' row {}: {}",
                canonical.display(),
                line + 1,
                e
            )
        })?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn is_csv(path: &str) -> bool {
    has_extension(Path::new(path), &["csv"])
}

fn has_extension(path: &Path, candidates: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| candidates.iter().any(|c| e.eq_ignore_ascii_case(c)))
        .unwrap_or(false)
}

fn parse_contents<T: DeserializeOwned>(
    path: &Path,
    contents: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    let parsed = if has_extension(path, &["yaml", "yml"]) {
        serde_yaml::from_str(contents).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| format!("Failed to parse '{}': {}", path.display(), e).into())
}

/// Resolve and validate the path.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_yaml_selected_by_extension() {
        let v: Value = parse_contents(Path::new("quote.YML"), "spot: 100\nstrike: 95\n").unwrap();
        assert_eq!(v["spot"], 100);
        assert_eq!(v["strike"], 95);
    }

    #[test]
    fn test_json_is_the_default() {
        let v: Value = parse_contents(Path::new("quote"), r#"{"spot": 100}"#).unwrap();
        assert_eq!(v["spot"], 100);
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let err = parse_contents::<Value>(Path::new("bad.json"), "{").unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_is_csv() {
        assert!(is_csv("book.csv"));
        assert!(is_csv("BOOK.CSV"));
        assert!(!is_csv("book.json"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(read_structured::<Value>("/definitely/not/here.json").is_err());
    }
}
