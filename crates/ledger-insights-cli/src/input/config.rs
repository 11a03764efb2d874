use std::path::Path;

use ledger_insights_core::AnalysisConfig;

use crate::input::ledger::read_text;

/// Load an `AnalysisConfig` from a `.toml`, `.yaml`/`.yml` or `.json` file.
/// Missing fields keep their defaults.
pub fn load_config(path: &str) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let contents = read_text(path)?;
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    parse_config(&contents, &extension)
        .map_err(|e| format!("Failed to parse config '{}': {}", path, e).into())
}

fn parse_config(
    contents: &str,
    extension: &str,
) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let config = match extension {
        "toml" => toml::from_str(contents)?,
        "yaml" | "yml" => serde_yaml::from_str(contents)?,
        "json" => serde_json::from_str(contents)?,
        other => {
            return Err(format!(
                "unsupported config format '{}' (expected toml, yaml or json)",
                other
            )
            .into())
        }
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_insights_core::config::MarkerKind;
    use rust_decimal::Decimal;
    use std::io::Write;

    #[test]
    fn test_toml_config() {
        let contents = r#"
dso_warning_threshold_days = 45
bank_fee_roots_to_reclassify = []
liquidity_sentinel_value = "500"

[[bank_fee_duplicate_markers]]
tag = "statement"
pattern = "relevé"
"#;
        let config = parse_config(contents, "toml").unwrap();
        assert_eq!(config.dso_warning_threshold_days, 45);
        assert!(!config.reclassifies_bank_fees());
        assert_eq!(config.liquidity_sentinel_value, Decimal::from(500));
        assert_eq!(config.bank_fee_duplicate_markers.len(), 1);
        assert_eq!(config.bank_fee_duplicate_markers[0].kind, MarkerKind::Substring);
    }

    #[test]
    fn test_yaml_config() {
        let contents = "fixed_cost_roots: [\"61\", \"62\"]\n\
                        autonomy_warning_threshold_pct: \"25\"\n";
        let config = parse_config(contents, "yaml").unwrap();
        assert_eq!(config.fixed_cost_roots, vec!["61", "62"]);
        assert_eq!(config.autonomy_warning_threshold_pct, Decimal::from(25));
        assert_eq!(config.dso_warning_threshold_days, 60);
    }

    #[test]
    fn test_unknown_extension() {
        assert!(parse_config("{}", "ini").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut tmp = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(tmp, r#"{{"dso_warning_threshold_days": 90}}"#).unwrap();
        let path = tmp.path().to_str().unwrap().to_string();
        let config = load_config(&path).unwrap();
        assert_eq!(config.dso_warning_threshold_days, 90);
    }
}
