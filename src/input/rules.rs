use std::path::Path;

use anyhow::{Context, Result};
use ocr_quality::ReplacementRules;

use crate::util::logging::events;

/// 依次读取规则文件并合并；任何格式错误都是致命错误
pub fn load_replacement_rules(paths: &[impl AsRef<Path>]) -> Result<ReplacementRules> {
    let mut rules = ReplacementRules::new();

    for path in paths {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("读取替换规则文件失败: {}", path.display()))?;
        let before = rules.len();
        rules
            .extend_from_str(&text)
            .with_context(|| format!("替换规则文件格式错误: {}", path.display()))?;

        tracing::info!(
            event = events::RULES_LOADED,
            path = %path.display(),
            rules = rules.len() - before
        );
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rules_from_multiple_files_are_merged() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.txt");
        let second = dir.path().join("b.txt");
        std::fs::write(&first, "rn=m;\ncl = d").unwrap();
        std::fs::write(&second, "vv=w;").unwrap();

        let rules = load_replacement_rules(&[first, second]).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.source_for("m"), Some("rn"));
        assert_eq!(rules.source_for("w"), Some("vv"));
    }

    #[test]
    fn test_malformed_rule_names_file_and_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, "rn=m;a=b=c").unwrap();

        let err = load_replacement_rules(&[&path]).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("bad.txt"));
        assert!(message.contains("a=b=c"));
    }

    #[test]
    fn test_no_rule_files() {
        let none: [&Path; 0] = [];
        let rules = load_replacement_rules(&none).unwrap();
        assert!(rules.is_empty());
    }
}
