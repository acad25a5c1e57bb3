use std::collections::HashMap;

use crate::error::{QualityError, Result};

/// 替换规则集：`target -> source`
///
/// 只用于统计页面上可适用的规则数量，不会改写 token。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementRules {
    rules: HashMap<String, String>,
}

impl ReplacementRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析 `source=target;source=target` 形式的规则文本
    pub fn parse(text: &str) -> Result<Self> {
        let mut rules = Self::new();
        rules.extend_from_str(text)?;
        Ok(rules)
    }

    /// 追加解析一段规则文本，后出现的同名 target 覆盖先前的
    pub fn extend_from_str(&mut self, text: &str) -> Result<()> {
        for rule in text.split(';') {
            let rule = rule.trim();
            if rule.is_empty() {
                continue;
            }

            let mut parts = rule.split('=');
            let (source, target) = match (parts.next(), parts.next(), parts.next()) {
                (Some(source), Some(target), None) => (source.trim(), target.trim()),
                _ => {
                    return Err(QualityError::InvalidReplacementRule {
                        rule: rule.to_string(),
                    })
                }
            };

            self.rules.insert(target.to_string(), source.to_string());
        }
        Ok(())
    }

    pub fn merge(&mut self, other: ReplacementRules) {
        self.rules.extend(other.rules);
    }

    pub fn contains_target(&self, text: &str) -> bool {
        self.rules.contains_key(text)
    }

    pub fn source_for(&self, target: &str) -> Option<&str> {
        self.rules.get(target).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
