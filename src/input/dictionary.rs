use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ocr_quality::{Dictionary, WordListDictionary};

use crate::util::logging::events;

/// 词典名：文件名去掉最后一个 `.` 之后的部分
pub fn dictionary_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.rfind('.') {
        Some(index) => name[..index].to_string(),
        None => name,
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("打开词典文件失败: {}", path.display()))?;
    BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("读取词典文件失败: {}", path.display()))
}

pub fn load_dictionary(path: &Path) -> Result<WordListDictionary> {
    let name = dictionary_name(path);
    let lines = read_lines(path)?;
    let dictionary = WordListDictionary::from_lines(name.as_str(), &lines);

    tracing::info!(
        event = events::DICTIONARY_LOADED,
        dictionary = %name,
        path = %path.display(),
        words = dictionary.len(),
        mean_length = dictionary.length_summary().mean()
    );

    Ok(dictionary)
}

/// 按给定顺序加载全部词典；顺序即导出列顺序
pub fn load_dictionaries(paths: &[impl AsRef<Path>]) -> Result<Vec<WordListDictionary>> {
    paths.iter().map(|path| load_dictionary(path.as_ref())).collect()
}

pub fn into_shared(dictionaries: Vec<WordListDictionary>) -> Vec<Arc<dyn Dictionary>> {
    dictionaries
        .into_iter()
        .map(|dictionary| Arc::new(dictionary) as Arc<dyn Dictionary>)
        .collect()
}

/// 词长分布：长度 -> 条目数（含空行，长度按字符计）
pub fn word_length_distribution(path: &Path) -> Result<BTreeMap<usize, u64>> {
    let mut distribution = BTreeMap::new();
    for line in read_lines(path)? {
        *distribution.entry(line.chars().count()).or_insert(0) += 1;
    }
    Ok(distribution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dictionary_name_strips_last_extension() {
        assert_eq!(dictionary_name(Path::new("/dicts/english.words.txt")), "english.words");
        assert_eq!(dictionary_name(Path::new("latin.dic")), "latin");
        assert_eq!(dictionary_name(Path::new("plain")), "plain");
    }

    #[test]
    fn test_load_dictionary_counts_every_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("english.txt");
        std::fs::write(&path, "cat\r\nhorse\n\nDog\n").unwrap();

        let dict = load_dictionary(&path).unwrap();
        assert_eq!(dict.name(), "english");
        assert_eq!(dict.len(), 3);
        assert!(dict.is_correct("dog"));
        // 空行也计入词长统计
        assert_eq!(dict.length_summary().count(), 4);
        assert_eq!(dict.length_summary().max(), 5.0);
    }

    #[test]
    fn test_missing_dictionary_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = load_dictionary(&dir.path().join("nope.txt")).unwrap_err();
        assert!(err.to_string().contains("nope.txt"));
    }

    #[test]
    fn test_word_length_distribution() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("d.txt");
        std::fs::write(&path, "a\nab\ncd\nStraße\n").unwrap();

        let distribution = word_length_distribution(&path).unwrap();
        assert_eq!(distribution.get(&1), Some(&1));
        assert_eq!(distribution.get(&2), Some(&2));
        assert_eq!(distribution.get(&6), Some(&1));
        assert_eq!(distribution.get(&3), None);
    }

    #[test]
    fn test_shared_dictionaries_keep_order() {
        let shared = into_shared(vec![
            WordListDictionary::from_lines("b", ["x"]),
            WordListDictionary::from_lines("a", ["y"]),
        ]);
        let names: Vec<&str> = shared.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
