use thiserror::Error;

/// 质量统计核心错误
#[derive(Debug, Error)]
pub enum QualityError {
    /// 替换规则格式错误（非恰好一个 `=`），属于启动期致命配置错误
    #[error("Invalid replacement rule: {rule}")]
    InvalidReplacementRule { rule: String },

    /// 单页解析失败，调用方记录日志后跳过该页
    #[error("Error processing page {page}: {reason}")]
    PageParse { page: String, reason: String },

    #[error("Cannot determine page number for {path}")]
    MissingPageNumber { path: String },
}

impl QualityError {
    pub fn page_parse(page: impl Into<String>, reason: impl ToString) -> Self {
        QualityError::PageParse {
            page: page.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QualityError>;
