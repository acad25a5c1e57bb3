//! OCR 输出质量统计
//!
//! 核心分类与统计在 `ocr_quality` 中；本 crate 负责配置、日志、页面解析、
//! 并行运行与 CSV 导出。

pub mod app;
pub mod build_info;
pub mod export;
pub mod input;
pub mod runner;
pub mod util;

pub use ocr_quality;
