//! 终端文本输出

use doc_index::{BuildResult, IndexInfo, SearchMode, SearchResult};
use serde::Serialize;

const RULE_WIDTH: usize = 60;

pub fn search_results(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No results found for query: '{}'", query);
    }

    let mut lines = vec![
        format!("Search Results for: '{}'", query),
        "=".repeat(RULE_WIDTH),
        String::new(),
    ];

    for (idx, result) in results.iter().enumerate() {
        lines.push(format!("Result {}:", idx + 1));
        lines.push(format!("File: {}", result.path));
        match result.mode {
            SearchMode::Section => {
                lines.push(format!(
                    "Section [{}]: {}",
                    result.section_idx,
                    display_title(result)
                ));
            }
            SearchMode::Snippet | SearchMode::Full => {
                if result.section_title.is_empty() {
                    lines.push(format!("Section Index: {}", result.section_idx));
                } else {
                    lines.push(format!("Section: {}", result.section_title));
                }
            }
        }
        lines.push(format!("Score: {:.3}", result.score));
        lines.push(String::new());
        match result.mode {
            SearchMode::Snippet => lines.push(format!("Snippet: {}", result.content)),
            SearchMode::Full | SearchMode::Section => {
                lines.push(result.content.trim_end().to_string())
            }
        }
        lines.push(String::new());
        lines.push("-".repeat(RULE_WIDTH));
        lines.push(String::new());
    }

    lines.join("\n")
}

fn display_title(result: &SearchResult) -> &str {
    if result.section_title.is_empty() {
        "(untitled)"
    } else {
        &result.section_title
    }
}

pub fn build_result(result: &BuildResult) -> String {
    let mut text = format!(
        "Index built: {} documents, {} sections in {} ms",
        result.document_count, result.section_count, result.elapsed_ms
    );
    if result.skipped_files > 0 {
        text.push_str(&format!(
            "\nSkipped {} unreadable files (run with -v for details)",
            result.skipped_files
        ));
    }
    text
}

/// `info` 命令的输出，附带当前磁盘上的文档数量
#[derive(Debug, Serialize)]
pub struct InfoReport {
    #[serde(flatten)]
    pub info: IndexInfo,
    pub documents_on_disk: usize,
}

pub fn info_report(report: &InfoReport) -> String {
    let info = &report.info;
    let mut lines = vec![format!("Index directory: {}", info.index_dir)];

    if !info.exists {
        lines.push("Index exists: no (run `docsearch build` first)".to_string());
    } else {
        lines.push("Index exists: yes".to_string());
        if let Some(docs_root) = &info.docs_root {
            lines.push(format!("Built from: {}", docs_root));
        }
        if let Some(built_at) = info.built_at {
            lines.push(format!("Built at: {}", built_at.format("%Y-%m-%d %H:%M:%S UTC")));
        }
        lines.push(format!("Indexed documents: {}", info.document_count));
        lines.push(format!("Indexed sections: {}", info.section_count));
        if info.skipped_files > 0 {
            lines.push(format!("Skipped files: {}", info.skipped_files));
        }
    }
    lines.push(format!("Documentation files on disk: {}", report.documents_on_disk));

    lines.join("\n")
}
