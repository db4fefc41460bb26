// doc-index/src/analyzer.rs
//! 文本分析器
//!
//! 分词 → 去除超长词 → 小写 → 停用词 → 词干。
//!
//! 词由单词字符（含 `_`）组成，中间可以夹单个 `.`（`v1.2`、`os.path`），
//! 不足两个字符的词直接丢弃。
//!
//! 同一个分析器既注册到 Tantivy 索引上（建索引、解析查询都走它），
//! 也用于进程内计算查询词覆盖率。

use tantivy::Index;
use tantivy::tokenizer::{
    Language, LowerCaser, RegexTokenizer, RemoveLongFilter, SimpleTokenizer, Stemmer,
    StopWordFilter, TextAnalyzer, TokenStream, Tokenizer,
};

/// 注册到索引上的分析器名称
pub const ANALYZER_NAME: &str = "doc_stem";

/// 超过该字节数的词直接丢弃
const MAX_TOKEN_LEN: usize = 40;

/// `\w+(\.?\w+)*` 中至少两个字符的匹配
const TOKEN_PATTERN: &str = r"\w(?:\.?\w+)+";

/// 固定停用词表
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "for", "from", "have", "if", "in",
    "is", "it", "may", "not", "of", "on", "or", "tbd", "that", "the", "this", "to", "us", "we",
    "when", "will", "with", "yet", "you", "your",
];

#[derive(Clone)]
pub struct Analyzer {
    inner: TextAnalyzer,
}

impl Analyzer {
    pub fn new() -> Self {
        let inner = match RegexTokenizer::new(TOKEN_PATTERN) {
            Ok(tokenizer) => pipeline(tokenizer),
            Err(e) => {
                tracing::error!("分词正则无效，退回默认分词器: {}", e);
                pipeline(SimpleTokenizer::default())
            }
        };
        Self { inner }
    }

    /// 把分析器注册到索引，之后 schema 中的文本字段都通过它分词
    pub fn register(&self, index: &Index) {
        index.tokenizers().register(ANALYZER_NAME, self.inner.clone());
    }

    /// 把文本转换成规范化的词序列
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let mut analyzer = self.inner.clone();
        let mut stream = analyzer.token_stream(text);
        let mut terms = Vec::new();
        while stream.advance() {
            terms.push(stream.token().text.clone());
        }
        terms
    }
}

fn pipeline<T: Tokenizer>(tokenizer: T) -> TextAnalyzer {
    TextAnalyzer::builder(tokenizer)
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(
            STOP_WORDS.iter().map(|w| w.to_string()),
        ))
        .filter(Stemmer::new(Language::English))
        .build()
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer").field("name", &ANALYZER_NAME).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_stopwords() {
        let analyzer = Analyzer::new();
        assert_eq!(analyzer.analyze("The Flow and THE Task"), vec!["flow", "task"]);
    }

    #[test]
    fn test_stemming_collapses_inflections() {
        let analyzer = Analyzer::new();
        let running = analyzer.analyze("running");
        assert_eq!(running, analyzer.analyze("run"));
        assert_eq!(running, analyzer.analyze("runs"));
        assert_eq!(analyzer.analyze("retries"), analyzer.analyze("retry"));
    }

    #[test]
    fn test_splits_on_non_word_characters() {
        let analyzer = Analyzer::new();
        assert_eq!(
            analyzer.analyze("deploy(seconds), task/flows"),
            vec!["deploy", "second", "task", "flow"]
        );
    }

    #[test]
    fn test_underscores_and_dotted_names_stay_whole() {
        let analyzer = Analyzer::new();
        assert_eq!(
            analyzer.analyze("retry_delay x v1.2 a b"),
            vec!["retry_delay", "v1.2"]
        );
        assert!(!analyzer.analyze("retry_delay").contains(&"delay".to_string()));
    }

    #[test]
    fn test_drops_single_characters() {
        let analyzer = Analyzer::new();
        assert_eq!(analyzer.analyze("x y z deploy"), vec!["deploy"]);
        assert_eq!(analyzer.analyze("go"), vec!["go"]);
    }

    #[test]
    fn test_drops_overlong_tokens() {
        let analyzer = Analyzer::new();
        let long = "x".repeat(64);
        assert_eq!(analyzer.analyze(&format!("{long} deploy")), vec!["deploy"]);
    }

    #[test]
    fn test_deterministic() {
        let analyzer = Analyzer::new();
        let text = "Configuring deployments with retries";
        assert_eq!(analyzer.analyze(text), analyzer.analyze(text));
        assert_eq!(analyzer.analyze(text), Analyzer::new().analyze(text));
    }
}
