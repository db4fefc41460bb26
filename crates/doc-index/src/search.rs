// doc-index/src/search.rs
//! 搜索模块
//!
//! 排序分数 = 覆盖的查询词数 + bm25 / (bm25 + 1)。
//! 后一项落在 [0, 1) 内，所以命中更多查询词的章节总是排在前面，
//! 覆盖数相同再比较 BM25，分数相同按 (path, section_idx) 升序。
//!
//! 查询按宽松模式解析：未知的 `field:` 前缀当作普通文本，
//! 括号不配对等无法解析的部分被忽略，不会让整个查询失败。

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tantivy::collector::{DocSetCollector, TopDocs};
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::IndexRecordOption;
use tantivy::snippet::{Snippet, SnippetGenerator};
use tantivy::{DocAddress, Searcher, TantivyDocument, Term};

use crate::config::{DisplayConfig, MAX_LIMIT};
use crate::error::{DocIndexError, Result};
use crate::extract::format_content_preview;
use crate::models::{SearchMode, SearchResult};
use crate::schema::{FIELD_CONTENT, FIELD_SECTION_TITLE, IndexEntry, SchemaFields};
use crate::store::IndexStore;

/// 章节标题命中的权重
const SECTION_TITLE_BOOST: f32 = 2.0;

/// 查询中可以用 `field:` 指定的字段
const QUERY_FIELDS: &[&str] = &[FIELD_SECTION_TITLE, FIELD_CONTENT];

/// `field:` 前缀，或者孤立的 `:`
static FIELD_PREFIX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\w*):").ok());

/// 未知字段前缀按普通文本处理：`ValueError: refused` → `ValueError  refused`
fn plain_unknown_fields(query: &str) -> Cow<'_, str> {
    match FIELD_PREFIX.as_ref() {
        Some(re) => re.replace_all(query, |caps: &Captures| {
            let name = &caps[1];
            if QUERY_FIELDS.contains(&name) {
                caps[0].to_string()
            } else {
                format!("{} ", name)
            }
        }),
        None => Cow::Borrowed(query),
    }
}

/// 去掉字段前缀，计算覆盖率只看查询词
fn strip_field_prefixes(query: &str) -> Cow<'_, str> {
    match FIELD_PREFIX.as_ref() {
        Some(re) => re.replace_all(query, " "),
        None => Cow::Borrowed(query),
    }
}

#[derive(Debug, Clone, Copy)]
struct Hit {
    address: DocAddress,
    score: f32,
}

pub struct QueryEngine {
    store: Arc<IndexStore>,
    display: DisplayConfig,
}

impl QueryEngine {
    pub fn new(store: Arc<IndexStore>, display: DisplayConfig) -> Self {
        Self { store, display }
    }

    /// 执行查询；`limit` 为空时使用配置的默认值
    pub fn search(
        &self,
        query: &str,
        mode: SearchMode,
        limit: Option<usize>,
    ) -> Result<Vec<SearchResult>> {
        let limit = limit.unwrap_or(self.display.default_limit);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(DocIndexError::Query(format!(
                "limit 必须在 1..={} 之间，实际为 {}",
                MAX_LIMIT, limit
            )));
        }

        let published = self.store.current()?;
        tracing::debug!("[搜索] 查询: '{}' (mode={}, limit={})", query, mode, limit);

        let query = plain_unknown_fields(query);
        let terms: BTreeSet<String> = self
            .store
            .analyzer()
            .analyze(&strip_field_prefixes(&query))
            .into_iter()
            .collect();
        if terms.is_empty() {
            tracing::debug!("[搜索] 查询分析后为空");
            return Ok(vec![]);
        }

        let fields = published.fields;
        let mut parser = QueryParser::for_index(
            &published.index,
            vec![fields.section_title, fields.content],
        );
        parser.set_field_boost(fields.section_title, SECTION_TITLE_BOOST);
        let (parsed, errors) = parser.parse_query_lenient(&query);
        if !errors.is_empty() {
            tracing::debug!("[搜索] 忽略无法解析的查询片段: '{}' - {:?}", query, errors);
        }

        let searcher = published.reader.searcher();
        let hits = rank(&searcher, &*parsed, &fields, &terms, limit)?;
        tracing::debug!("[搜索] 返回 {} 条结果", hits.len());

        let snippets = match mode {
            SearchMode::Snippet => {
                let mut generator = SnippetGenerator::create(&searcher, &*parsed, fields.content)?;
                generator.set_max_num_chars(self.display.preview_max_length);
                Some(generator)
            }
            SearchMode::Full | SearchMode::Section => None,
        };

        hits.into_iter()
            .map(|(hit, doc)| {
                let entry = IndexEntry::from_document(&doc, &fields);
                let content = match &snippets {
                    Some(generator) => {
                        let snippet = generator.snippet_from_doc(&doc);
                        self.snippet_text(&snippet, &entry.content)
                    }
                    None => entry.content,
                };
                Ok(SearchResult {
                    path: entry.path,
                    title: entry.title,
                    section_title: entry.section_title,
                    section_idx: entry.section_idx,
                    level: entry.level,
                    score: hit.score,
                    mode,
                    content,
                })
            })
            .collect()
    }

    /// 没有内容片段命中（例如只命中标题）时退回到章节开头的预览
    fn snippet_text(&self, snippet: &Snippet, content: &str) -> String {
        if snippet.fragment().trim().is_empty() {
            return format_content_preview(content, &self.display);
        }
        if self.display.highlight {
            highlight(snippet)
        } else {
            snippet.fragment().trim().to_string()
        }
    }
}

/// 计算每个命中的最终分数并排序，只取回前 `limit` 个文档
fn rank(
    searcher: &Searcher,
    query: &dyn Query,
    fields: &SchemaFields,
    terms: &BTreeSet<String>,
    limit: usize,
) -> Result<Vec<(Hit, TantivyDocument)>> {
    let total = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX).max(1);
    let scored = searcher.search(query, &TopDocs::with_limit(total))?;
    if scored.is_empty() {
        return Ok(vec![]);
    }

    let coverage = term_coverage(searcher, fields, terms)?;
    let mut hits: Vec<Hit> = scored
        .into_iter()
        .map(|(bm25, address)| {
            let bm25 = bm25.max(0.0);
            let covered = coverage.get(&address).copied().unwrap_or(0) as f32;
            Hit {
                address,
                score: covered + bm25 / (bm25 + 1.0),
            }
        })
        .collect();
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    // 分数与第 limit 名相同的命中都要参与按路径排序
    let cutoff = hits[limit.min(hits.len()) - 1].score;
    hits.retain(|hit| hit.score >= cutoff);

    let mut loaded = hits
        .into_iter()
        .map(|hit| -> Result<(Hit, (String, usize), TantivyDocument)> {
            let doc: TantivyDocument = searcher.doc(hit.address)?;
            let entry = IndexEntry::from_document(&doc, fields);
            Ok((hit, (entry.path, entry.section_idx), doc))
        })
        .collect::<Result<Vec<_>>>()?;

    loaded.sort_by(|(a, a_key, _), (b, b_key, _)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a_key.cmp(b_key))
    });
    loaded.truncate(limit);
    Ok(loaded.into_iter().map(|(hit, _, doc)| (hit, doc)).collect())
}

/// 每个章节包含了多少个不同的查询词（标题或正文）
fn term_coverage(
    searcher: &Searcher,
    fields: &SchemaFields,
    terms: &BTreeSet<String>,
) -> Result<HashMap<DocAddress, usize>> {
    let mut coverage = HashMap::new();
    for term in terms {
        let clauses: Vec<(Occur, Box<dyn Query>)> = [fields.section_title, fields.content]
            .into_iter()
            .map(|field| {
                let query = TermQuery::new(
                    Term::from_field_text(field, term),
                    IndexRecordOption::Basic,
                );
                (Occur::Should, Box::new(query) as Box<dyn Query>)
            })
            .collect();
        let matched = searcher.search(&BooleanQuery::new(clauses), &DocSetCollector)?;
        for address in matched {
            *coverage.entry(address).or_insert(0) += 1;
        }
    }
    Ok(coverage)
}

/// 用 `**` 包裹命中词
fn highlight(snippet: &Snippet) -> String {
    let fragment = snippet.fragment();
    let mut out = String::with_capacity(fragment.len() + 16);
    let mut cursor = 0;
    for range in snippet.highlighted() {
        let (Some(before), Some(word)) = (
            fragment.get(cursor..range.start),
            fragment.get(range.clone()),
        ) else {
            continue;
        };
        out.push_str(before);
        out.push_str("**");
        out.push_str(word);
        out.push_str("**");
        cursor = range.end;
    }
    out.push_str(fragment.get(cursor..).unwrap_or(""));
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::analyzer::Analyzer;
    use crate::config::EngineConfig;
    use crate::indexer::IndexBuilder;

    struct Fixture {
        _dir: TempDir,
        store: Arc<IndexStore>,
        config: EngineConfig,
    }

    impl Fixture {
        fn engine(&self) -> QueryEngine {
            QueryEngine::new(Arc::clone(&self.store), self.config.display.clone())
        }

        fn highlighting_engine(&self) -> QueryEngine {
            let display = DisplayConfig {
                highlight: true,
                ..self.config.display.clone()
            };
            QueryEngine::new(Arc::clone(&self.store), display)
        }
    }

    fn fixture(files: &[(&str, &str)]) -> Fixture {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        for (rel, content) in files {
            let path = docs.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        fs::create_dir_all(&docs).unwrap();

        let config = EngineConfig::new(&docs, dir.path().join("index"));
        let store = Arc::new(IndexStore::open(&config.index_dir, Analyzer::new()));
        IndexBuilder::new(Arc::clone(&store), config.clone())
            .build(false)
            .unwrap();
        Fixture {
            _dir: dir,
            store,
            config,
        }
    }

    const GUIDE: &str = "# Intro\nWelcome to the project.\n\n# Setup\nRun the installer, then configure retries.\n";

    #[test]
    fn test_term_matches_only_its_section() {
        let f = fixture(&[("guide.md", GUIDE)]);
        let results = f.engine().search("installer", SearchMode::Full, None).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].section_title, "Setup");
        assert_eq!(results[0].title, "Intro");
        assert_eq!(results[0].section_idx, 1);
        assert_eq!(
            results[0].content,
            "# Setup\nRun the installer, then configure retries.\n"
        );
    }

    #[rstest]
    #[case("running")]
    #[case("runs")]
    #[case("run")]
    fn test_stemmed_forms_match(#[case] query: &str) {
        let f = fixture(&[("guide.md", GUIDE)]);
        let results = f.engine().search(query, SearchMode::Snippet, None).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].section_title, "Setup");
    }

    #[test]
    fn test_no_match_and_stopword_query_are_empty() {
        let f = fixture(&[("guide.md", GUIDE)]);
        let engine = f.engine();
        assert!(engine.search("kubernetes", SearchMode::Snippet, None).unwrap().is_empty());
        assert!(engine.search("the and of", SearchMode::Snippet, None).unwrap().is_empty());
    }

    #[test]
    fn test_missing_index() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(IndexStore::open(dir.path().join("index"), Analyzer::new()));
        let engine = QueryEngine::new(store, DisplayConfig::default());
        let err = engine.search("anything", SearchMode::Snippet, None).unwrap_err();
        assert!(matches!(err, DocIndexError::IndexMissing(_)));
    }

    #[rstest]
    #[case(Some(0))]
    #[case(Some(MAX_LIMIT + 1))]
    fn test_limit_out_of_range(#[case] limit: Option<usize>) {
        let f = fixture(&[("guide.md", GUIDE)]);
        let err = f.engine().search("setup", SearchMode::Snippet, limit).unwrap_err();
        assert!(matches!(err, DocIndexError::Query(_)));
    }

    #[rstest]
    #[case("ValueError: installer failed")]
    #[case("nosuchfield:installer")]
    #[case("how to (configure the installer")]
    #[case("installer::run")]
    fn test_stray_syntax_is_plain_text(#[case] query: &str) {
        let f = fixture(&[("guide.md", GUIDE)]);
        let results = f.engine().search(query, SearchMode::Snippet, None).unwrap();
        assert_eq!(results[0].section_title, "Setup");
    }

    #[test]
    fn test_unparseable_query_is_not_an_error() {
        let f = fixture(&[("guide.md", GUIDE)]);
        assert!(f.engine().search("std::vec", SearchMode::Snippet, None).unwrap().is_empty());
        assert!(f.engine().search("((", SearchMode::Snippet, None).unwrap().is_empty());
    }

    #[test]
    fn test_underscore_name_does_not_match_its_parts() {
        let f = fixture(&[
            ("a.md", "# Options
Set retry_delay in the config.
"),
            ("b.md", "# Delay
The delay before a retry.
"),
        ]);
        let results = f.engine().search("delay", SearchMode::Full, None).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, "b.md");

        let results = f.engine().search("retry_delay", SearchMode::Full, None).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, "a.md");
    }

    #[test]
    fn test_full_match_ranks_above_partial() {
        let mut filler = String::from("# Noisy\n");
        for _ in 0..20 {
            filler.push_str("retry retry retry retry.\n");
        }
        let f = fixture(&[
            ("a.md", &filler),
            ("b.md", "# Quiet\nConfigure the retry delay once.\n"),
        ]);
        let results = f.engine().search("retry delay", SearchMode::Full, None).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].path, "b.md");
        assert!(results[0].score >= 2.0);
        assert!(results[1].score < 2.0);
    }

    #[test]
    fn test_ties_ordered_by_path_and_index() {
        let body = "# Same\nidentical body text\n";
        let f = fixture(&[("c.md", body), ("a.md", body), ("b.md", body)]);
        let results = f.engine().search("identical", SearchMode::Full, Some(2)).unwrap();
        let paths: Vec<&str> = results.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_limit_truncates() {
        let files: Vec<(String, String)> = (0..5)
            .map(|i| (format!("doc{}.md", i), "# Topic\nshared keyword\n".to_string()))
            .collect();
        let refs: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
        let f = fixture(&refs);
        assert_eq!(f.engine().search("keyword", SearchMode::Full, Some(3)).unwrap().len(), 3);
        assert_eq!(f.engine().search("keyword", SearchMode::Full, None).unwrap().len(), 5);
    }

    #[test]
    fn test_snippet_is_bounded_and_highlighted() {
        let mut body = String::from("# Long\n");
        for i in 0..50 {
            body.push_str(&format!("Sentence number {} talks about nothing special. ", i));
        }
        body.push_str("Here the scheduler finally appears.\n");
        let f = fixture(&[("long.md", &body)]);

        let plain = f.engine().search("scheduler", SearchMode::Snippet, None).unwrap();
        assert!(plain[0].content.chars().count() <= 200);
        assert!(plain[0].content.contains("scheduler"));
        assert!(!plain[0].content.contains("**"));

        let marked = f.highlighting_engine().search("scheduler", SearchMode::Snippet, None).unwrap();
        assert!(marked[0].content.contains("**scheduler**"));
    }

    #[test]
    fn test_title_only_hit_falls_back_to_preview() {
        let f = fixture(&[("guide.md", "# Deployment\nShip the build to production.\n")]);
        let results = f
            .engine()
            .search("section_title:deployment", SearchMode::Snippet, None)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].content.starts_with("# Deployment"));
    }

    #[test]
    fn test_section_mode_returns_section_text() {
        let f = fixture(&[("guide.md", GUIDE)]);
        let results = f.engine().search("welcome", SearchMode::Section, None).unwrap();
        assert_eq!(results[0].mode, SearchMode::Section);
        assert_eq!(results[0].content, "# Intro\nWelcome to the project.\n\n");
    }

    #[test]
    fn test_strip_field_prefixes() {
        assert_eq!(strip_field_prefixes("content:retry delay"), " retry delay");
        assert_eq!(strip_field_prefixes("plain words"), "plain words");
    }

    #[rstest]
    #[case("content:retry", "content:retry")]
    #[case("section_title:setup", "section_title:setup")]
    #[case("ValueError: refused", "ValueError  refused")]
    #[case("std::vec", "std  vec")]
    #[case("title:intro", "title intro")]
    fn test_plain_unknown_fields(#[case] query: &str, #[case] expected: &str) {
        assert_eq!(plain_unknown_fields(query), expected);
    }
}
