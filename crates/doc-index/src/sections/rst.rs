// doc-index/src/sections/rst.rs
//! reStructuredText 标题识别
//!
//! 标题行下方是一行重复的标点（下划线），长度不短于标题；
//! 可选的同字符上划线属于标题的一部分。层级按样式首次出现的顺序确定。

use super::{Heading, lines_with_offsets};

/// 识别装饰行：单一标点字符重复至少两次，返回 (字符, 长度)
fn adornment(line: &str) -> Option<(char, usize)> {
    let line = line.trim_end();
    let first = line.chars().next()?;
    if !first.is_ascii_punctuation() {
        return None;
    }
    let len = line.chars().count();
    if len < 2 || !line.chars().all(|c| c == first) {
        return None;
    }
    Some((first, len))
}

fn title_width(line: &str) -> usize {
    line.trim().chars().count()
}

pub(crate) fn headings(text: &str) -> Vec<Heading> {
    let lines = lines_with_offsets(text);
    let mut styles: Vec<(char, bool)> = Vec::new();
    let mut headings = Vec::new();

    let mut level_of = |style: (char, bool)| -> u8 {
        let pos = match styles.iter().position(|s| *s == style) {
            Some(pos) => pos,
            None => {
                styles.push(style);
                styles.len() - 1
            }
        };
        u8::try_from(pos + 1).unwrap_or(u8::MAX)
    };

    let mut i = 0;
    while i < lines.len() {
        let (offset, line) = lines[i];

        // 上划线 + 标题 + 下划线
        if let (Some((over, over_len)), Some(&(_, title)), Some(&(_, under))) =
            (adornment(line), lines.get(i + 1), lines.get(i + 2))
        {
            if let Some((under_char, under_len)) = adornment(under) {
                let width = title_width(title);
                if under_char == over
                    && width > 0
                    && adornment(title).is_none()
                    && over_len >= width
                    && under_len >= width
                {
                    headings.push(Heading {
                        offset,
                        title: title.trim().to_string(),
                        level: level_of((over, true)),
                    });
                    i += 3;
                    continue;
                }
            }
        }

        // 标题 + 下划线
        if let Some(&(_, under)) = lines.get(i + 1) {
            let starts_indented = line.starts_with(|c: char| c.is_whitespace());
            if !line.trim().is_empty() && !starts_indented && adornment(line).is_none() {
                if let Some((under_char, under_len)) = adornment(under) {
                    if under_len >= title_width(line) {
                        headings.push(Heading {
                            offset,
                            title: line.trim().to_string(),
                            level: level_of((under_char, false)),
                        });
                        i += 2;
                        continue;
                    }
                }
            }
        }

        i += 1;
    }

    headings
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn titles_and_levels(text: &str) -> Vec<(String, u8)> {
        headings(text).into_iter().map(|h| (h.title, h.level)).collect()
    }

    #[rstest]
    #[case("=====", Some(('=', 5)))]
    #[case("--  ", Some(('-', 2)))]
    #[case("~", None)]
    #[case("=-=-", None)]
    #[case("===  ===", None)]
    #[case("abc", None)]
    #[case("", None)]
    fn test_adornment(#[case] line: &str, #[case] expected: Option<(char, usize)>) {
        assert_eq!(adornment(line), expected);
    }

    #[test]
    fn test_underline_titles_and_levels() {
        let text = "Guide\n=====\n\ntext\n\nInstall\n-------\n\nmore\n\nUsage\n=====\n";
        assert_eq!(
            titles_and_levels(text),
            vec![
                ("Guide".to_string(), 1),
                ("Install".to_string(), 2),
                ("Usage".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_short_underline_is_not_title() {
        let text = "A long title\n===\n";
        assert!(headings(text).is_empty());
    }

    #[test]
    fn test_overline_style_is_distinct_level() {
        let text = "=========\n Project\n=========\n\nIntro\n=====\n";
        let found = headings(text);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].offset, 0);
        assert_eq!(found[0].title, "Project");
        assert_eq!(found[0].level, 1);
        assert_eq!(found[1].title, "Intro");
        assert_eq!(found[1].level, 2);
    }

    #[test]
    fn test_transition_is_not_title() {
        let text = "para one\n\n----------\n\npara two\n";
        assert!(headings(text).is_empty());
    }

    #[test]
    fn test_indented_line_is_not_title() {
        let text = "Example::\n\n    code line\n    ---------\n";
        assert!(headings(text).is_empty());
    }
}
