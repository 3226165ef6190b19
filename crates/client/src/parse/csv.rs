//! Minimal CSV reader for hotfix tables.
//!
//! The first line is a header and is always dropped. Blank lines are skipped
//! and every cell is trimmed. There is no quoting: a cell cannot contain a comma.

/// Parse `content` into rows of trimmed cells.
pub fn parse_csv(content: &str) -> Vec<Vec<String>> {
    content
        .trim()
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').map(|cell| cell.trim().to_string()).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_blank_lines_dropped() {
        let rows = parse_csv("h1,h2,h3\na, b ,c\n\nd,e,f");
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]);
    }

    #[test]
    fn test_header_only() {
        assert!(parse_csv("feature,issue,version\n").is_empty());
        assert!(parse_csv("").is_empty());
    }

    #[test]
    fn test_variable_length_rows() {
        let rows = parse_csv("h\nfoo,123\nbar,456,2.0.0,extra\nbaz");
        assert_eq!(rows[0], vec!["foo", "123"]);
        assert_eq!(rows[1], vec!["bar", "456", "2.0.0", "extra"]);
        assert_eq!(rows[2], vec!["baz"]);
    }

    #[test]
    fn test_crlf_and_whitespace_lines() {
        let rows = parse_csv("h1,h2\r\n  \r\nfoo , 1 \r\n");
        assert_eq!(rows, vec![vec!["foo", "1"]]);
    }

    #[test]
    fn test_empty_cells_preserved() {
        let rows = parse_csv("h1,h2,h3\nfoo,,\n");
        assert_eq!(rows, vec![vec!["foo", "", ""]]);
    }

    #[test]
    fn test_quoted_commas_are_not_supported() {
        let rows = parse_csv("h\n\"a,b\",c");
        assert_eq!(rows, vec![vec!["\"a", "b\"", "c"]]);
    }
}
