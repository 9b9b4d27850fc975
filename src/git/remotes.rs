//! Remote-listing parse.

use std::collections::HashMap;

/// Parse `git remote -v` output into a name → url mapping.
///
/// Only the first two whitespace-delimited tokens of each line are kept;
/// the trailing `(fetch)`/`(push)` tag is discarded, so the last
/// occurrence of a name wins. Lines with fewer than two tokens are
/// skipped.
pub fn parse_remotes(raw: &str) -> HashMap<String, String> {
    let mut remotes = HashMap::new();
    for line in raw.lines() {
        let mut tokens = line.split_whitespace();
        let (Some(name), Some(url)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        remotes.insert(name.to_string(), url.to_string());
    }
    remotes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fetch_and_push_lines() {
        let raw = "origin\thttps://example.com/a.git (fetch)\n\
                   origin\thttps://example.com/a.git (push)\n\
                   mirror\tgit@example.com:b.git (fetch)\n";
        let remotes = parse_remotes(raw);
        assert_eq!(remotes.len(), 2);
        assert_eq!(remotes["origin"], "https://example.com/a.git");
        assert_eq!(remotes["mirror"], "git@example.com:b.git");
    }

    #[test]
    fn last_occurrence_wins() {
        let raw = "origin old-url (fetch)\norigin new-url (push)\n";
        assert_eq!(parse_remotes(raw)["origin"], "new-url");
    }

    #[test]
    fn short_and_empty_lines_are_skipped() {
        let raw = "\nlonely\n  \norigin url\n";
        let remotes = parse_remotes(raw);
        assert_eq!(remotes.len(), 1);
        assert_eq!(remotes["origin"], "url");
    }
}
