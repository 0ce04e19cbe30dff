/// Declarations and prepositions that usually precede a location, most
/// specific first
pub const LOCATION_KEYWORDS: &[&str] = &[
    "address is",
    "location is",
    "i'm at",
    "i am at",
    "we're at",
    "we are at",
    "near ",
    "at ",
    "on ",
    "in ",
];

/// Minimum length a candidate must exceed to be accepted
const MIN_CANDIDATE_CHARS: usize = 5;

/// Find a location-like phrase in the transcript using [`LOCATION_KEYWORDS`]
pub fn extract_location_candidate(transcript: &str) -> Option<String> {
    extract_location_with(transcript, LOCATION_KEYWORDS)
}

/// Scan caller lines for the first keyword hit and take the text after it up
/// to the next sentence delimiter. Dispatcher lines and bracketed annotations
/// are skipped since they ask for locations rather than give them.
pub fn extract_location_with(transcript: &str, keywords: &[&str]) -> Option<String> {
    for line in transcript.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('[') || is_dispatcher_line(line) {
            continue;
        }
        let line = strip_speaker(line);
        let lower = line.to_ascii_lowercase();

        for keyword in keywords {
            let Some(pos) = find_at_word_start(&lower, keyword) else {
                continue;
            };
            let after = &line[pos + keyword.len()..];
            let candidate = after
                .split(['.', ',', '!', '?', ';'])
                .next()
                .unwrap_or_default()
                .trim();

            if candidate.chars().count() > MIN_CANDIDATE_CHARS {
                return Some(candidate.to_string());
            }
        }
    }

    None
}

fn is_dispatcher_line(line: &str) -> bool {
    line.to_ascii_lowercase().starts_with("dispatcher:")
}

fn strip_speaker(line: &str) -> &str {
    match line.split_once(':') {
        Some((speaker, rest)) if speaker.eq_ignore_ascii_case("caller") => rest.trim_start(),
        _ => line,
    }
}

/// Byte offset of the first occurrence of `keyword` that begins a word
fn find_at_word_start(haystack: &str, keyword: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(found) = haystack[from..].find(keyword) {
        let pos = from + found;
        let at_boundary = haystack[..pos]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric() && c != '\'');
        if at_boundary {
            return Some(pos);
        }
        from = pos + keyword.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_after_declaration() {
        let transcript = "Caller: Hello, my address is 42 Baker Street, London. Please hurry!";
        assert_eq!(
            extract_location_candidate(transcript).as_deref(),
            Some("42 Baker Street")
        );
    }

    #[test]
    fn test_extracts_after_preposition_and_keeps_case() {
        let transcript = "Caller: I'm at West High School. There's a guy with a gun.";
        assert_eq!(
            extract_location_candidate(transcript).as_deref(),
            Some("West High School")
        );
    }

    #[test]
    fn test_ignores_dispatcher_lines() {
        let transcript = "Dispatcher: Are you at home or near a landmark?\n\nCaller: I don't know";
        assert_eq!(extract_location_candidate(transcript), None);
    }

    #[test]
    fn test_rejects_short_candidates() {
        assert_eq!(extract_location_candidate("Caller: I'm at home."), None);
    }

    #[test]
    fn test_keyword_must_start_a_word() {
        // "that " contains "at " but not at a word start
        let transcript = "Caller: I heard that noise again";
        assert_eq!(extract_location_candidate(transcript), None);
    }

    #[test]
    fn test_untagged_lines_are_scanned() {
        let transcript = "there's smoke coming from the flat near Victoria Park gates";
        assert_eq!(
            extract_location_candidate(transcript).as_deref(),
            Some("Victoria Park gates")
        );
    }
}
