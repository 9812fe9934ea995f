use regex::Regex;
use std::sync::OnceLock;

fn camel_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Split before CamelCase humps and between an acronym and the next word:
    // HTTPServer -> HTTP Server, myXMLParser -> my XML Parser
    RE.get_or_init(|| {
        Regex::new(r"([A-Z]+)([A-Z][a-z])|([a-z0-9])([A-Z])").expect("static regex")
    })
}

fn delims_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[_-]+").expect("static regex"))
}

fn is_acronym(word: &str) -> bool {
    word.chars().count() > 1 && word == word.to_uppercase()
}

/// Turns an identifier into a display label: words are split on case changes
/// and `-`/`_`, acronyms are kept upper-case, everything else lower-cased, and
/// only the first word is capitalised (unless it is an acronym).
pub fn labelize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let split = camel_re().replace_all(input, "${1}${3} ${2}${4}");
    let spaced = delims_re().replace_all(&split, " ");
    let mut words: Vec<String> = spaced
        .split_whitespace()
        .map(|w| {
            if is_acronym(w) {
                w.to_uppercase()
            } else {
                w.to_lowercase()
            }
        })
        .collect();
    let Some(first) = words.first_mut() else {
        return String::new();
    };
    if !is_acronym(first) {
        let mut chars = first.chars();
        if let Some(c) = chars.next() {
            *first = c.to_uppercase().chain(chars).collect();
        }
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::labelize;

    #[test]
    fn splits_camel_case_and_keeps_acronyms() {
        assert_eq!(labelize("HTTPRequestStatus"), "HTTP request status");
        assert_eq!(labelize("APIClient"), "API client");
        assert_eq!(labelize("getHTTPServer"), "Get HTTP server");
        assert_eq!(labelize("ParseJSONFile"), "Parse JSON file");
    }

    #[test]
    fn replaces_delimiters() {
        assert_eq!(labelize("hello_world"), "Hello world");
        assert_eq!(labelize("my-XML-parser"), "My XML parser");
        assert_eq!(labelize("__a--b__"), "A b");
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(labelize(""), "");
        assert_eq!(labelize("___"), "");
        assert_eq!(labelize("db"), "Db");
    }
}
