// Relayout Templates
// `@name@` substitution applied to rule texts and WordChars before compiling

use indexmap::IndexMap;

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte spans of `@name@` tokens, scanning left to right without overlap
fn token_spans(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'@' {
            let mut j = i + 1;
            while j < bytes.len() && is_name_byte(bytes[j]) {
                j += 1;
            }
            if j < bytes.len() && bytes[j] == b'@' && j > i + 1 {
                spans.push((i, j + 1));
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }
    spans
}

/// Named raw pattern fragments from the `[Templates]` section
#[derive(Debug, Clone, Default)]
pub struct Templates {
    entries: IndexMap<String, String>,
}

impl Templates {
    pub fn new(entries: IndexMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace every `@name@` token with its template text.
    ///
    /// Tokens are located once in the original text and replaced right to left,
    /// so substituted text is never scanned again. Unknown names are left
    /// verbatim with a warning.
    pub fn expand(&self, text: &str) -> String {
        let spans = token_spans(text);
        let mut out = text.to_string();
        for &(start, end) in spans.iter().rev() {
            let name = &text[start + 1..end - 1];
            match self.entries.get(name) {
                Some(pattern) => out.replace_range(start..end, pattern),
                None => log::warn!(
                    "Template definition not found for @{}@, using it verbatim",
                    name
                ),
            }
        }
        out
    }
}
