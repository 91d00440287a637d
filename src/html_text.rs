use regex::{Captures, Regex};

/// Reduces an HTML body to its visible text.
///
/// Tags are removed without inserting separators, so adjacent text nodes
/// run together just as a DOM `get_text()` would return them.
pub struct HtmlTextExtractor {
    hidden_block_regex: Regex,
    comment_regex: Regex,
    tag_regex: Regex,
    entity_regex: Regex,
}

impl Default for HtmlTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlTextExtractor {
    pub fn new() -> Self {
        Self {
            hidden_block_regex: Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>")
                .unwrap(),
            comment_regex: Regex::new(r"(?s)<!--.*?-->").unwrap(),
            tag_regex: Regex::new(r"<[^>]+>").unwrap(),
            entity_regex: Regex::new(r"&(?:#(\d+)|#[xX]([0-9A-Fa-f]+)|([a-zA-Z][a-zA-Z0-9]*));")
                .unwrap(),
        }
    }

    pub fn extract_text(&self, html: &str) -> String {
        let text = self.hidden_block_regex.replace_all(html, "");
        let text = self.comment_regex.replace_all(&text, "");
        let text = self.tag_regex.replace_all(&text, "");
        self.decode_entities(&text)
    }

    fn decode_entities(&self, text: &str) -> String {
        self.entity_regex
            .replace_all(text, |caps: &Captures| {
                let decoded = if let Some(decimal) = caps.get(1) {
                    decimal.as_str().parse::<u32>().ok().and_then(char::from_u32)
                } else if let Some(hex) = caps.get(2) {
                    u32::from_str_radix(hex.as_str(), 16)
                        .ok()
                        .and_then(char::from_u32)
                } else {
                    caps.get(3).and_then(|named| match named.as_str() {
                        "amp" => Some('&'),
                        "lt" => Some('<'),
                        "gt" => Some('>'),
                        "quot" => Some('"'),
                        "apos" => Some('\''),
                        "nbsp" => Some('\u{a0}'),
                        _ => None,
                    })
                };

                match decoded {
                    Some(ch) => ch.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags() {
        let extractor = HtmlTextExtractor::new();
        assert_eq!(
            extractor.extract_text("<p>Please <b>verify</b> your account</p>"),
            "Please verify your account"
        );
    }

    #[test]
    fn test_drops_script_style_and_comments() {
        let extractor = HtmlTextExtractor::new();
        let html = "<style>.x{color:red}</style><!-- urgent --><div>Hi</div>\
                    <SCRIPT type=\"text/javascript\">alert('urgent')</SCRIPT>";
        assert_eq!(extractor.extract_text(html), "Hi");
    }

    #[test]
    fn test_decodes_entities() {
        let extractor = HtmlTextExtractor::new();
        assert_eq!(
            extractor.extract_text("Click&#32;here &amp; &#x76;erify &bogus;"),
            "Click here & verify &bogus;"
        );
    }
}
