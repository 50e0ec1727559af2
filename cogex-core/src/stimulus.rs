/// Id of the mounted `<video>` element.
pub const VIDEO_ELEMENT_ID: &str = "cogex-video-player";

/// Video stimulus and the options that shape its markup.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoStimulus<'a> {
    pub sources: &'a [String],
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub autoplay: bool,
    pub controls: bool,
    pub prompt: Option<&'a str>,
    /// False when a preloaded buffer is assigned to the element after mounting.
    pub source_tags: bool,
}

impl VideoStimulus<'_> {
    pub fn render(&self) -> String {
        let mut html = format!("<video id=\"{VIDEO_ELEMENT_ID}\"");

        // zero is treated as unset, the element keeps its natural size
        if let Some(width) = self.width.filter(|w| *w > 0) {
            html.push_str(&format!(" width=\"{width}\""));
        }
        if let Some(height) = self.height.filter(|h| *h > 0) {
            html.push_str(&format!(" height=\"{height}\""));
        }
        if self.autoplay {
            html.push_str(" autoplay");
        }
        if self.controls {
            html.push_str(" controls");
        }
        html.push('>');

        if self.source_tags {
            for source in self.sources {
                let path = strip_query(source);
                html.push_str(&format!(
                    "<source src=\"{}\" type=\"video/{}\">",
                    escape_attr(path),
                    escape_attr(&media_type_of(path))
                ));
            }
        }
        html.push_str("</video>");

        if let Some(prompt) = self.prompt {
            html.push_str(prompt);
        }
        html
    }
}

/// Container type of a media reference: the text after the last `.` of its
/// path, lowercased, with any `?query` removed first.
///
/// A reference without a `.` yields the whole path.
pub fn media_type_of(reference: &str) -> String {
    let path = strip_query(reference);
    let ext = path.rsplit_once('.').map_or(path, |(_, ext)| ext);
    ext.to_lowercase()
}

/// The path part of a media reference, without its `?query`.
pub fn strip_query(reference: &str) -> &str {
    reference
        .split_once('?')
        .map_or(reference, |(path, _query)| path)
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
