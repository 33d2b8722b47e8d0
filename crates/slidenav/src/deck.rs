use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

static IMAGE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)\s]+)\)").expect("valid image regex"));

/// The host document: slide set plus front-matter metadata.
#[derive(Debug, Clone)]
pub struct Deck {
    pub meta: DeckMeta,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub footer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Slide {
    pub heading: Option<String>,
    /// Everything after the heading, image references removed.
    pub body: String,
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub alt: String,
    pub path: String,
}

impl Deck {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let deck = Self::parse(&content)?;
        if deck.slides.is_empty() {
            anyhow::bail!("No slides found in {}", path.display());
        }
        tracing::info!(
            slides = deck.slides.len(),
            "loaded deck from {}",
            path.display()
        );
        Ok(deck)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let content = content.replace("\r\n", "\n");
        let (meta, body) = split_front_matter(&content)?;
        let slides = split(body).iter().map(|raw| Slide::parse(raw)).collect();
        Ok(Self { meta, slides })
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Every distinct image path the deck references, in order of appearance.
    pub fn image_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::new();
        for image in self.slides.iter().flat_map(|s| &s.images) {
            if !paths.contains(&image.path.as_str()) {
                paths.push(&image.path);
            }
        }
        paths
    }
}

impl Slide {
    fn parse(raw: &str) -> Self {
        let images = IMAGE_REF
            .captures_iter(raw)
            .map(|c| ImageRef {
                alt: c[1].to_string(),
                path: c[2].to_string(),
            })
            .collect();

        let mut heading = None;
        let mut body_lines: Vec<&str> = Vec::new();
        for line in raw.lines() {
            if heading.is_none() && body_lines.iter().all(|l| l.trim().is_empty()) {
                if let Some(text) = heading_text(line) {
                    heading = Some(text.to_string());
                    continue;
                }
            }
            body_lines.push(line);
        }
        let body = IMAGE_REF
            .replace_all(&body_lines.join("\n"), "")
            .trim()
            .to_string();

        Self {
            heading,
            body,
            images,
        }
    }
}

fn heading_text(line: &str) -> Option<&str> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) {
        line[hashes..].strip_prefix(' ').map(str::trim)
    } else {
        None
    }
}

fn split_front_matter(content: &str) -> Result<(DeckMeta, &str)> {
    // A blank line after the opening dashes makes it a slide separator.
    let Some(rest) = content
        .strip_prefix("---\n")
        .filter(|rest| !rest.starts_with('\n'))
    else {
        return Ok((DeckMeta::default(), content));
    };
    let Some(end) = rest.find("\n---\n").or_else(|| {
        rest.strip_suffix("\n---")
            .map(|yaml| yaml.len())
    }) else {
        return Ok((DeckMeta::default(), content));
    };
    let yaml = &rest[..end];
    let body = rest[end..]
        .strip_prefix("\n---")
        .unwrap_or_default()
        .trim_start_matches('\n');
    let meta: DeckMeta = if yaml.trim().is_empty() {
        DeckMeta::default()
    } else {
        serde_yaml::from_str(yaml).context("Invalid front matter")?
    };
    Ok((meta, body))
}

/// Split a document body (after front matter) into raw slide strings.
///
/// Three things break slides:
/// 1. `---` with blank lines on both sides
/// 2. Three or more consecutive blank lines
/// 3. A `# ` heading when the current slide already has content
pub fn split(body: &str) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut blank_run = 0;

    let lines: Vec<&str> = body.lines().collect();
    for (i, &line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        if is_dash_separator(trimmed) {
            let prev_blank = current.last().is_none_or(|l| l.trim().is_empty());
            let next_blank = lines.get(i + 1).is_none_or(|l| l.trim().is_empty());
            if prev_blank && next_blank {
                flush(&mut current, &mut chunks);
                blank_run = 0;
                continue;
            }
        }

        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run == 3 {
                flush(&mut current, &mut chunks);
                continue;
            }
            if blank_run > 3 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        current.push(line);
    }
    flush(&mut current, &mut chunks);

    let mut slides = Vec::new();
    for chunk in chunks {
        split_by_heading_inference(&chunk, &mut slides);
    }
    slides
}

fn flush(current: &mut Vec<&str>, chunks: &mut Vec<String>) {
    let chunk = current.join("\n").trim().to_string();
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    current.clear();
}

/// Start a new slide at each `# ` heading once the current one has content.
/// Lines inside fenced code blocks are never treated as headings.
fn split_by_heading_inference(chunk: &str, slides: &mut Vec<String>) {
    let mut current = String::new();
    let mut has_content = false;
    let mut fence: Option<(char, usize)> = None;

    for line in chunk.lines() {
        let trimmed = line.trim();

        match fence {
            Some((ch, len)) => {
                let closing = trimmed.chars().take_while(|&c| c == ch).count();
                if closing >= len && trimmed.chars().skip(closing).all(char::is_whitespace) {
                    fence = None;
                }
            }
            None => {
                if let Some(ch) = trimmed
                    .chars()
                    .next()
                    .filter(|_| trimmed.starts_with("```") || trimmed.starts_with("~~~"))
                {
                    fence = Some((ch, trimmed.chars().take_while(|&c| c == ch).count()));
                }
            }
        }

        if fence.is_none() && line.starts_with("# ") && has_content {
            let slide_text = current.trim().to_string();
            if !slide_text.is_empty() {
                slides.push(slide_text);
            }
            current.clear();
            has_content = false;
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
        if !trimmed.is_empty() {
            has_content = true;
        }
    }

    let slide_text = current.trim().to_string();
    if !slide_text.is_empty() {
        slides.push(slide_text);
    }
}

fn is_dash_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line_split() {
        let slides = split("Slide one\n\n\n\nSlide two");
        assert_eq!(slides, vec!["Slide one", "Slide two"]);
    }

    #[test]
    fn test_two_blank_lines_do_not_split() {
        let slides = split("Slide one\n\n\nStill one");
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn test_dash_separator() {
        let slides = split("Slide one\n\n---\n\nSlide two");
        assert_eq!(slides, vec!["Slide one", "Slide two"]);
    }

    #[test]
    fn test_dash_without_blank_lines_is_content() {
        let slides = split("Slide one\n---\nStill one");
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn test_heading_inference() {
        let slides = split("# First\n\nContent\n\n# Second\n\nMore content");
        assert_eq!(slides.len(), 2);
        assert!(slides[0].starts_with("# First"));
        assert!(slides[1].starts_with("# Second"));
    }

    #[test]
    fn test_h2_no_split() {
        assert_eq!(split("# Title\n\n## Subtitle\n\nContent").len(), 1);
    }

    #[test]
    fn test_heading_in_code_fence_no_split() {
        let body = "# Shell\n\n```sh\n# not a heading\necho hi\n```";
        assert_eq!(split(body).len(), 1);
    }

    #[test]
    fn test_front_matter() {
        let deck = Deck::parse("---\ntitle: Demo\ntheme: dark\n---\n\n# One\n\n# Two\n").unwrap();
        assert_eq!(deck.meta.title.as_deref(), Some("Demo"));
        assert_eq!(deck.meta.theme.as_deref(), Some("dark"));
        assert_eq!(deck.len(), 2);
    }

    #[test]
    fn test_leading_separator_is_not_front_matter() {
        let deck = Deck::parse("---\n\n# One\n\n---\n\n# Two\n").unwrap();
        assert!(deck.meta.title.is_none());
        let headings: Vec<_> = deck.slides.iter().map(|s| s.heading.as_deref()).collect();
        assert_eq!(headings, vec![Some("One"), Some("Two")]);
    }

    #[test]
    fn test_without_front_matter() {
        let deck = Deck::parse("# Only\n\nBody text").unwrap();
        assert!(deck.meta.title.is_none());
        assert_eq!(deck.len(), 1);
    }

    #[test]
    fn test_invalid_front_matter_is_an_error() {
        assert!(Deck::parse("---\ntitle: [unclosed\n---\n\n# One").is_err());
    }

    #[test]
    fn test_slide_heading_body_and_images() {
        let deck =
            Deck::parse("# Architecture\n\nThe pieces.\n\n![diagram](img/arch.png)\n").unwrap();
        let slide = &deck.slides[0];
        assert_eq!(slide.heading.as_deref(), Some("Architecture"));
        assert_eq!(slide.body, "The pieces.");
        assert_eq!(
            slide.images,
            vec![ImageRef {
                alt: "diagram".to_string(),
                path: "img/arch.png".to_string(),
            }]
        );
    }

    #[test]
    fn test_image_paths_are_deduplicated() {
        let deck = Deck::parse("![a](x.png)\n\n---\n\n![b](x.png) ![c](y.png)").unwrap();
        assert_eq!(deck.image_paths(), vec!["x.png", "y.png"]);
    }

    #[test]
    fn test_load_rejects_empty_deck() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.md");
        std::fs::write(&path, "\n\n").unwrap();
        assert!(Deck::load(&path).is_err());
    }
}
