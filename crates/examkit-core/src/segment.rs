//! Question boundary detection.
//!
//! Splits the raw text into one block per question marker. Candidate marker
//! patterns are tried in order and the first one that matches anywhere is used
//! for the whole text; patterns are never mixed.

use regex::Regex;

use crate::config::ExtractConfig;
use crate::error::ExtractError;

/// The raw text belonging to one question marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Question number captured from the marker.
    pub number: u32,
    /// Byte offset of the marker in the source text.
    pub offset: usize,
    /// Text between the end of the marker and the next marker.
    pub text: &'a str,
}

/// Output of [`QuestionSegmenter::segment`].
#[derive(Debug, Clone, Default)]
pub struct Segmentation<'a> {
    /// Blocks in text order. Duplicate numbers are passed through.
    pub blocks: Vec<Block<'a>>,
    /// The boundary pattern that produced the blocks, if any matched.
    pub pattern: Option<String>,
    /// Byte offset where the answer-key section cut segmentation short.
    pub answer_key_offset: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Marker {
    number: u32,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone)]
pub struct QuestionSegmenter {
    patterns: Vec<Regex>,
    stop_marker: String,
    stop_window: usize,
}

impl QuestionSegmenter {
    pub fn new<S: AsRef<str>>(
        patterns: &[S],
        stop_marker: &str,
        stop_window: usize,
    ) -> Result<Self, ExtractError> {
        if patterns.is_empty() {
            return Err(ExtractError::NoBoundaryPatterns);
        }
        if stop_marker.trim().is_empty() {
            return Err(ExtractError::EmptyMarker("answer marker"));
        }
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                let re = Regex::new(p).map_err(|source| ExtractError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })?;
                // Group 0 is the whole match.
                if re.captures_len() != 2 {
                    return Err(ExtractError::MissingCaptureGroup(p.to_string()));
                }
                Ok(re)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            stop_marker: stop_marker.trim().to_string(),
            stop_window,
        })
    }

    pub fn from_config(config: &ExtractConfig) -> Result<Self, ExtractError> {
        Self::new(
            config.question_patterns.as_slice(),
            &config.answer_marker,
            config.stop_window,
        )
    }

    /// Slice `text` into per-question blocks, stopping at the answer key.
    pub fn segment<'a>(&self, text: &'a str) -> Segmentation<'a> {
        let Some((pattern, markers)) = self.first_matching(text) else {
            tracing::warn!("no question markers found");
            return Segmentation::default();
        };
        tracing::debug!("using boundary pattern `{}` ({} markers)", pattern, markers.len());

        let mut segmentation = Segmentation {
            pattern: Some(pattern.to_string()),
            ..Default::default()
        };

        for (i, marker) in markers.iter().enumerate() {
            let end = markers.get(i + 1).map_or(text.len(), |next| next.start);
            let body = &text[marker.end..end];

            if let Some(cut) = self.answer_key_start(body) {
                let body = &body[..cut];
                if !body.trim().is_empty() {
                    segmentation.blocks.push(Block {
                        number: marker.number,
                        offset: marker.start,
                        text: body,
                    });
                }
                segmentation.answer_key_offset = Some(marker.end + cut);
                tracing::debug!(
                    "answer key reached inside block {}; ignoring {} later markers",
                    marker.number,
                    markers.len() - i - 1
                );
                break;
            }

            segmentation.blocks.push(Block {
                number: marker.number,
                offset: marker.start,
                text: body,
            });
        }

        segmentation
    }

    fn first_matching<'r>(&'r self, text: &str) -> Option<(&'r str, Vec<Marker>)> {
        self.patterns.iter().find_map(|re| {
            let markers: Vec<Marker> = re
                .captures_iter(text)
                .filter_map(|caps| {
                    let whole = caps.get(0)?;
                    let number = caps.get(1)?.as_str().parse::<u32>().ok().filter(|n| *n > 0)?;
                    Some(Marker {
                        number,
                        start: whole.start(),
                        end: whole.end(),
                    })
                })
                .collect();
            (!markers.is_empty()).then(|| (re.as_str(), markers))
        })
    }

    /// Where the answer key starts inside `body`: the marker as a literal
    /// within the leading window, or as a line of its own anywhere.
    fn answer_key_start(&self, body: &str) -> Option<usize> {
        let window_end = body
            .char_indices()
            .nth(self.stop_window)
            .map_or(body.len(), |(i, _)| i);
        let leading = body
            .find(self.stop_marker.as_str())
            .filter(|&pos| pos < window_end);

        let standalone = body
            .match_indices(self.stop_marker.as_str())
            .map(|(pos, _)| pos)
            .find(|&pos| is_whole_line(body, pos, self.stop_marker.len()));

        match (leading, standalone) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

fn is_whole_line(text: &str, pos: usize, len: usize) -> bool {
    let line_start = text[..pos].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[pos + len..]
        .find('\n')
        .map_or(text.len(), |i| pos + len + i);
    text[line_start..pos].trim().is_empty() && text[pos + len..line_end].trim().is_empty()
}
