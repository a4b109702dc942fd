//! Play log: the structured record of one line of play
//!
//! A log is an ordered list of tagged fragments (free text, line breaks,
//! mana amounts, lands, spells). Renderers concatenate text, turn breaks
//! into newlines and color the rest. The log is purely observational; the
//! search never reads it, except for its size when picking a give-up line.

use crate::core::{slug, Mana};
use im::Vector;
use serde::{Deserialize, Serialize};

const ANSI_MANA: &str = "\u{1b}[35m";
const ANSI_LAND: &str = "\u{1b}[33m";
const ANSI_SPELL: &str = "\u{1b}[32m";
const ANSI_RESET: &str = "\u{1b}[0m";

/// Kind of a log fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Text,
    Break,
    Mana,
    Land,
    Spell,
}

/// One fragment of the play log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogTag {
    #[serde(rename = "type")]
    pub kind: TagKind,
    pub text: String,
}

impl LogTag {
    pub fn new(kind: TagKind, text: impl Into<String>) -> Self {
        LogTag {
            kind,
            text: text.into(),
        }
    }
}

/// Append-only log, shared structurally between sibling states
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayLog {
    tags: Vector<LogTag>,
    size: usize,
}

impl PlayLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append free text, merging into a trailing text fragment
    pub fn text(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.size += s.len();
        match self.tags.pop_back() {
            Some(mut last) if last.kind == TagKind::Text => {
                last.text.push_str(s);
                self.tags.push_back(last);
            }
            Some(other) => {
                self.tags.push_back(other);
                self.tags.push_back(LogTag::new(TagKind::Text, s));
            }
            None => self.tags.push_back(LogTag::new(TagKind::Text, s)),
        }
    }

    /// Start a new line
    pub fn line_break(&mut self) {
        self.push(LogTag::new(TagKind::Break, ""));
    }

    pub fn mana(&mut self, mana: Mana) {
        self.push(LogTag::new(TagKind::Mana, mana.pretty()));
    }

    /// A card reference, tagged land or spell for color-coding
    pub fn card(&mut self, name: &str, is_land: bool) {
        let kind = if is_land { TagKind::Land } else { TagKind::Spell };
        self.push(LogTag::new(kind, name));
    }

    fn push(&mut self, tag: LogTag) {
        self.size += tag.text.len() + 1;
        self.tags.push_back(tag);
    }

    /// Rough measure of how much happened on this line
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &LogTag> + '_ {
        self.tags.iter()
    }

    /// True if any text fragment contains `needle`
    pub fn contains_text(&self, needle: &str) -> bool {
        self.tags
            .iter()
            .any(|t| t.kind == TagKind::Text && t.text.contains(needle))
    }
}

/// Finished record of a search: the winning turn (or -1) and the plays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReport {
    pub turn: i32,
    pub plays: Vec<LogTag>,
}

impl GameReport {
    pub fn is_success(&self) -> bool {
        self.turn >= 0
    }

    /// Human-readable rendering, optionally with ANSI colors
    pub fn render(&self, color: bool) -> String {
        let mut out = String::new();
        for tag in &self.plays {
            let (prefix, body) = match tag.kind {
                TagKind::Text => ("", tag.text.clone()),
                TagKind::Break => ("", "\n".to_string()),
                TagKind::Mana => (ANSI_MANA, tag.text.clone()),
                TagKind::Land => (ANSI_LAND, slug(&tag.text)),
                TagKind::Spell => (ANSI_SPELL, slug(&tag.text)),
            };
            if color && !prefix.is_empty() {
                out.push_str(prefix);
                out.push_str(&body);
                out.push_str(ANSI_RESET);
            } else {
                out.push_str(&body);
            }
        }
        out.push('\n');
        out.push_str(if self.is_success() { "SUCCESS" } else { "FAILURE" });
        out
    }
}

/// Minimal record for bulk statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniReport {
    pub turn: i32,
    #[serde(rename = "onThePlay")]
    pub on_the_play: bool,
}
