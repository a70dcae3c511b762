//! Text encodings of [`FrameRecord`] streams.
//!
//! `Legacy` is the bracketed format downstream dataset loaders already
//! parse:
//!
//! ```text
//! [{'frame_id':1, 'classes':[Cube,Slab], 'boxes':[[75 75 50 50],[0 0 0 0]], 'index':[1,2], 'class':[0,1]},
//! [{'frame_id':2, ...}]
//! ```
//!
//! Each record opens with `[`, records are separated by `,\n` and the last
//! one is closed with `]`.  Class labels are written bare, so labels that
//! contain `,` or `]` cannot be read back.
//!
//! `JsonLines` writes one JSON object per line with the same field names.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::Deserialize;

use crate::bbox::PixelBox;
use crate::error::AnnotateError;
use crate::record::FrameRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordFormat {
    #[default]
    Legacy,
    JsonLines,
}

impl RecordFormat {
    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            RecordFormat::Legacy => "txt",
            RecordFormat::JsonLines => "jsonl",
        }
    }

    /// Text placed between two consecutive records.
    pub fn separator(&self) -> &'static str {
        match self {
            RecordFormat::Legacy => ",\n",
            RecordFormat::JsonLines => "",
        }
    }

    /// Text closing a non-empty stream.
    pub fn terminator(&self) -> &'static str {
        match self {
            RecordFormat::Legacy => "]",
            RecordFormat::JsonLines => "",
        }
    }

    /// Encode a single record, without separator or terminator.
    pub fn encode(&self, record: &FrameRecord) -> Result<String, AnnotateError> {
        match self {
            RecordFormat::Legacy => Ok(encode_legacy(record)),
            RecordFormat::JsonLines => {
                let mut line = serde_json::to_string(record)?;
                line.push('\n');
                Ok(line)
            }
        }
    }

    /// Decode a complete stream.
    pub fn parse(&self, text: &str) -> Result<Vec<FrameRecord>, AnnotateError> {
        match self {
            RecordFormat::Legacy => parse_legacy(text),
            RecordFormat::JsonLines => text
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| serde_json::from_str(l).map_err(AnnotateError::from))
                .collect(),
        }
    }

    /// Guess the format from the first non-blank character.
    pub fn sniff(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('{') => RecordFormat::JsonLines,
            _ => RecordFormat::Legacy,
        }
    }
}

impl FromStr for RecordFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(RecordFormat::Legacy),
            "json-lines" | "jsonl" => Ok(RecordFormat::JsonLines),
            other => Err(format!("unknown record format '{}'", other)),
        }
    }
}

// ── Legacy encoding ──────────────────────────────────────────────────────────

fn join<T: ToString>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

fn encode_legacy(r: &FrameRecord) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "[{{'frame_id':{}, 'classes':[{}], 'boxes':[",
        r.frame,
        r.classes.join(",")
    );
    let boxes: Vec<String> = r
        .boxes
        .iter()
        .map(|b| format!("[{} {} {} {}]", b.x, b.y, b.width, b.height))
        .collect();
    out.push_str(&boxes.join(","));
    let _ = write!(
        out,
        "], 'index':[{}], 'class':[{}]}}",
        join(&r.indices, ","),
        join(&r.class_ids, ",")
    );
    out
}

// ── Legacy parsing ───────────────────────────────────────────────────────────

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn error(&self, reason: impl Into<String>) -> AnnotateError {
        AnnotateError::Parse {
            pos: self.pos,
            reason: reason.into(),
        }
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.rest().is_empty()
    }

    fn eat(&mut self, lit: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(lit) {
            self.pos += lit.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, lit: &str) -> Result<(), AnnotateError> {
        if self.eat(lit) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{}`", lit)))
        }
    }

    /// Raw text up to (not including) `end`; the cursor stops on `end`.
    fn until(&mut self, end: char) -> Result<&'a str, AnnotateError> {
        let rest = self.rest();
        let n = rest
            .find(end)
            .ok_or_else(|| self.error(format!("unterminated list, missing `{}`", end)))?;
        self.pos += n;
        Ok(&rest[..n])
    }

    fn number<T: FromStr>(&mut self) -> Result<T, AnnotateError> {
        self.skip_ws();
        let rest = self.rest();
        let n = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let value = rest[..n]
            .parse()
            .map_err(|_| self.error("expected an unsigned integer"))?;
        self.pos += n;
        Ok(value)
    }

    /// Comma separated list body up to `]`.
    fn list<T: FromStr>(&mut self) -> Result<Vec<T>, AnnotateError> {
        let start = self.pos;
        let body = self.until(']')?;
        split_list(body)
            .map(|item| {
                item.parse().map_err(|_| AnnotateError::Parse {
                    pos: start,
                    reason: format!("bad list item '{}'", item),
                })
            })
            .collect()
    }
}

fn split_list(body: &str) -> impl Iterator<Item = &str> {
    body.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_record(c: &mut Cursor<'_>) -> Result<FrameRecord, AnnotateError> {
    c.expect("[")?;
    c.expect("{'frame_id':")?;
    let frame = c.number()?;

    c.expect(",")?;
    c.expect("'classes':[")?;
    let classes = split_list(c.until(']')?).map(str::to_string).collect();
    c.expect("]")?;

    c.expect(",")?;
    c.expect("'boxes':[")?;
    let mut boxes = Vec::new();
    while c.eat("[") {
        let parts: [u32; 4] = [c.number()?, c.number()?, c.number()?, c.number()?];
        c.expect("]")?;
        boxes.push(PixelBox::from(parts));
        if !c.eat(",") {
            break;
        }
    }
    c.expect("]")?;

    c.expect(",")?;
    c.expect("'index':[")?;
    let indices = c.list()?;
    c.expect("]")?;

    c.expect(",")?;
    c.expect("'class':[")?;
    let class_ids = c.list()?;
    c.expect("]")?;
    c.expect("}")?;

    Ok(FrameRecord {
        frame,
        classes,
        boxes,
        indices,
        class_ids,
    })
}

fn parse_legacy(text: &str) -> Result<Vec<FrameRecord>, AnnotateError> {
    let mut c = Cursor::new(text);
    let mut records = Vec::new();
    if c.at_end() {
        return Ok(records);
    }
    loop {
        records.push(parse_record(&mut c)?);
        if c.eat(",") {
            continue;
        }
        c.expect("]")?;
        if !c.at_end() {
            return Err(c.error("trailing data after closing bracket"));
        }
        return Ok(records);
    }
}
