//! Run formatting codec
//!
//! Reads and writes the character formatting of a single `w:r`. Writing is
//! a full overwrite: booleans always end up explicit (`<w:b/>` or
//! `<w:b w:val="0"/>`), and a missing font name or size removes the direct
//! attribute so the run inherits it from its style.

use serde::{Deserialize, Serialize};

use crate::xml::{qualify, XmlElement};

/// Schema order of `w:rPr` children (CT_RPr)
pub const RPR_ORDER: &[&str] = &[
    "rStyle", "rFonts", "b", "bCs", "i", "iCs", "caps", "smallCaps", "strike", "dstrike",
    "outline", "shadow", "emboss", "imprint", "noProof", "snapToGrid", "vanish", "webHidden",
    "color", "spacing", "w", "kern", "position", "sz", "szCs", "highlight", "u", "effect", "bdr",
    "shd", "fitText", "vertAlign", "rtl", "cs", "em", "lang", "eastAsianLayout", "specVanish",
    "oMath", "rPrChange",
];

/// Explicit character formatting of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattingProfile {
    /// Bold (false when unset)
    pub bold: bool,
    /// Italic (false when unset)
    pub italic: bool,
    /// Underlined with any style other than `none`
    pub underline: bool,
    /// Latin font face (`w:rFonts/@w:ascii`)
    pub font_name: Option<String>,
    /// Size in points
    pub font_size: Option<f32>,
}

impl FormattingProfile {
    /// Read the profile of a `w:r` element
    pub fn extract(run: &XmlElement) -> Self {
        let Some(rpr) = run.child("rPr") else {
            return Self::default();
        };
        let (font_name, font_size) = font_of(run);
        Self {
            bold: toggle(rpr, "b"),
            italic: toggle(rpr, "i"),
            underline: rpr
                .child("u")
                .is_some_and(|u| u.attr("val").map_or(true, |v| v != "none")),
            font_name,
            font_size,
        }
    }

    /// Overwrite the formatting of a `w:r` element with this profile
    pub fn apply(&self, run: &mut XmlElement) {
        let prefix = run.prefix().map(str::to_string);
        let prefix = prefix.as_deref();
        let rpr = run.ensure_leading_child("rPr");

        set_toggle(rpr, prefix, "b", self.bold);
        set_toggle(rpr, prefix, "i", self.italic);

        let underline = if self.underline { "single" } else { "none" };
        rpr.ensure_child("u", RPR_ORDER)
            .set_attr(qualify(prefix, "val"), underline);

        apply_font(run, self.font_name.as_deref(), self.font_size);
    }
}

/// Font face and size of a run, as set directly on it
pub fn font_of(run: &XmlElement) -> (Option<String>, Option<f32>) {
    let Some(rpr) = run.child("rPr") else {
        return (None, None);
    };
    let name = rpr
        .child("rFonts")
        .and_then(|fonts| fonts.attr("ascii").or_else(|| fonts.attr("hAnsi")))
        .map(str::to_string);
    let size = rpr
        .child("sz")
        .and_then(|sz| sz.attr("val"))
        .and_then(|val| val.trim().parse::<f32>().ok())
        .map(|half_points| half_points / 2.0);
    (name, size)
}

/// Set (or clear, with `None`) a run's direct font face and size
pub fn apply_font(run: &mut XmlElement, name: Option<&str>, size: Option<f32>) {
    let prefix = run.prefix().map(str::to_string);
    let prefix = prefix.as_deref();
    let rpr = run.ensure_leading_child("rPr");

    match name {
        Some(name) => {
            let fonts = rpr.ensure_child("rFonts", RPR_ORDER);
            fonts.remove_attr("asciiTheme");
            fonts.remove_attr("hAnsiTheme");
            fonts.set_attr(qualify(prefix, "ascii"), name);
            fonts.set_attr(qualify(prefix, "hAnsi"), name);
        }
        None => {
            if let Some(fonts) = rpr.child_mut("rFonts") {
                for attr in ["ascii", "hAnsi", "asciiTheme", "hAnsiTheme"] {
                    fonts.remove_attr(attr);
                }
                if fonts.attributes.is_empty() {
                    rpr.remove_children("rFonts");
                }
            }
        }
    }

    rpr.remove_children("sz");
    rpr.remove_children("szCs");
    if let Some(points) = size {
        let half_points = (points * 2.0).round().max(1.0) as u32;
        for local in ["sz", "szCs"] {
            let element = XmlElement::new(qualify(prefix, local))
                .with_attr(qualify(prefix, "val"), half_points.to_string());
            rpr.insert_ordered(element, RPR_ORDER);
        }
    }
}

/// Visible text of a run (`w:t`, tabs and breaks)
pub fn run_text(run: &XmlElement) -> String {
    let mut text = String::new();
    for child in run.elements() {
        match child.local_name() {
            "t" => text.push_str(&child.text()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Build a new `w:r` carrying plain text
///
/// Tabs and line breaks become `w:tab` and `w:br`, as Word would write them.
pub fn new_run(prefix: Option<&str>, text: &str) -> XmlElement {
    let mut run = XmlElement::new(qualify(prefix, "r"));
    let mut pending = String::new();

    let flush = |run: &mut XmlElement, pending: &mut String| {
        if pending.is_empty() {
            return;
        }
        let mut t = XmlElement::new(qualify(prefix, "t"));
        if pending.starts_with(char::is_whitespace) || pending.ends_with(char::is_whitespace) {
            t = t.with_attr("xml:space", "preserve");
        }
        run.push(t.with_text(std::mem::take(pending)));
    };

    for c in text.chars() {
        match c {
            '\t' => {
                flush(&mut run, &mut pending);
                run.push(XmlElement::new(qualify(prefix, "tab")));
            }
            '\n' => {
                flush(&mut run, &mut pending);
                run.push(XmlElement::new(qualify(prefix, "br")));
            }
            '\r' => {}
            c => pending.push(c),
        }
    }
    flush(&mut run, &mut pending);
    run
}

fn toggle(rpr: &XmlElement, local: &str) -> bool {
    rpr.child(local)
        .is_some_and(|e| !matches!(e.attr("val"), Some("0" | "false" | "off")))
}

fn set_toggle(rpr: &mut XmlElement, prefix: Option<&str>, local: &str, on: bool) {
    let element = rpr.ensure_child(local, RPR_ORDER);
    if on {
        element.remove_attr("val");
    } else {
        element.set_attr(qualify(prefix, "val"), "0");
    }
}
