//! Page-number field synthesis
//!
//! Only the canonical `PAGE` instruction is ever written. A source field
//! with switches or a different instruction that mentions `PAGE` (such as
//! `NUMPAGES`) is still rebuilt as plain `PAGE`.

use crate::paragraph::runs;
use crate::xml::{qualify, XmlElement};

/// The instruction written into synthesized fields
pub const PAGE_INSTRUCTION: &str = "PAGE";

/// First field instruction of a paragraph that mentions `PAGE`
///
/// Complex fields are read from `w:instrText` inside runs; simple fields
/// from `w:fldSimple/@w:instr`.
pub fn page_field_instruction(paragraph: &XmlElement) -> Option<String> {
    let complex = runs(paragraph)
        .into_iter()
        .flat_map(|run| run.children_named("instrText"))
        .map(|instr| instr.text())
        .find(|text| text.contains(PAGE_INSTRUCTION));
    if complex.is_some() {
        return complex;
    }

    paragraph
        .children_named("fldSimple")
        .filter_map(|field| field.attr("instr"))
        .find(|instr| instr.contains(PAGE_INSTRUCTION))
        .map(str::to_string)
}

/// Check whether a paragraph contains a page-number field
pub fn contains_page_field(paragraph: &XmlElement) -> bool {
    page_field_instruction(paragraph).is_some()
}

/// Check whether an instruction is a bare `PAGE`
///
/// The `\* MERGEFORMAT` switch Word adds by default carries no meaning
/// for a page number and is ignored.
pub fn is_canonical(instruction: &str) -> bool {
    let stripped = instruction.replace("\\* MERGEFORMAT", "");
    stripped.trim() == PAGE_INSTRUCTION
}

/// Build a run holding a complete `PAGE` field sequence
pub fn page_field_run(prefix: Option<&str>) -> XmlElement {
    let fld_char = |kind: &str| {
        XmlElement::new(qualify(prefix, "fldChar")).with_attr(qualify(prefix, "fldCharType"), kind)
    };

    XmlElement::new(qualify(prefix, "r"))
        .with_child(fld_char("begin"))
        .with_child(
            XmlElement::new(qualify(prefix, "instrText"))
                .with_attr("xml:space", "preserve")
                .with_text(PAGE_INSTRUCTION),
        )
        .with_child(fld_char("end"))
}

/// Append a `PAGE` field run to a paragraph
pub fn append_page_field(paragraph: &mut XmlElement) {
    let run = page_field_run(paragraph.prefix());
    paragraph.push(run);
}
