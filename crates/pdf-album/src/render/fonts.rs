//! Glyph metrics and encoding for the standard Helvetica faces.
//!
//! Builtin fonts are written with `/WinAnsiEncoding`, so text is limited to
//! the WinAnsi (cp1252) repertoire. Widths are the AFM advance widths in
//! 1/1000 em, indexed by WinAnsi code from 0x20 to 0xFF.

/// Font faces used by the text styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
}

impl FontFace {
    pub fn builtin(self) -> printpdf::BuiltinFont {
        match self {
            FontFace::Helvetica => printpdf::BuiltinFont::Helvetica,
            FontFace::HelveticaBold => printpdf::BuiltinFont::HelveticaBold,
        }
    }

    fn widths(self) -> &'static [u16; 224] {
        match self {
            FontFace::Helvetica => &HELVETICA_WIDTHS,
            FontFace::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Advance width of one character in 1/1000 em. Characters outside
    /// WinAnsi are measured as the `?` they will be drawn as.
    pub fn char_width(self, ch: char) -> u16 {
        let code = winansi_code(ch).unwrap_or(REPLACEMENT);
        self.widths()[(code - 0x20) as usize]
    }

    /// Width of `text` in points at `size_pt`
    pub fn text_width(self, text: &str, size_pt: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 / 1000.0 * size_pt
    }
}

/// Drawn in place of characters WinAnsi cannot encode
const REPLACEMENT: u8 = b'?';

/// WinAnsi code of a printable character, if it has one
pub fn winansi_code(ch: char) -> Option<u8> {
    let code = match ch {
        ' '..='~' | '\u{a0}'..='\u{ff}' => ch as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '•' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// Encode text as WinAnsi bytes, replacing unencodable characters with `?`
pub fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| winansi_code(c).unwrap_or(REPLACEMENT))
        .collect()
}

/// Replace every character WinAnsi cannot draw with `?`, keeping line
/// breaks. Returns the cleaned text and the number of replacements.
pub fn restrict_to_winansi(text: &str) -> (String, usize) {
    let mut replaced = 0;
    let cleaned = text
        .chars()
        .map(|c| {
            if c == '\n' || winansi_code(c).is_some() {
                c
            } else if c.is_whitespace() {
                ' '
            } else {
                replaced += 1;
                REPLACEMENT as char
            }
        })
        .collect();
    (cleaned, replaced)
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 224] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0,   // p..DEL
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,    // 0x80
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,   // 0x90
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 224] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 0,   // p..DEL
    556, 0, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,    // 0x80
    0, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0, 500, 667,   // 0x90
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556, // 0xF0
];

/// Greedy word wrap of `text` into lines no wider than `max_width_pt`.
///
/// Hard line breaks are kept, blank lines included. Words wider than the
/// line on their own are broken between characters.
pub fn wrap_text(text: &str, face: FontFace, size_pt: f32, max_width_pt: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if face.text_width(&candidate, size_pt) <= max_width_pt {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if face.text_width(word, size_pt) <= max_width_pt {
                current = word.to_string();
            } else {
                let mut pieces = break_word(word, face, size_pt, max_width_pt);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        lines.push(current);
    }

    lines
}

fn break_word(word: &str, face: FontFace, size_pt: f32, max_width_pt: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for ch in word.chars() {
        current.push(ch);
        if face.text_width(&current, size_pt) > max_width_pt && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_afm() {
        assert_eq!(FontFace::Helvetica.char_width(' '), 278);
        assert_eq!(FontFace::Helvetica.char_width('W'), 944);
        assert_eq!(FontFace::Helvetica.char_width('i'), 222);
        assert_eq!(FontFace::HelveticaBold.char_width('i'), 278);
        assert_eq!(FontFace::Helvetica.char_width('~'), 584);
        assert_eq!(FontFace::Helvetica.char_width('Ö'), 778);
        assert_eq!(FontFace::HelveticaBold.char_width('ö'), 611);
        assert_eq!(FontFace::Helvetica.char_width('€'), 556);
        // Drawn as '?'
        assert_eq!(FontFace::Helvetica.char_width('✓'), 556);
        assert_eq!(FontFace::HelveticaBold.char_width('→'), 611);
    }

    #[test]
    fn swedish_letters_measure_as_single_glyphs() {
        // å ä ö are 556 each in Helvetica
        let w = FontFace::Helvetica.text_width("åäö", 10.0);
        assert!((w - 16.68).abs() < 0.001);
    }

    #[test]
    fn encodes_to_winansi() {
        assert_eq!(encode_winansi("åäö Ö"), vec![0xE5, 0xE4, 0xF6, b' ', 0xD6]);
        assert_eq!(encode_winansi("\u{2013}€"), vec![0x96, 0x80]);
        assert_eq!(encode_winansi("→✓"), b"??".to_vec());
    }

    #[test]
    fn restricting_counts_replacements() {
        let (text, replaced) = restrict_to_winansi("Kapitel Ett: åäö Ö → ✓\nrad två\tslut");
        assert_eq!(text, "Kapitel Ett: åäö Ö ? ?\nrad två slut");
        assert_eq!(replaced, 2);
    }

    #[test]
    fn text_width_scales_with_size() {
        // "H" is 722 units
        let w = FontFace::Helvetica.text_width("HH", 10.0);
        assert!((w - 14.44).abs() < 0.001);
    }

    #[test]
    fn short_text_is_one_line() {
        let lines = wrap_text("Chapter One", FontFace::HelveticaBold, 24.0, 500.0);
        assert_eq!(lines, vec!["Chapter One".to_string()]);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let text = "aaaa bbbb cccc dddd";
        // Each word is 4 * 556 = 2224 units => 22.24pt at 10pt
        let lines = wrap_text(text, FontFace::Helvetica, 10.0, 50.0);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc dddd"]);
    }

    #[test]
    fn keeps_hard_breaks_and_blank_lines() {
        let lines = wrap_text("one\n\ntwo", FontFace::Helvetica, 10.0, 500.0);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn breaks_overlong_words() {
        // 10 'a' at 10pt = 55.6pt, limit 25pt => pieces of 4 chars (22.24pt)
        let lines = wrap_text("aaaaaaaaaa", FontFace::Helvetica, 10.0, 25.0);
        assert_eq!(lines, vec!["aaaa", "aaaa", "aa"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_text("", FontFace::Helvetica, 10.0, 100.0).is_empty());
    }
}
