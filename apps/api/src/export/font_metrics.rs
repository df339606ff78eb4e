//! Static Helvetica metric tables for PDF layout.
//!
//! Widths are in em units (AFM advance width / 1000) for the PDF base-14
//! Helvetica faces. Oblique shares the regular widths.
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

// ────────────────────────────────────────────────────────────────────────────
// Faces
// ────────────────────────────────────────────────────────────────────────────

/// The three faces the PDF renderer registers as page resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
    Oblique,
}

impl FontFace {
    /// Resource name used in content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
            FontFace::Oblique => "F3",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
            FontFace::Oblique => "Helvetica-Oblique",
        }
    }

    pub fn metrics(self) -> &'static FontMetricTable {
        match self {
            FontFace::Regular | FontFace::Oblique => &HELVETICA,
            FontFace::Bold => &HELVETICA_BOLD,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one face.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Width of the WinAnsi bullet (0x95), which `●` and `•` are drawn as.
    pub bullet_width: f32,
    /// Fallback for other non-ASCII characters.
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else if matches!(c, '●' | '•') {
                    self.bullet_width
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Width in points at `size_pt`.
    pub fn width_pt(&self, s: &str, size_pt: f32) -> f32 {
        self.measure_str(s) * size_pt
    }
}

/// Greedy word wrap at `max_width_pt`. A word wider than the line gets a line
/// to itself rather than being split. Empty input yields no lines.
pub fn wrap_text(text: &str, face: FontFace, size_pt: f32, max_width_pt: f32) -> Vec<String> {
    let metrics = face.metrics();
    let max_width = max_width_pt / size_pt;
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in text.split_whitespace() {
        let word_w = metrics.measure_str(word);

        if !current.is_empty() && current_width + metrics.space_width + word_w > max_width {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_width += metrics.space_width;
        }
        current.push_str(word);
        current_width += word_w;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// ────────────────────────────────────────────────────────────────────────────
// Tables
// ────────────────────────────────────────────────────────────────────────────

pub static HELVETICA: FontMetricTable = FontMetricTable {
    widths: [
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, // sp ! " # $ % & '
        0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278, // ( ) * + , - . /
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, // 0-9
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015, // : ; < = > ? @
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, // A-I
        0.500, 0.667, 0.556, 0.833, 0.722, 0.778, 0.667, 0.778, 0.722, // J-R
        0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611, // S-Z
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333, // [ \ ] ^ _ `
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, // a-i
        0.222, 0.500, 0.222, 0.833, 0.556, 0.556, 0.556, 0.556, 0.333, // j-r
        0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500, // s-z
        0.334, 0.260, 0.334, 0.584, // { | } ~
    ],
    bullet_width: 0.350,
    average_char_width: 0.556,
    space_width: 0.278,
};

pub static HELVETICA_BOLD: FontMetricTable = FontMetricTable {
    widths: [
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, // sp ! " # $ % & '
        0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278, // ( ) * + , - . /
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, // 0-9
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975, // : ; < = > ? @
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, // A-I
        0.556, 0.722, 0.611, 0.833, 0.722, 0.778, 0.667, 0.778, 0.722, // J-R
        0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611, // S-Z
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333, // [ \ ] ^ _ `
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, // a-i
        0.278, 0.556, 0.278, 0.889, 0.611, 0.611, 0.611, 0.611, 0.389, // j-r
        0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500, // s-z
        0.389, 0.280, 0.389, 0.584, // { | } ~
    ],
    bullet_width: 0.350,
    average_char_width: 0.611,
    space_width: 0.278,
};
