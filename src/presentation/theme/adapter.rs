//! Conversion between ratatui colors and HSL for theme derivation.

use coolor::{Hsl, Rgb};
use ratatui::style::Color;

/// RGB values for the 16 base ANSI colors, indexed by color number.
const ANSI_BASE: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (170, 0, 0),
    (0, 170, 0),
    (170, 85, 0),
    (0, 0, 170),
    (170, 0, 170),
    (0, 170, 170),
    (170, 170, 170),
    (85, 85, 85),
    (255, 85, 85),
    (85, 255, 85),
    (255, 255, 85),
    (85, 85, 255),
    (255, 85, 255),
    (85, 255, 255),
    (255, 255, 255),
];

/// Converts a ratatui color to HSL.
#[must_use]
pub fn to_hsl(color: Color) -> Hsl {
    let (r, g, b) = to_rgb_components(color);
    Rgb::new(r, g, b).to_hsl()
}

/// Converts an HSL value back to a ratatui RGB color.
#[must_use]
pub fn to_color(hsl: Hsl) -> Color {
    let rgb: Rgb = hsl.to_rgb();
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn to_rgb_components(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Black => ANSI_BASE[0],
        Color::Red => ANSI_BASE[1],
        Color::Green => ANSI_BASE[2],
        Color::Yellow => ANSI_BASE[3],
        Color::Blue => ANSI_BASE[4],
        Color::Magenta => ANSI_BASE[5],
        Color::Cyan => ANSI_BASE[6],
        Color::Gray => ANSI_BASE[7],
        Color::DarkGray => ANSI_BASE[8],
        Color::LightRed => ANSI_BASE[9],
        Color::LightGreen => ANSI_BASE[10],
        Color::LightYellow => ANSI_BASE[11],
        Color::LightBlue => ANSI_BASE[12],
        Color::LightMagenta => ANSI_BASE[13],
        Color::LightCyan => ANSI_BASE[14],
        Color::Indexed(i) => ansi_to_rgb(i),
        _ => (255, 255, 255),
    }
}

fn ansi_to_rgb(i: u8) -> (u8, u8, u8) {
    match i {
        0..=15 => ANSI_BASE[i as usize],

        // 6x6x6 color cube
        16..=231 => {
            let i = i - 16;
            let r = (i / 36) % 6;
            let g = (i / 6) % 6;
            let b = i % 6;

            let map = |c| if c == 0 { 0 } else { c * 40 + 55 };
            (map(r), map(g), map(b))
        }

        // grayscale ramp
        232..=255 => {
            let v = (i - 232) * 10 + 8;
            (v, v, v)
        }
    }
}
