//! WCAG 2.x contrast ratio computation.
//!
//! Colors arrive as the textual `rgb()`/`rgba()` forms the browser reports
//! for resolved `color` and `background-color`. The math follows the WCAG
//! relative-luminance definition: <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>

use once_cell::sync::Lazy;
use regex::Regex;

/// AA threshold for normal-size text.
pub const AA_NORMAL_TEXT: f64 = 4.5;
/// AA threshold for large text (>= 18pt, or 14pt bold).
pub const AA_LARGE_TEXT: f64 = 3.0;
/// AAA threshold for normal-size text.
pub const AAA_NORMAL_TEXT: f64 = 7.0;

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"-?\d+(?:\.\d+)?").expect("static regex")
});

/// Extract the first three numeric components of a CSS color string as RGB
/// channels clamped to [0, 255]. Returns `None` when fewer than three
/// numbers are present (keywords, malformed values, empty reads).
pub fn parse_channels(color: &str) -> Option<[f64; 3]> {
    let mut numbers = NUMBER
        .find_iter(color)
        .filter_map(|m| m.as_str().parse::<f64>().ok());
    let r = numbers.next()?;
    let g = numbers.next()?;
    let b = numbers.next()?;
    Some([r, g, b].map(|c| c.clamp(0.0, 255.0)))
}

fn linearize(channel: f64) -> f64 {
    if channel <= 0.03928 {
        channel / 12.92
    } else {
        ((channel + 0.055) / 1.055).powf(2.4)
    }
}

/// WCAG relative luminance of a color string, in [0, 1].
///
/// A value that does not yield three channels is treated as luminance 0.
/// That fails toward the worst case: an unreadable color report produces a
/// degenerate low ratio that forces investigation, never a false pass.
pub fn relative_luminance(color: &str) -> f64 {
    let Some([r, g, b]) = parse_channels(color) else {
        return 0.0;
    };
    let r = linearize(r / 255.0);
    let g = linearize(g / 255.0);
    let b = linearize(b / 255.0);
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Contrast ratio between two color strings, in [1, 21].
///
/// Symmetric in its arguments; order of foreground and background does not
/// matter. Never panics on malformed input.
pub fn contrast_ratio(foreground: &str, background: &str) -> f64 {
    let fg = relative_luminance(foreground);
    let bg = relative_luminance(background);
    let (lighter, darker) = if fg > bg { (fg, bg) } else { (bg, fg) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Whether the pair meets the given ratio threshold.
pub fn meets_ratio(foreground: &str, background: &str, threshold: f64) -> bool {
    contrast_ratio(foreground, background) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_on_white_is_21() {
        let ratio = contrast_ratio("rgb(0, 0, 0)", "rgb(255, 255, 255)");
        assert!((ratio - 21.0).abs() < 1e-9, "got {ratio}");
    }

    #[test]
    fn identical_colors_ratio_is_1() {
        let ratio = contrast_ratio("rgb(119, 119, 119)", "rgb(119, 119, 119)");
        assert!((ratio - 1.0).abs() < 1e-9, "got {ratio}");
    }

    #[test]
    fn ratio_is_symmetric() {
        let a = contrast_ratio("rgb(20, 40, 60)", "rgb(240, 240, 240)");
        let b = contrast_ratio("rgb(240, 240, 240)", "rgb(20, 40, 60)");
        assert_eq!(a, b);
    }

    #[test]
    fn ratio_stays_within_bounds() {
        for pair in [
            ("rgb(0,0,0)", "rgb(255,255,255)"),
            ("rgb(12, 200, 99)", "rgb(99, 12, 200)"),
            ("rgba(255, 0, 0, 0.5)", "rgb(0, 128, 0)"),
            ("not-a-color", "rgb(255,255,255)"),
        ] {
            let ratio = contrast_ratio(pair.0, pair.1);
            assert!((1.0..=21.0).contains(&ratio), "{pair:?} -> {ratio}");
        }
    }

    #[test]
    fn malformed_input_degrades_instead_of_panicking() {
        // Both unparseable: luminance 0 on both sides, ratio 1.
        assert!((contrast_ratio("not-a-color", "also-bad") - 1.0).abs() < 1e-9);
        // One unparseable against white: worst-case 21, forcing a look.
        assert!((contrast_ratio("not-a-color", "rgb(255,255,255)") - 21.0).abs() < 1e-9);
    }

    #[test]
    fn gray_on_white_straddles_aa_thresholds() {
        // rgb(119,119,119) on white is ~4.48: below AA normal, above AA large.
        let ratio = contrast_ratio("rgb(119, 119, 119)", "rgb(255, 255, 255)");
        assert!((ratio - 4.48).abs() < 0.05, "got {ratio}");
        assert!(ratio < AA_NORMAL_TEXT);
        assert!(ratio > AA_LARGE_TEXT);
    }

    #[test]
    fn parses_rgba_and_ignores_alpha() {
        assert_eq!(
            parse_channels("rgba(10, 20, 30, 0.4)"),
            Some([10.0, 20.0, 30.0])
        );
    }

    #[test]
    fn out_of_range_channels_are_clamped() {
        assert_eq!(
            parse_channels("rgb(300, -5, 128)"),
            Some([255.0, 0.0, 128.0])
        );
    }

    #[test]
    fn too_few_components_is_none() {
        assert_eq!(parse_channels("rgb(1, 2)"), None);
        assert_eq!(parse_channels("red"), None);
        assert_eq!(parse_channels(""), None);
    }
}
