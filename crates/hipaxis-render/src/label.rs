//! Label text and placement.

use hipaxis_core::{ImageInfo, Modality, Stats, ToolConfig, Viewport};
use kurbo::{Point, Rect};

/// Gap between paired values on one line.
const COLUMN_GAP: &str = "     ";
/// Upper bound on padding spaces, in case a measurer reports zero width.
const MAX_PADDING: usize = 256;

/// Insert thousands separators into the integer part of a decimal string.
pub fn with_commas(number: &str) -> String {
    let (sign, rest) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int, frac) = match rest.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (rest, None),
    };
    if !int.bytes().all(|b| b.is_ascii_digit()) {
        return number.to_string();
    }

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Two decimals with thousands separators: `1,234.50`.
pub fn format_number(value: f64) -> String {
    with_commas(&format!("{value:.2}"))
}

/// `Area: 12.50 mm²` with calibrated spacing, `px²` otherwise.
pub fn format_area(area: f64, has_pixel_spacing: bool) -> String {
    let unit = if has_pixel_spacing { "mm\u{b2}" } else { "px\u{b2}" };
    format!("Area: {} {unit}", format_number(area))
}

/// Append spaces until `text` measures at least `target` wide.
fn pad_to(mut text: String, target: f64, measure: &dyn Fn(&str) -> f64) -> String {
    for _ in 0..MAX_PADDING {
        if measure(&text) >= target {
            break;
        }
        text.push(' ');
    }
    text
}

/// Label lines for a measurement's statistics.
///
/// Color images and measurements without statistics get no text. Paired
/// values are padded by measured width so the columns line up.
pub fn label_lines(
    stats: Option<&Stats>,
    info: &ImageInfo,
    config: &ToolConfig,
    measure: &dyn Fn(&str) -> f64,
) -> Vec<String> {
    let Some(stats) = stats else {
        return Vec::new();
    };
    if info.is_color {
        return Vec::new();
    }

    let suffix = if config.show_adjusted_units && info.modality() == Some(Modality::Ct) {
        " HU"
    } else {
        ""
    };
    let suv = stats
        .suv
        .filter(|suv| config.show_adjusted_units && suv.mean != 0.0);

    let mean = format!("Mean: {}{suffix}", format_number(stats.mean));
    let std_dev = format!("Std Dev: {}{suffix}", format_number(stats.std_dev));
    let std_dev_column = measure(&format!("{std_dev}{COLUMN_GAP}")).floor();

    let mut lines = Vec::with_capacity(3);
    let min_column = match suv {
        Some(suv) => {
            let mean = pad_to(mean, std_dev_column, measure);
            lines.push(format!("{mean} SUV: {}", format_number(suv.mean)));
            lines.push(format!("{std_dev}{COLUMN_GAP} SUV: {}", format_number(suv.std_dev)));
            std_dev_column
        }
        None => {
            let column = measure(&format!("{mean}{COLUMN_GAP}")).floor();
            lines.push(format!("{mean}{COLUMN_GAP}{std_dev}"));
            column
        }
    };

    if config.show_min_max {
        let min = pad_to(format!("Min: {}{suffix}", stats.min), min_column, measure);
        lines.push(format!("{min}Max: {}{suffix}", stats.max));
    }
    lines
}

/// Default label position in image coordinates, beside the bounds of
/// `start` and `end` on the side that reads naturally for the viewport.
pub fn default_text_box_position(viewport: &Viewport, start: Point, end: Point) -> Point {
    let bounds = Rect::from_points(start, end);
    let center = bounds.center();
    let rotation = viewport.rotation.rem_euclid(360.0);

    if rotation < 90.0 {
        let x = if viewport.hflip { bounds.x0 } else { bounds.x1 };
        Point::new(x, center.y)
    } else if rotation < 180.0 {
        let y = if viewport.vflip { bounds.y1 } else { bounds.y0 };
        Point::new(center.x, y)
    } else if rotation < 270.0 {
        let x = if viewport.hflip { bounds.x1 } else { bounds.x0 };
        Point::new(x, center.y)
    } else {
        let y = if viewport.vflip { bounds.y0 } else { bounds.y1 };
        Point::new(center.x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hipaxis_core::SuvStats;

    fn chars(text: &str) -> f64 {
        text.chars().count() as f64
    }

    fn stats(mean: f64, std_dev: f64) -> Stats {
        Stats {
            mean,
            std_dev,
            min: 1.0,
            max: 99.5,
            count: 16,
            ..Stats::default()
        }
    }

    #[test]
    fn test_commas() {
        assert_eq!(with_commas("1234567.891"), "1,234,567.891");
        assert_eq!(with_commas("123.40"), "123.40");
        assert_eq!(with_commas("-1234.00"), "-1,234.00");
        assert_eq!(with_commas("1000"), "1,000");
        assert_eq!(with_commas("NaN"), "NaN");
        assert_eq!(format_number(1234.5), "1,234.50");
        assert_eq!(format_number(0.0), "0.00");
    }

    #[test]
    fn test_format_area_units() {
        assert_eq!(format_area(1500.0, true), "Area: 1,500.00 mm\u{b2}");
        assert_eq!(format_area(12.0, false), "Area: 12.00 px\u{b2}");
    }

    #[test]
    fn test_plain_label() {
        let lines = label_lines(Some(&stats(42.0, 0.0)), &ImageInfo::default(), &ToolConfig::default(), &chars);
        assert_eq!(lines, vec!["Mean: 42.00     Std Dev: 0.00".to_string()]);
    }

    #[test]
    fn test_ct_suffix_follows_config() {
        let info = ImageInfo {
            modality: Some("CT".into()),
            ..Default::default()
        };
        let lines = label_lines(Some(&stats(-50.0, 3.0)), &info, &ToolConfig::default(), &chars);
        assert_eq!(lines[0], "Mean: -50.00 HU     Std Dev: 3.00 HU");

        let config = ToolConfig {
            show_adjusted_units: false,
            ..Default::default()
        };
        let lines = label_lines(Some(&stats(-50.0, 3.0)), &info, &config, &chars);
        assert_eq!(lines[0], "Mean: -50.00     Std Dev: 3.00");
    }

    #[test]
    fn test_suv_lines_align() {
        let mut s = stats(1200.0, 35.0);
        s.suv = Some(SuvStats { mean: 2.5, std_dev: 0.25 });
        let lines = label_lines(Some(&s), &ImageInfo::default(), &ToolConfig::default(), &chars);
        assert_eq!(lines.len(), 2);
        // "Std Dev: 35.00     " is 19 chars; the mean column is padded to it.
        assert_eq!(lines[0], "Mean: 1,200.00      SUV: 2.50");
        assert_eq!(lines[1], "Std Dev: 35.00      SUV: 0.25");
        assert_eq!(lines[0].find("SUV"), lines[1].find("SUV"));
    }

    #[test]
    fn test_zero_suv_is_hidden() {
        let mut s = stats(10.0, 1.0);
        s.suv = Some(SuvStats { mean: 0.0, std_dev: 0.0 });
        let lines = label_lines(Some(&s), &ImageInfo::default(), &ToolConfig::default(), &chars);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_suv_hidden_without_adjusted_units() {
        let mut s = stats(1200.0, 35.0);
        s.suv = Some(SuvStats { mean: 2.5, std_dev: 0.25 });
        let config = ToolConfig {
            show_adjusted_units: false,
            ..Default::default()
        };
        let lines = label_lines(Some(&s), &ImageInfo::default(), &config, &chars);
        assert_eq!(lines, vec!["Mean: 1,200.00     Std Dev: 35.00".to_string()]);
    }

    #[test]
    fn test_min_max_line() {
        let config = ToolConfig {
            show_min_max: true,
            ..Default::default()
        };
        let lines = label_lines(Some(&stats(42.0, 0.0)), &ImageInfo::default(), &config, &chars);
        assert_eq!(lines.len(), 2);
        // Padded to the width of "Mean: 42.00     ".
        assert_eq!(lines[1], "Min: 1          Max: 99.5");
        assert_eq!(lines[0].find("Std"), lines[1].find("Max"));
    }

    #[test]
    fn test_color_image_has_no_text() {
        let info = ImageInfo {
            is_color: true,
            ..Default::default()
        };
        assert!(label_lines(Some(&stats(1.0, 1.0)), &info, &ToolConfig::default(), &chars).is_empty());
        assert!(label_lines(None, &ImageInfo::default(), &ToolConfig::default(), &chars).is_empty());
    }

    #[test]
    fn test_zero_width_measurer_terminates() {
        let mut s = stats(1.0, 1.0);
        s.suv = Some(SuvStats { mean: 1.0, std_dev: 1.0 });
        let lines = label_lines(Some(&s), &ImageInfo::default(), &ToolConfig::default(), &|_: &str| 0.0);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_default_position_by_rotation() {
        let start = Point::new(10.0, 10.0);
        let end = Point::new(30.0, 20.0);
        let at = |rotation: f64, hflip: bool, vflip: bool| {
            default_text_box_position(&Viewport { rotation, hflip, vflip }, start, end)
        };
        assert_eq!(at(0.0, false, false), Point::new(30.0, 15.0));
        assert_eq!(at(0.0, true, false), Point::new(10.0, 15.0));
        assert_eq!(at(90.0, false, false), Point::new(20.0, 10.0));
        assert_eq!(at(90.0, false, true), Point::new(20.0, 20.0));
        assert_eq!(at(180.0, false, false), Point::new(10.0, 15.0));
        assert_eq!(at(270.0, false, false), Point::new(20.0, 20.0));
        assert_eq!(at(-90.0, false, false), Point::new(20.0, 20.0));
    }
}
