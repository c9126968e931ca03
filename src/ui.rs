// src/ui.rs
use iced::{Color, Length};
use once_cell::sync::Lazy;

use crate::config::Tag;

/// Resolved colors the view draws with, after applying tag overrides on top
/// of the default theme.
#[derive(Debug, Clone)]
pub struct Styles {
    pub text: Color,
    pub background: Color,
    pub progress_bar: Color,
    pub footer_bg: Color,
    pub footer_fg: Color,
    pub pagination_active_bg: Color,
    pub pagination_active_fg: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub positive: Color,
    pub negative: Color,
    pub dark_shadow: bool,
}

pub static DEFAULT_THEME: Lazy<Styles> = Lazy::new(|| Styles {
    text: Color::from_rgb(0.13, 0.13, 0.13),
    background: Color::WHITE,
    progress_bar: Color::from_rgb(0.0941, 0.5647, 0.7451), // #1890be
    footer_bg: Color::from_rgb(1.0, 0.9255, 0.9216),       // #ffeceb
    footer_fg: Color::from_rgb(0.13, 0.13, 0.13),
    pagination_active_bg: Color::from_rgb(0.8941, 0.4706, 0.4471), // #e47872
    pagination_active_fg: Color::WHITE,
    header_bg: Color::from_rgb(1.0, 0.9255, 0.9216), // #ffeceb
    header_fg: Color::from_rgb(0.13, 0.13, 0.13),
    positive: Color::from_rgb(0.0, 0.6, 0.2),
    negative: Color::from_rgb(0.8, 0.1, 0.1),
    dark_shadow: false,
});

/// The tag a fresh widget starts with, mirroring the default theme.
pub fn default_tag() -> Tag {
    Tag {
        progress_background_color: Some("#1890be".to_string()),
        footer_background_color: Some("#ffeceb".to_string()),
        pagination_active_background_color: Some("#e47872".to_string()),
        header_background_color: Some("#ffeceb".to_string()),
        height: Some(500.0),
        dark_shadow: Some(false),
        ..Tag::default()
    }
}

/// Apply the tag to the default theme. Text and background follow the
/// inheritance rule: an explicit custom color wins over a color inherited
/// from the parent, which wins over the theme default. The remaining colors
/// are plain overrides.
pub fn resolve_styles(tag: &Tag) -> Styles {
    let mut styles = DEFAULT_THEME.clone();

    if tag.custom_font_color == Some(true) {
        apply_color(&mut styles.text, tag.font_color.as_deref());
    } else if tag.parent_custom_font_color == Some(true) {
        apply_color(&mut styles.text, tag.parent_font_color.as_deref());
    }
    if tag.custom_background_color == Some(true) {
        apply_color(&mut styles.background, tag.background_color.as_deref());
    } else if tag.parent_custom_background_color == Some(true) {
        apply_color(&mut styles.background, tag.parent_background_color.as_deref());
    }

    apply_color(&mut styles.progress_bar, tag.progress_background_color.as_deref());
    apply_color(&mut styles.footer_bg, tag.footer_background_color.as_deref());
    apply_color(&mut styles.footer_fg, tag.footer_font_color.as_deref());
    apply_color(
        &mut styles.pagination_active_bg,
        tag.pagination_active_background_color.as_deref(),
    );
    apply_color(
        &mut styles.pagination_active_fg,
        tag.pagination_active_font_color.as_deref(),
    );
    apply_color(&mut styles.header_bg, tag.header_background_color.as_deref());
    apply_color(&mut styles.header_fg, tag.header_font_color.as_deref());
    styles.dark_shadow = tag.dark_shadow.unwrap_or(false);

    styles
}

/// Panel width from the tag: fixed when the tag sets one, fill otherwise.
pub fn panel_width(tag: &Tag) -> Length {
    match tag.width {
        Some(width) => Length::Fixed(width),
        None => Length::Fill,
    }
}

fn apply_color(slot: &mut Color, value: Option<&str>) {
    if let Some(color) = value.and_then(parse_hex) {
        *slot = color;
    }
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` hex colors.
pub fn parse_hex(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let (r, g, b) = (nibble(0)?, nibble(1)?, nibble(2)?);
            Some(Color::from_rgb8(r * 17, g * 17, b * 17))
        }
        6 => Some(Color::from_rgb8(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::from_rgba8(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            byte(6)? as f32 / 255.0,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex("#fff"), Some(Color::from_rgb8(255, 255, 255)));
        assert_eq!(parse_hex("#e47872"), Some(Color::from_rgb8(228, 120, 114)));
        assert!(parse_hex("#e47872ff").is_some());
        assert_eq!(parse_hex("e47872"), None);
        assert_eq!(parse_hex("#zzz"), None);
    }

    #[test]
    fn custom_color_wins_over_parent() {
        let tag = Tag {
            font_color: Some("#111111".to_string()),
            custom_font_color: Some(true),
            parent_font_color: Some("#eeeeee".to_string()),
            parent_custom_font_color: Some(true),
            ..Tag::default()
        };
        let styles = resolve_styles(&tag);
        assert_eq!(styles.text, Color::from_rgb8(0x11, 0x11, 0x11));
    }

    #[test]
    fn parent_color_wins_over_default() {
        let tag = Tag {
            font_color: Some("#111111".to_string()),
            custom_font_color: Some(false),
            parent_font_color: Some("#eeeeee".to_string()),
            parent_custom_font_color: Some(true),
            ..Tag::default()
        };
        let styles = resolve_styles(&tag);
        assert_eq!(styles.text, Color::from_rgb8(0xee, 0xee, 0xee));
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let styles = resolve_styles(&Tag::default());
        assert_eq!(styles.text, DEFAULT_THEME.text);
        assert_eq!(styles.header_bg, DEFAULT_THEME.header_bg);
        assert!(!styles.dark_shadow);
    }

    #[test]
    fn tag_width_fixes_panel_width() {
        assert_eq!(panel_width(&Tag::default()), Length::Fill);
        let tag = Tag {
            width: Some(700.0),
            ..Tag::default()
        };
        assert_eq!(panel_width(&tag), Length::Fixed(700.0));
    }

    #[test]
    fn plain_overrides_apply() {
        let tag = Tag {
            header_background_color: Some("#222222".to_string()),
            dark_shadow: Some(true),
            ..Tag::default()
        };
        let styles = resolve_styles(&tag);
        assert_eq!(styles.header_bg, Color::from_rgb8(0x22, 0x22, 0x22));
        assert!(styles.dark_shadow);
    }
}
