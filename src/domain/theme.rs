/// Theme registry: the static catalog of colour palettes.
///
/// `default` is always owned; every other theme is unlocked through the shop.
/// Colours are plain RGB triples so the domain layer stays renderer-agnostic.

pub const DEFAULT_THEME: &str = "default";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub bg: Rgb,
    pub primary: Rgb,
    pub secondary: Rgb,
    pub tile_lit: Rgb,
    pub text: Rgb,
}

pub const THEMES: &[Theme] = &[
    Theme {
        id: DEFAULT_THEME,
        name: "Farcaster",
        bg: Rgb(0x02, 0x06, 0x17),
        primary: Rgb(0x7c, 0x3a, 0xed),
        secondary: Rgb(0xa8, 0x55, 0xf7),
        tile_lit: Rgb(0xa8, 0x55, 0xf7),
        text: Rgb(0xe5, 0xe7, 0xeb),
    },
    Theme {
        id: "theme_neon",
        name: "Neon",
        bg: Rgb(0x00, 0x00, 0x00),
        primary: Rgb(0x00, 0xff, 0x00),
        secondary: Rgb(0x39, 0xff, 0x14),
        tile_lit: Rgb(0x39, 0xff, 0x14),
        text: Rgb(0xbb, 0xf7, 0xd0),
    },
    Theme {
        id: "theme_ocean",
        name: "Ocean",
        bg: Rgb(0x0f, 0x17, 0x2a),
        primary: Rgb(0x0e, 0xa5, 0xe9),
        secondary: Rgb(0x38, 0xbd, 0xf8),
        tile_lit: Rgb(0x38, 0xbd, 0xf8),
        text: Rgb(0xe0, 0xf2, 0xfe),
    },
    Theme {
        id: "theme_fire",
        name: "Fire",
        bg: Rgb(0x1c, 0x19, 0x17),
        primary: Rgb(0xea, 0x58, 0x0c),
        secondary: Rgb(0xf9, 0x73, 0x16),
        tile_lit: Rgb(0xef, 0x44, 0x44),
        text: Rgb(0xff, 0xed, 0xd5),
    },
    Theme {
        id: "theme_nature",
        name: "Nature",
        bg: Rgb(0x02, 0x2c, 0x22),
        primary: Rgb(0x16, 0xa3, 0x4a),
        secondary: Rgb(0x4a, 0xde, 0x80),
        tile_lit: Rgb(0x22, 0xc5, 0x5e),
        text: Rgb(0xdc, 0xfc, 0xe7),
    },
    Theme {
        id: "theme_space",
        name: "Space",
        bg: Rgb(0x02, 0x06, 0x17),
        primary: Rgb(0x63, 0x66, 0xf1),
        secondary: Rgb(0x81, 0x8c, 0xf8),
        tile_lit: Rgb(0x81, 0x8c, 0xf8),
        text: Rgb(0xe0, 0xe7, 0xff),
    },
];

/// Look up a theme by identifier. Unknown ids yield `None`.
pub fn lookup(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.id == id)
}

/// The default theme. Always present in `THEMES`.
pub fn default_theme() -> &'static Theme {
    &THEMES[0]
}

/// Resolve a theme id, falling back to the default palette.
pub fn resolve(id: &str) -> &'static Theme {
    lookup(id).unwrap_or_else(default_theme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_first_and_resolvable() {
        assert_eq!(default_theme().id, DEFAULT_THEME);
        assert_eq!(lookup(DEFAULT_THEME).map(|t| t.name), Some("Farcaster"));
    }

    #[test]
    fn unknown_theme_falls_back() {
        assert!(lookup("theme_lava").is_none());
        assert_eq!(resolve("theme_lava").id, DEFAULT_THEME);
    }

    #[test]
    fn ids_are_unique() {
        for (i, a) in THEMES.iter().enumerate() {
            for b in &THEMES[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }
}
