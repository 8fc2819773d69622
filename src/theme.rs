use std::str::FromStr;

use tuirealm::ratatui::style::Color;

/// Light/dark presentation flag. Persisted as `"light"` or `"dark"`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Anything other than an exact `"dark"` reads back as light.
    pub fn from_stored(raw: &str) -> Self {
        if raw == "dark" { Self::Dark } else { Self::Light }
    }
}

impl FromStr for ThemeMode {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" | "day" => Ok(Self::Light),
            "dark" | "night" => Ok(Self::Dark),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub base: BasePalette,
    pub interactive: InteractivePalette,
    pub tile: TilePalette,
}

#[derive(Debug, Clone, Copy)]
pub struct BasePalette {
    pub canvas: Color,
    pub surface: Color,
    pub text: Color,
    pub text_muted: Color,
    pub header: Color,
    pub accent: Color,
    pub danger: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct InteractivePalette {
    pub focus: Color,
    pub border: Color,
    pub drop_target: Color,
    pub input_bg: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct TilePalette {
    pub background: Color,
    pub border: Color,
    pub placeholder: Color,
    pub overlay_bg: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct TileStateColors {
    pub background: Color,
    pub border: Color,
}

impl Theme {
    pub fn from_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self {
                base: BasePalette {
                    canvas: Color::Rgb(243, 244, 246),
                    surface: Color::Rgb(229, 231, 235),
                    text: Color::Rgb(31, 41, 55),
                    text_muted: Color::Rgb(107, 114, 128),
                    header: Color::Rgb(17, 24, 39),
                    accent: Color::Rgb(37, 99, 235),
                    danger: Color::Rgb(220, 38, 38),
                },
                interactive: InteractivePalette {
                    focus: Color::Rgb(37, 99, 235),
                    border: Color::Rgb(209, 213, 219),
                    drop_target: Color::Rgb(59, 130, 246),
                    input_bg: Color::Rgb(255, 255, 255),
                },
                tile: TilePalette {
                    background: Color::Rgb(255, 255, 255),
                    border: Color::Rgb(209, 213, 219),
                    placeholder: Color::Rgb(59, 130, 246),
                    overlay_bg: Color::Rgb(255, 255, 255),
                },
            },
            ThemeMode::Dark => Self {
                base: BasePalette {
                    canvas: Color::Rgb(17, 24, 39),
                    surface: Color::Rgb(31, 41, 55),
                    text: Color::Rgb(229, 231, 235),
                    text_muted: Color::Rgb(156, 163, 175),
                    header: Color::Rgb(243, 244, 246),
                    accent: Color::Rgb(96, 165, 250),
                    danger: Color::Rgb(239, 68, 68),
                },
                interactive: InteractivePalette {
                    focus: Color::Rgb(96, 165, 250),
                    border: Color::Rgb(55, 65, 81),
                    drop_target: Color::Rgb(59, 130, 246),
                    input_bg: Color::Rgb(55, 65, 81),
                },
                tile: TilePalette {
                    background: Color::Rgb(55, 65, 81),
                    border: Color::Rgb(75, 85, 99),
                    placeholder: Color::Rgb(59, 130, 246),
                    overlay_bg: Color::Rgb(55, 65, 81),
                },
            },
        }
    }

    /// Colors for a card tile; the dragged card stays in place as an outlined
    /// placeholder.
    pub fn tile_colors(&self, placeholder: bool) -> TileStateColors {
        if placeholder {
            TileStateColors {
                background: self.base.surface,
                border: self.tile.placeholder,
            }
        } else {
            TileStateColors {
                background: self.tile.background,
                border: self.tile.border,
            }
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_mode(ThemeMode::default())
    }
}
