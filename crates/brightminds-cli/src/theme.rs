use ratatui::style::Color;

#[derive(Clone)]
pub struct Theme {
    pub name: &'static str,
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub error: Color,
    pub user_color: Color,
    pub assistant_color: Color,
    pub border: Color,
    pub widget_bg: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            bg: Color::Rgb(3, 7, 18),
            fg: Color::Rgb(229, 231, 235),
            accent: Color::Rgb(59, 130, 246),
            muted: Color::Rgb(107, 114, 128),
            error: Color::Rgb(248, 113, 113),
            user_color: Color::Rgb(147, 197, 253),
            assistant_color: Color::Rgb(229, 231, 235),
            border: Color::Rgb(31, 41, 55),
            widget_bg: Color::Rgb(17, 24, 39),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            bg: Color::Rgb(249, 250, 251),
            fg: Color::Rgb(17, 24, 39),
            accent: Color::Rgb(37, 99, 235),
            muted: Color::Rgb(75, 85, 99),
            error: Color::Rgb(220, 38, 38),
            user_color: Color::Rgb(30, 58, 138),
            assistant_color: Color::Rgb(17, 24, 39),
            border: Color::Rgb(229, 231, 235),
            widget_bg: Color::Rgb(255, 255, 255),
        }
    }

    pub fn by_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn all_names() -> Vec<&'static str> {
        vec!["dark", "light"]
    }

    /// The other palette, for the dark/light toggle.
    pub fn toggled(&self) -> Self {
        match self.name {
            "light" => Self::dark(),
            _ => Self::light(),
        }
    }
}
