use colored::{Color, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// What a piece of output means; the theme picks its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Heading,
    Accent,
    Success,
    Failure,
    Muted,
}

impl Theme {
    fn color(self, role: Role) -> Color {
        match (self, role) {
            (_, Role::Success) => Color::Green,
            (_, Role::Failure) => Color::Red,
            (Theme::Light, Role::Heading) => Color::Blue,
            (Theme::Dark, Role::Heading) => Color::BrightCyan,
            (Theme::Light, Role::Accent) => Color::Magenta,
            (Theme::Dark, Role::Accent) => Color::BrightMagenta,
            (Theme::Light, Role::Muted) => Color::BrightBlack,
            (Theme::Dark, Role::Muted) => Color::White,
        }
    }
}

/// Presentation settings handed to every renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderConfig {
    pub color: bool,
    pub theme: Theme,
}

impl RenderConfig {
    #[cfg(test)]
    pub fn plain() -> Self {
        Self {
            color: false,
            theme: Theme::default(),
        }
    }

    pub fn paint(&self, text: &str, role: Role) -> String {
        if !self.color {
            return text.to_string();
        }
        let painted = text.color(self.theme.color(role));
        match role {
            Role::Heading | Role::Failure => painted.bold().to_string(),
            _ => painted.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_config_leaves_text_untouched() {
        let config = RenderConfig::plain();
        assert_eq!(config.paint("Pages", Role::Heading), "Pages");
    }

    #[test]
    fn themes_differ_only_in_neutral_roles() {
        assert_eq!(
            Theme::Light.color(Role::Success),
            Theme::Dark.color(Role::Success)
        );
        assert_ne!(
            Theme::Light.color(Role::Heading),
            Theme::Dark.color(Role::Heading)
        );
    }
}
