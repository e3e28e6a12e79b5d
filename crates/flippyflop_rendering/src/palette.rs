//! Team color palette.
//!
//! Colors are linear RGBA floats, ready to drop into instance data.

use flippyflop_shared::Team;

use crate::error::{RenderError, RenderResult};

/// RGBA color.
pub type Color = [f32; 4];

/// Default palette: one color per team, indexed by team id.
const DEFAULT_TEAMS: [&str; 6] = ["#EF4444", "#3B82F6", "#22C55E", "#EAB308", "#A855F7", "#F97316"];

/// Default color of tiles nobody owns.
const DEFAULT_UNOWNED: &str = "#6B7280";

/// Maps teams to display colors.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamPalette {
    unowned: Color,
    teams: Vec<Color>,
}

impl TeamPalette {
    /// Creates a palette from resolved colors.
    #[must_use]
    pub fn new(unowned: Color, teams: Vec<Color>) -> Self {
        Self { unowned, teams }
    }

    /// Parses a palette from hex strings.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidColor`] for the first entry that fails
    /// to parse.
    pub fn from_hex<S: AsRef<str>>(unowned: &str, teams: &[S]) -> RenderResult<Self> {
        let unowned = parse_hex_color(unowned)?;
        let teams = teams
            .iter()
            .map(|hex| parse_hex_color(hex.as_ref()))
            .collect::<RenderResult<Vec<_>>>()?;
        Ok(Self { unowned, teams })
    }

    /// Color for an optional team. Unknown team ids fall back to the
    /// unowned color.
    #[inline]
    #[must_use]
    pub fn color(&self, team: Option<Team>) -> Color {
        team.and_then(|t| self.teams.get(t.index()).copied())
            .unwrap_or(self.unowned)
    }

    /// Color of unowned tiles.
    #[inline]
    #[must_use]
    pub const fn unowned(&self) -> Color {
        self.unowned
    }

    /// Number of team colors.
    #[inline]
    #[must_use]
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }
}

impl Default for TeamPalette {
    fn default() -> Self {
        let teams = DEFAULT_TEAMS
            .iter()
            .filter_map(|hex| parse_hex_color(hex).ok())
            .collect();
        let unowned = parse_hex_color(DEFAULT_UNOWNED).unwrap_or([0.42, 0.45, 0.5, 1.0]);
        Self { unowned, teams }
    }
}

/// Parses `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
///
/// # Errors
///
/// Returns [`RenderError::InvalidColor`] on bad length or digits.
pub fn parse_hex_color(hex: &str) -> RenderResult<Color> {
    let digits = hex.trim().trim_start_matches('#');
    if !(digits.len() == 6 || digits.len() == 8) || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RenderError::InvalidColor(hex.to_string()));
    }

    let mut color = [1.0; 4];
    for (i, channel) in color.iter_mut().enumerate().take(digits.len() / 2) {
        let byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
            .map_err(|_| RenderError::InvalidColor(hex.to_string()))?;
        *channel = f32::from(byte) / 255.0;
    }
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex_color("#FF0000").unwrap(), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(parse_hex_color("00ff0080").unwrap()[3], 128.0 / 255.0);
        assert!(parse_hex_color("#FFF").is_err());
        assert!(parse_hex_color("#GG0000").is_err());
    }

    #[test]
    fn test_default_palette_has_six_teams() {
        let palette = TeamPalette::default();
        assert_eq!(palette.team_count(), 6);
        assert_ne!(palette.color(Some(Team(0))), palette.unowned());
    }

    #[test]
    fn test_unknown_team_falls_back() {
        let palette = TeamPalette::from_hex("#000000", &["#FFFFFF"]).unwrap();
        assert_eq!(palette.color(Some(Team(5))), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(palette.color(None), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(palette.color(Some(Team(0))), [1.0, 1.0, 1.0, 1.0]);
    }
}
