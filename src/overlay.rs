//! Info panel for the followed body.
//!
//! The panel is four lines of text (name, mean orbital speed, mass, surface
//! gravity) pushed through a [`TextOverlay`]. Glyph rendering is the overlay's
//! business; [`TitleOverlay`] is the simple one the viewer uses, which shows
//! the lines in the window title.

use crate::bodies::BodyDefinition;

/// Anything that can put a line of text on screen.
pub trait TextOverlay {
    /// Draw `text` with its top-left corner at pixel `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, scale: f32, color: [f32; 3]);
}

/// Layout of the four-line panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfoPanel {
    pub x: f32,
    pub y: f32,
    pub line_height: f32,
    pub scale: f32,
    pub color: [f32; 3],
}

impl Default for InfoPanel {
    fn default() -> Self {
        Self {
            x: 10.0,
            y: 10.0,
            line_height: 24.0,
            scale: 1.0,
            color: [1.0, 1.0, 1.0],
        }
    }
}

impl InfoPanel {
    /// Panel text for `body`.
    pub fn lines(body: &BodyDefinition) -> [String; 4] {
        let info = &body.info;
        [
            body.name.to_string(),
            format!("Mean orbital speed: {:.2} km/s", info.mean_orbital_speed),
            format!("Mass: {:.3e} kg", info.mass),
            format!("Surface gravity: {:.2} m/s²", info.surface_gravity),
        ]
    }

    pub fn draw<O: TextOverlay + ?Sized>(&self, body: &BodyDefinition, overlay: &mut O) {
        for (row, line) in Self::lines(body).iter().enumerate() {
            let y = self.y + row as f32 * self.line_height;
            overlay.draw_text(line, self.x, y, self.scale, self.color);
        }
    }
}

/// Collects the lines drawn in a frame and turns them into a window title.
#[derive(Debug, Default)]
pub struct TitleOverlay {
    lines: Vec<String>,
}

impl TitleOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Title for this frame: `base`, followed by any drawn lines. Clears the
    /// collected lines.
    pub fn take_title(&mut self, base: &str) -> String {
        if self.lines.is_empty() {
            return base.to_string();
        }
        let title = format!("{} | {}", base, self.lines.join(" | "));
        self.lines.clear();
        title
    }
}

impl TextOverlay for TitleOverlay {
    fn draw_text(&mut self, text: &str, _x: f32, _y: f32, _scale: f32, _color: [f32; 3]) {
        self.lines.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::{BodyId, SOLAR_SYSTEM};

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(String, f32, f32)>,
    }

    impl TextOverlay for Recorder {
        fn draw_text(&mut self, text: &str, x: f32, y: f32, _scale: f32, _color: [f32; 3]) {
            self.calls.push((text.to_string(), x, y));
        }
    }

    #[test]
    fn test_earth_panel() {
        let earth = &SOLAR_SYSTEM[BodyId::EARTH.index()];
        let lines = InfoPanel::lines(earth);
        assert_eq!(lines[0], "Earth");
        assert!(lines[1].contains("29.78 km/s"));
        assert!(lines[2].starts_with("Mass: 5.972e24"));
        assert!(lines[3].contains("9.81"));
    }

    #[test]
    fn test_lines_stack_downward() {
        let mut rec = Recorder::default();
        InfoPanel::default().draw(&SOLAR_SYSTEM[BodyId::MARS.index()], &mut rec);
        assert_eq!(rec.calls.len(), 4);
        assert_eq!(rec.calls[0].0, "Mars");
        assert_eq!((rec.calls[0].1, rec.calls[0].2), (10.0, 10.0));
        assert_eq!(rec.calls[3].2, 10.0 + 3.0 * 24.0);
    }

    #[test]
    fn test_title_overlay() {
        let mut overlay = TitleOverlay::new();
        assert_eq!(overlay.take_title("Solarium"), "Solarium");

        overlay.draw_text("Moon", 0.0, 0.0, 1.0, [1.0; 3]);
        overlay.draw_text("Mass: 7.342e22 kg", 0.0, 0.0, 1.0, [1.0; 3]);
        assert_eq!(overlay.take_title("Solarium"), "Solarium | Moon | Mass: 7.342e22 kg");
        assert_eq!(overlay.take_title("Solarium"), "Solarium");
    }
}
