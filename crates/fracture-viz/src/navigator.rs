//! Fragment browsing for interactive visualization.

use macroquad::prelude::*;

use crate::FragmentView;

/// Which fragments are on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    All,
    Single(usize),
}

/// Steps through fragments one at a time and controls the exploded view.
pub struct FragmentNavigator {
    selection: Selection,
    explode: f32,
    outline: bool,
}

impl Default for FragmentNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentNavigator {
    pub fn new() -> Self {
        Self {
            selection: Selection::All,
            explode: 0.3,
            outline: true,
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Separation factor: 0 shows the fragments reassembled.
    pub fn explode(&self) -> f32 {
        self.explode
    }

    /// Selects the next fragment, wrapping around to "all" after the last.
    pub fn next(&mut self, count: usize) {
        self.selection = match self.selection {
            _ if count == 0 => Selection::All,
            Selection::All => Selection::Single(0),
            Selection::Single(i) if i + 1 < count => Selection::Single(i + 1),
            Selection::Single(_) => Selection::All,
        };
    }

    /// Selects the previous fragment, wrapping around to "all" before the first.
    pub fn previous(&mut self, count: usize) {
        self.selection = match self.selection {
            _ if count == 0 => Selection::All,
            Selection::All => Selection::Single(count - 1),
            Selection::Single(0) => Selection::All,
            Selection::Single(i) => Selection::Single(i - 1),
        };
    }

    /// Drops a selection that no longer exists after a refracture.
    pub fn clamp(&mut self, count: usize) {
        if let Selection::Single(i) = self.selection {
            if i >= count {
                self.selection = Selection::All;
            }
        }
    }

    /// Handles keyboard input. Returns true if the view changed.
    pub fn update(&mut self, count: usize) -> bool {
        let before = (self.selection, self.explode, self.outline);

        if is_key_pressed(KeyCode::N) {
            self.next(count);
        }
        if is_key_pressed(KeyCode::P) {
            self.previous(count);
        }
        if is_key_pressed(KeyCode::A) {
            self.selection = Selection::All;
        }
        if is_key_pressed(KeyCode::O) {
            self.outline = !self.outline;
        }
        if is_key_down(KeyCode::E) {
            self.explode = (self.explode + 0.01).min(3.0);
        }
        if is_key_down(KeyCode::Q) {
            self.explode = (self.explode - 0.01).max(0.0);
        }

        before != (self.selection, self.explode, self.outline)
    }

    /// Draws the selected fragments exploded around `origin`.
    pub fn render(&self, views: &[FragmentView], origin: Vec3) {
        match self.selection {
            Selection::All => {
                for view in views {
                    view.draw(origin, self.explode, self.outline);
                }
            }
            Selection::Single(i) => {
                if let Some(view) = views.get(i) {
                    view.draw(origin, self.explode, self.outline);
                }
            }
        }
    }

    /// Draws the selection overlay.
    pub fn draw_ui(&self, views: &[FragmentView], y_offset: f32) {
        match self.selection.single().and_then(|i| views.get(i).map(|v| (i, v))) {
            Some((i, view)) => {
                draw_text(
                    &format!("Fragment {}/{}: {}", i + 1, views.len(), view.name),
                    10.0,
                    y_offset,
                    18.0,
                    view.color,
                );
                draw_text(
                    &format!(
                        "{} polygons | volume {:.4}",
                        view.mesh.polygon_count(),
                        view.volume
                    ),
                    10.0,
                    y_offset + 20.0,
                    18.0,
                    WHITE,
                );
            }
            None => {
                let total: f64 = views.iter().map(|v| v.volume).sum();
                draw_text(
                    &format!("All {} fragments", views.len()),
                    10.0,
                    y_offset,
                    18.0,
                    YELLOW,
                );
                draw_text(
                    &format!("total volume {total:.4}"),
                    10.0,
                    y_offset + 20.0,
                    18.0,
                    WHITE,
                );
            }
        }
        draw_text(
            &format!(
                "[N]ext | [P]revious | [A]ll | [O]utline | explode {:.2} [E]/[Q]",
                self.explode
            ),
            10.0,
            y_offset + 40.0,
            16.0,
            DARKGRAY,
        );
    }
}

impl Selection {
    fn single(self) -> Option<usize> {
        match self {
            Selection::All => None,
            Selection::Single(i) => Some(i),
        }
    }
}
