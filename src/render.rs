//! Plain-text views for the command line.

use crate::assignment::AssignmentResult;
use crate::roster::{Dance, Dancer, DancerId, Preference, PreferenceEdge, Role};
use owo_colors::OwoColorize;
use std::collections::HashMap;
use std::fmt;

/// Colours dancer names by preference tier, or leaves them plain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Favourite is bold magenta, yes green, maybe yellow, no red.
    pub fn paint(&self, text: &str, preference: Preference) -> String {
        if !self.enabled {
            return text.to_string();
        }
        match preference {
            Preference::Favourite => text.magenta().bold().to_string(),
            Preference::Yes => text.green().to_string(),
            Preference::Maybe => text.yellow().to_string(),
            Preference::Forbidden => text.red().to_string(),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(true)
    }
}

/// The `dance-set` view: each performed dance followed by its lineup,
/// dancers coloured by the tier they gave their position.
///
/// With a plain palette this matches the result's own `Display` output.
#[derive(Debug, Clone, Copy)]
pub struct DanceSet<'a> {
    pub result: &'a AssignmentResult,
    pub palette: Palette,
}

impl fmt::Display for DanceSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.result.performed_count() == 0 {
            return writeln!(f, "Can't dance any dances");
        }
        for dance in self.result.performed_dances() {
            writeln!(f, "{}", dance.name)?;
            for placement in self.result.lineup(dance.id) {
                writeln!(
                    f,
                    "{}: {}",
                    placement.position.name,
                    self.palette.paint(&placement.dancer.name, placement.preference)
                )?;
            }
        }
        Ok(())
    }
}

/// The `list-dances` view.
///
/// Every dance gets a header line. Under it, each position lists the
/// dancers willing to take it, in edge order. Positions nobody is willing
/// to take are skipped.
#[derive(Debug, Clone, Copy)]
pub struct DanceList<'a> {
    pub dances: &'a [Dance],
    pub dancers: &'a [Dancer],
    pub edges: &'a [PreferenceEdge],
    pub palette: Palette,
}

impl fmt::Display for DanceList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: HashMap<DancerId, &str> = self
            .dancers
            .iter()
            .map(|d| (d.id, d.name.as_str()))
            .collect();

        for dance in self.dances {
            writeln!(f, "Dance: {}", dance.name)?;
            for position in &dance.positions {
                let willing: Vec<String> = self
                    .edges
                    .iter()
                    .filter(|e| e.dance == dance.id && e.position == position.id)
                    .filter(|e| e.preference.is_assignable())
                    .filter_map(|e| {
                        names
                            .get(&e.dancer)
                            .map(|name| self.palette.paint(name, e.preference))
                    })
                    .collect();
                if willing.is_empty() {
                    continue;
                }
                writeln!(f, " {}: {}", position.name, willing.join(", "))?;
            }
        }
        Ok(())
    }
}

fn role_badge(role: Role) -> &'static str {
    match role {
        Role::Dancer => "💃",
        Role::Musician => "🎵",
        Role::Both => "💃🎵",
    }
}

/// The `list-active-dancers` view: one comma-separated line.
#[derive(Debug, Clone, Copy)]
pub struct ActiveDancers<'a>(pub &'a [Dancer]);

impl fmt::Display for ActiveDancers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dancer) in self.0.iter().filter(|d| d.active).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} ({})", dancer.name, role_badge(dancer.role))?;
        }
        writeln!(f)
    }
}

pub fn render_dance_set(result: &AssignmentResult, palette: Palette) -> String {
    DanceSet { result, palette }.to_string()
}

pub fn render_dance_list(
    dances: &[Dance],
    dancers: &[Dancer],
    edges: &[PreferenceEdge],
    palette: Palette,
) -> String {
    DanceList {
        dances,
        dancers,
        edges,
        palette,
    }
    .to_string()
}

pub fn render_active_dancers(dancers: &[Dancer]) -> String {
    ActiveDancers(dancers).to_string()
}
