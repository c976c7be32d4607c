use std::fmt;
use std::str::FromStr;

use super::model::{Department, WorkflowStep};

/// Who is looking at a ticket. Supplied by the caller, never verified here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Viewer {
    Admin,
    Department(Department),
}

impl fmt::Display for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Viewer::Admin => write!(f, "Admin"),
            Viewer::Department(d) => write!(f, "{d}"),
        }
    }
}

impl FromStr for Viewer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("admin") {
            return Ok(Viewer::Admin);
        }
        s.parse::<Department>()
            .map(Viewer::Department)
            .map_err(|_| format!("unknown role: {s} (expected Admin or a department)"))
    }
}

/// What a viewer may see and do with one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub show_details: bool,
    pub can_interact: bool,
}

/// Owners (and admins) see their steps; everyone sees the current step; only
/// owners act, and only on the current step.
pub fn visibility(step: &WorkflowStep, current_step_id: Option<&str>, viewer: Viewer) -> Visibility {
    let is_owner = match viewer {
        Viewer::Admin => true,
        Viewer::Department(d) => d == step.department,
    };
    let is_current = current_step_id == Some(step.id.as_str());
    Visibility {
        show_details: is_owner || is_current,
        can_interact: is_owner && is_current,
    }
}
