//! Data shapes for an offboarding ticket: its fixed step sequence and its
//! append-only activity ledger.
//!
//! Everything here serialises to a single JSON document (camelCase keys,
//! ISO-8601 timestamps) so a ticket can be handed to any document store as is.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a whole ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Active,
    Completed,
    Archived,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketStatus::Active => write!(f, "active"),
            TicketStatus::Completed => write!(f, "completed"),
            TicketStatus::Archived => write!(f, "archived"),
        }
    }
}

/// Lifecycle of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Skipped,
}

impl StepStatus {
    /// `Completed` and `Skipped` are final.
    pub fn is_done(self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Skipped)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::InProgress => write!(f, "in_progress"),
            StepStatus::Completed => write!(f, "completed"),
            StepStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// The organisational unit that owns a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "OSI")]
    Osi,
    #[serde(rename = "ABC")]
    Abc,
    #[serde(rename = "GFS")]
    Gfs,
    Manager,
    NewHolder,
    #[serde(rename = "MD")]
    Md,
    System,
}

impl Department {
    pub const ALL: [Department; 7] = [
        Department::Osi,
        Department::Abc,
        Department::Gfs,
        Department::Manager,
        Department::NewHolder,
        Department::Md,
        Department::System,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Department::Osi => "OSI",
            Department::Abc => "ABC",
            Department::Gfs => "GFS",
            Department::Manager => "Manager",
            Department::NewHolder => "NewHolder",
            Department::Md => "MD",
            Department::System => "System",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown department: {s}"))
    }
}

/// How a human interacts with a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Manual,
    EmailDraft,
    Input,
    Approval,
}

/// The nine email drafts the generation service knows how to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplate {
    ManagerNotifyOsi,
    GfsRetire,
    ManagerReplacementReq,
    VerificationCatering,
    AbcMgrDelegates,
    MdApproval,
    GfsConfig,
    TrainingConfirmation,
    DelegateTrainingConfirmation,
}

/// Ticket attribute filled from a step's input when that step completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapturedField {
    ReplacementName,
    CateringConfirmed,
}

/// One unit of work owned by exactly one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    pub id: String,
    pub title: String,
    pub description: String,
    pub department: Department,
    pub status: StepStatus,
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_template: Option<EmailTemplate>,
    #[serde(default)]
    pub requires_input: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captures: Option<CapturedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowStep {
    /// Label shown next to the input box, falling back to a generic one.
    pub fn input_label_or_default(&self) -> &str {
        self.input_label.as_deref().unwrap_or("Required Information")
    }

    /// The captured value, if any non-blank one was entered.
    pub fn filled_input(&self) -> Option<&str> {
        self.input_value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
    }
}

/// What kind of thing a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TicketCreated,
    StepCompleted,
    EmailSent,
    InputLogged,
    StatusChange,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::TicketCreated => write!(f, "ticket_created"),
            EventKind::StepCompleted => write!(f, "step_completed"),
            EventKind::EmailSent => write!(f, "email_sent"),
            EventKind::InputLogged => write!(f, "input_logged"),
            EventKind::StatusChange => write!(f, "status_change"),
        }
    }
}

/// Snapshot data attached to a ledger entry. Email bodies are copies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_cc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
}

/// Immutable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

/// One offboarding case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub employee_name: String,
    pub manager_name: String,
    pub external_ref_id: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: TicketStatus,
    pub current_step_index: usize,
    pub steps: Vec<WorkflowStep>,
    pub history: Vec<HistoryEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catering_confirmed: Option<bool>,
}

impl Ticket {
    /// The step at `current_step_index`, or `None` once every step is done.
    pub fn current_step(&self) -> Option<&WorkflowStep> {
        self.steps.get(self.current_step_index)
    }

    pub fn current_step_id(&self) -> Option<&str> {
        self.current_step().map(|s| s.id.as_str())
    }

    pub fn step(&self, step_id: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    /// Number of steps that are completed or skipped.
    pub fn finished_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.status.is_done()).count()
    }

    /// Ledger in display order: newest first, later insertion first on equal
    /// timestamps.
    pub fn history_newest_first(&self) -> Vec<&HistoryEvent> {
        let mut indexed: Vec<(usize, &HistoryEvent)> = self.history.iter().enumerate().collect();
        indexed.sort_by(|(ia, a), (ib, b)| b.timestamp.cmp(&a.timestamp).then(ib.cmp(ia)));
        indexed.into_iter().map(|(_, e)| e).collect()
    }

    /// Checks the structural invariants that every engine operation preserves:
    ///
    /// - `current_step_index <= steps.len()`
    /// - at the end of the sequence the ticket is `completed` or `archived`
    /// - steps before the current one are `completed` or `skipped`
    /// - the current step is the single `in_progress` step
    /// - steps after it are `pending`
    pub fn is_valid_transition_target(&self) -> bool {
        let idx = self.current_step_index;
        if idx > self.steps.len() {
            return false;
        }
        if idx == self.steps.len() && self.status == TicketStatus::Active {
            return false;
        }
        self.steps.iter().enumerate().all(|(i, step)| {
            if i < idx {
                step.status.is_done()
            } else if i == idx {
                step.status == StepStatus::InProgress
            } else {
                step.status == StepStatus::Pending
            }
        })
    }
}
