//! The transition engine: the only code that changes ticket state.
//!
//! Each operation takes the current [`Ticket`] by reference and returns a new
//! value with any history events appended. On error nothing is returned but
//! the error, so a rejected action can never leave a half-applied ticket.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use super::clock::{Clock, Stamper, SystemClock};
use super::model::{
    CapturedField, Department, EventKind, EventMetadata, HistoryEvent, StepStatus, Ticket,
    TicketStatus,
};
use super::template::WorkflowTemplate;
use crate::error::WorkflowError;

/// Input for [`TransitionEngine::create_ticket`].
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub employee_name: String,
    pub manager_name: String,
    pub external_ref_id: String,
    pub role: String,
    pub due_date: DateTime<Utc>,
}

/// Recipients and body of an email sent while completing a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMetadata {
    pub to: String,
    pub cc: String,
    pub body: String,
}

/// Optional extras for [`TransitionEngine::complete_step`].
#[derive(Debug, Clone, Default)]
pub struct CompleteOptions {
    pub input_value: Option<String>,
    pub email: Option<EmailMetadata>,
}

impl CompleteOptions {
    pub fn with_input(value: impl Into<String>) -> Self {
        Self {
            input_value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn with_email(email: EmailMetadata) -> Self {
        Self {
            email: Some(email),
            ..Self::default()
        }
    }
}

/// Applies workflow actions to tickets.
#[derive(Debug, Clone, Default)]
pub struct TransitionEngine<C = SystemClock> {
    clock: C,
}

impl TransitionEngine<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> TransitionEngine<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Builds a ticket from `template`, with the first step in progress and a
    /// single `ticket_created` event.
    pub fn create_ticket(
        &self,
        request: &NewTicket,
        template: &WorkflowTemplate,
    ) -> Result<Ticket, WorkflowError> {
        template.validate()?;
        for (field, value) in [
            ("employee name", &request.employee_name),
            ("manager name", &request.manager_name),
            ("external reference id", &request.external_ref_id),
            ("role", &request.role),
        ] {
            if value.trim().is_empty() {
                return Err(WorkflowError::Validation(format!("{field} must not be blank")));
            }
        }

        let mut stamper = Stamper::after(None);
        let created_at = stamper.next(&self.clock);
        if request.due_date < created_at {
            return Err(WorkflowError::Validation(format!(
                "due date {} precedes creation time {}",
                request.due_date.to_rfc3339(),
                created_at.to_rfc3339()
            )));
        }

        let mut steps: Vec<_> = template.steps.iter().map(|s| s.instantiate()).collect();
        steps[0].status = StepStatus::InProgress;

        let created = HistoryEvent {
            id: Uuid::new_v4().to_string(),
            timestamp: created_at,
            kind: EventKind::TicketCreated,
            title: "Ticket created".into(),
            description: Some(format!(
                "Offboarding started for {} (ref {})",
                request.employee_name.trim(),
                request.external_ref_id.trim()
            )),
            actor: Department::System.to_string(),
            metadata: None,
        };

        let ticket = Ticket {
            id: Uuid::new_v4().to_string(),
            employee_name: request.employee_name.trim().to_string(),
            manager_name: request.manager_name.trim().to_string(),
            external_ref_id: request.external_ref_id.trim().to_string(),
            role: request.role.trim().to_string(),
            created_at,
            due_date: request.due_date,
            status: TicketStatus::Active,
            current_step_index: 0,
            steps,
            history: vec![created],
            replacement_name: None,
            catering_confirmed: None,
        };
        debug!(ticket = %ticket.id, steps = ticket.steps.len(), "ticket created");
        Ok(ticket)
    }

    /// Stores a draft input value on the current step. Appends no history:
    /// the value is only audited when the step completes.
    pub fn record_input(
        &self,
        ticket: &Ticket,
        step_id: &str,
        value: &str,
    ) -> Result<Ticket, WorkflowError> {
        let idx = actionable_index(ticket, step_id)?;
        if !ticket.steps[idx].requires_input {
            return Err(WorkflowError::invalid_step(step_id, "step does not take input"));
        }

        let mut next = ticket.clone();
        next.steps[idx].input_value = Some(value.to_string());
        debug!(ticket = %ticket.id, step = step_id, "input recorded");
        Ok(next)
    }

    /// Completes the current step and advances the ticket.
    ///
    /// Events appended, in order: `email_sent` when `options.email` is given,
    /// otherwise `input_logged` when the step carries an input value; then
    /// `step_completed`; then `status_change` if this was the last step.
    pub fn complete_step(
        &self,
        ticket: &Ticket,
        step_id: &str,
        actor: &str,
        options: CompleteOptions,
    ) -> Result<Ticket, WorkflowError> {
        let idx = actionable_index(ticket, step_id)?;
        let mut next = ticket.clone();
        let mut stamper = Stamper::after(latest_timestamp(ticket));

        let step = &mut next.steps[idx];
        if let Some(value) = options.input_value {
            step.input_value = Some(value);
        }
        let input = step.filled_input().map(str::to_string);
        if step.requires_input && input.is_none() {
            return Err(WorkflowError::MissingInput {
                step_id: step_id.to_string(),
                label: step.input_label_or_default().to_string(),
            });
        }

        let completed_at = stamper.next(&self.clock);
        step.status = StepStatus::Completed;
        step.completed_at = Some(completed_at);
        let step = step.clone();

        let mut events = Vec::with_capacity(3);
        if let Some(email) = options.email {
            events.push(HistoryEvent {
                id: Uuid::new_v4().to_string(),
                timestamp: completed_at,
                kind: EventKind::EmailSent,
                title: format!("Email sent: {}", step.title),
                description: (!email.to.trim().is_empty()).then(|| format!("To {}", email.to)),
                actor: step.department.to_string(),
                metadata: Some(EventMetadata {
                    email_to: Some(email.to),
                    email_cc: Some(email.cc),
                    email_body: Some(email.body),
                    step_id: Some(step.id.clone()),
                    ..EventMetadata::default()
                }),
            });
        } else if let Some(value) = &input {
            events.push(HistoryEvent {
                id: Uuid::new_v4().to_string(),
                timestamp: completed_at,
                kind: EventKind::InputLogged,
                title: format!("{} recorded", step.input_label_or_default()),
                description: None,
                actor: actor.to_string(),
                metadata: Some(EventMetadata {
                    input_value: Some(value.clone()),
                    step_id: Some(step.id.clone()),
                    ..EventMetadata::default()
                }),
            });
        }
        events.push(HistoryEvent {
            id: Uuid::new_v4().to_string(),
            timestamp: if events.is_empty() {
                completed_at
            } else {
                stamper.next(&self.clock)
            },
            kind: EventKind::StepCompleted,
            title: format!("Step completed: {}", step.title),
            description: None,
            actor: actor.to_string(),
            metadata: Some(EventMetadata {
                step_id: Some(step.id.clone()),
                ..EventMetadata::default()
            }),
        });
        next.history.extend(events);

        match step.captures {
            Some(CapturedField::ReplacementName) => next.replacement_name = input,
            Some(CapturedField::CateringConfirmed) => next.catering_confirmed = Some(true),
            None => {}
        }

        self.advance(&mut next, &mut stamper);
        debug!(ticket = %next.id, step = step_id, actor, "step completed");
        Ok(next)
    }

    /// Administrative override: marks the current step `skipped` and advances.
    pub fn skip_step(
        &self,
        ticket: &Ticket,
        step_id: &str,
        actor: &str,
        reason: &str,
    ) -> Result<Ticket, WorkflowError> {
        let idx = actionable_index(ticket, step_id)?;
        if reason.trim().is_empty() {
            return Err(WorkflowError::Validation("skip reason must not be blank".into()));
        }

        let mut next = ticket.clone();
        let mut stamper = Stamper::after(latest_timestamp(ticket));
        let step = &mut next.steps[idx];
        step.status = StepStatus::Skipped;
        let title = format!("Step skipped: {}", step.title);

        next.history.push(HistoryEvent {
            id: Uuid::new_v4().to_string(),
            timestamp: stamper.next(&self.clock),
            kind: EventKind::StatusChange,
            title,
            description: Some(reason.trim().to_string()),
            actor: actor.to_string(),
            metadata: Some(EventMetadata {
                step_id: Some(step_id.to_string()),
                ..EventMetadata::default()
            }),
        });

        self.advance(&mut next, &mut stamper);
        debug!(ticket = %next.id, step = step_id, actor, "step skipped");
        Ok(next)
    }

    /// Moves an active or completed ticket to `archived`.
    pub fn archive_ticket(&self, ticket: &Ticket, actor: &str) -> Result<Ticket, WorkflowError> {
        if ticket.status == TicketStatus::Archived {
            return Err(WorkflowError::Validation(format!(
                "ticket {} is already archived",
                ticket.id
            )));
        }

        let mut next = ticket.clone();
        let mut stamper = Stamper::after(latest_timestamp(ticket));
        let previous = next.status;
        next.status = TicketStatus::Archived;
        next.history.push(HistoryEvent {
            id: Uuid::new_v4().to_string(),
            timestamp: stamper.next(&self.clock),
            kind: EventKind::StatusChange,
            title: "Ticket archived".into(),
            description: Some(format!("Status changed from {previous} to archived")),
            actor: actor.to_string(),
            metadata: None,
        });
        debug!(ticket = %next.id, actor, "ticket archived");
        Ok(next)
    }

    fn advance(&self, ticket: &mut Ticket, stamper: &mut Stamper) {
        let next_index = ticket.current_step_index + 1;
        if next_index < ticket.steps.len() {
            ticket.current_step_index = next_index;
            ticket.steps[next_index].status = StepStatus::InProgress;
            return;
        }

        ticket.current_step_index = ticket.steps.len();
        ticket.status = TicketStatus::Completed;
        ticket.history.push(HistoryEvent {
            id: Uuid::new_v4().to_string(),
            timestamp: stamper.next(&self.clock),
            kind: EventKind::StatusChange,
            title: "Ticket completed".into(),
            description: Some(format!(
                "All {} steps finished for {}",
                ticket.steps.len(),
                ticket.employee_name
            )),
            actor: Department::System.to_string(),
            metadata: None,
        });
    }
}

/// Index of `step_id` if it is the current, in-progress step of an active ticket.
fn actionable_index(ticket: &Ticket, step_id: &str) -> Result<usize, WorkflowError> {
    if ticket.status != TicketStatus::Active {
        return Err(WorkflowError::invalid_step(
            step_id,
            format!("ticket is {}", ticket.status),
        ));
    }
    let Some(current) = ticket.current_step() else {
        return Err(WorkflowError::invalid_step(step_id, "ticket has no current step"));
    };
    if current.id != step_id {
        let reason = match ticket.step(step_id) {
            Some(step) => format!("step is {}, current step is {}", step.status, current.id),
            None => "no such step on this ticket".to_string(),
        };
        return Err(WorkflowError::invalid_step(step_id, reason));
    }
    if current.status != StepStatus::InProgress {
        return Err(WorkflowError::invalid_step(
            step_id,
            format!("step is {}", current.status),
        ));
    }
    Ok(ticket.current_step_index)
}

fn latest_timestamp(ticket: &Ticket) -> Option<DateTime<Utc>> {
    ticket.history.iter().map(|e| e.timestamp).max()
}
