//! Terminal rendering: step list, activity log and the draft spinner.
//!
//! Uses `console` for colour and `indicatif` for the spinner shown while a
//! draft is generated.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::drafting::EmailDraft;
use crate::workflow::{
    EventKind, HistoryEvent, StepStatus, Ticket, TicketStatus, Viewer, WorkflowStep, visibility,
};

struct Palette {
    green: Style,
    blue: Style,
    yellow: Style,
    dim: Style,
    bold: Style,
}

impl Palette {
    fn new() -> Self {
        Self {
            green: Style::new().green().bold(),
            blue: Style::new().cyan().bold(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
            bold: Style::new().bold(),
        }
    }
}

fn status_icon(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Completed => "✓",
        StepStatus::InProgress => "●",
        StepStatus::Skipped => "↷",
        StepStatus::Pending => "○",
    }
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// One-line summary used by `list`.
pub fn print_summary(ticket: &Ticket) {
    let p = Palette::new();
    let status = match ticket.status {
        TicketStatus::Active => p.blue.apply_to(ticket.status.to_string()),
        TicketStatus::Completed => p.green.apply_to(ticket.status.to_string()),
        TicketStatus::Archived => p.dim.apply_to(ticket.status.to_string()),
    };
    println!(
        "{}  {:<24} {:<10} {}/{} steps  due {}",
        short_id(&ticket.id),
        ticket.employee_name,
        status,
        ticket.finished_steps(),
        ticket.steps.len(),
        ticket.due_date.format("%Y-%m-%d"),
    );
}

/// Header, steps filtered through the visibility policy, then the activity log.
pub fn print_ticket(ticket: &Ticket, viewer: Viewer) {
    let p = Palette::new();
    println!(
        "{} {} ({})",
        p.bold.apply_to("Offboarding:"),
        ticket.employee_name,
        ticket.role
    );
    println!(
        "  id {}  ref {}  manager {}  due {}  status {}",
        ticket.id,
        ticket.external_ref_id,
        ticket.manager_name,
        ticket.due_date.format("%Y-%m-%d"),
        ticket.status
    );
    if let Some(name) = &ticket.replacement_name {
        println!("  replacement {name}");
    }
    if ticket.catering_confirmed == Some(true) {
        println!("  catering duties confirmed");
    }
    println!();
    println!("{}", p.bold.apply_to(format!("Steps (viewing as {viewer})")));

    let current = ticket.current_step_id();
    for step in &ticket.steps {
        print_step(&p, step, current, viewer);
    }

    println!();
    println!("{}", p.bold.apply_to("Activity"));
    print_history(ticket);
}

fn print_step(p: &Palette, step: &WorkflowStep, current: Option<&str>, viewer: Viewer) {
    let vis = visibility(step, current, viewer);
    let icon = status_icon(step.status);
    let icon = match step.status {
        StepStatus::Completed => p.green.apply_to(icon),
        StepStatus::InProgress => p.blue.apply_to(icon),
        _ => p.dim.apply_to(icon),
    };

    if !vis.show_details {
        println!("  {icon} {}", p.dim.apply_to(format!("{} [{}]", step.title, step.department)));
        return;
    }

    println!("  {icon} {} [{}]  ({})", step.title, step.department, step.id);
    println!("      {}", p.dim.apply_to(&step.description));

    if current == Some(step.id.as_str()) {
        if step.requires_input {
            let value = step.input_value.as_deref().unwrap_or("Waiting for input...");
            println!("      {}: {value}", step.input_label_or_default());
        }
        if vis.can_interact {
            println!("      {}", p.blue.apply_to("→ ready for you to complete"));
        } else {
            println!(
                "      {}",
                p.yellow.apply_to(format!("Waiting for {} to complete this step...", step.department))
            );
        }
    } else if let Some(value) = step.filled_input() {
        println!("      {}: {value}", step.input_label.as_deref().unwrap_or("Value"));
    }

    if let Some(at) = step.completed_at {
        println!("      {}", p.dim.apply_to(format!("Completed: {}", at.format("%Y-%m-%d %H:%M"))));
    }
}

/// Activity log, newest first.
pub fn print_history(ticket: &Ticket) {
    let p = Palette::new();
    let events = ticket.history_newest_first();
    if events.is_empty() {
        println!("  {}", p.dim.apply_to("No activity recorded yet."));
        return;
    }
    for event in events {
        print_event(&p, event);
    }
}

fn print_event(p: &Palette, event: &HistoryEvent) {
    let style = match event.kind {
        EventKind::StepCompleted => &p.green,
        EventKind::EmailSent | EventKind::InputLogged => &p.blue,
        _ => &p.yellow,
    };
    println!(
        "  {} {}  {}  {}",
        p.dim.apply_to(event.timestamp.format("%Y-%m-%d %H:%M:%S")),
        style.apply_to(&event.title),
        p.dim.apply_to("by"),
        event.actor
    );
    if let Some(description) = &event.description {
        println!("      {description}");
    }
    let Some(meta) = &event.metadata else {
        return;
    };
    match event.kind {
        EventKind::EmailSent => {
            println!("      To: {}", meta.email_to.as_deref().filter(|s| !s.is_empty()).unwrap_or("N/A"));
            println!("      CC: {}", meta.email_cc.as_deref().filter(|s| !s.is_empty()).unwrap_or("N/A"));
        }
        EventKind::InputLogged => {
            if let Some(value) = &meta.input_value {
                println!("      Value: {value}");
            }
        }
        _ => {}
    }
}

/// Prints a draft ready for review.
pub fn print_draft(draft: &EmailDraft) {
    let p = Palette::new();
    println!("{} {}", p.bold.apply_to("Subject:"), draft.subject);
    println!();
    if draft.body.is_empty() {
        println!("{}", p.dim.apply_to("(empty draft, write the email by hand)"));
    } else {
        println!("{}", draft.body);
    }
}

/// Spinner shown while the generation service is working.
pub struct DraftSpinner {
    pb: ProgressBar,
}

impl DraftSpinner {
    pub fn start(step_title: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.magenta} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(format!("Drafting email for \"{step_title}\" (Ctrl-C to cancel)"));
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
