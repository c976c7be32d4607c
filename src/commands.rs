//! Executes parsed CLI commands against the ticket store.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use console::Style;
use tracing::{info, warn};

use crate::cli::{Cli, Command};
use crate::config::{API_KEY_ENV, OffboardConfig};
use crate::drafting::{DraftGateway, DraftRequest, EmailDraft, GatewayError};
use crate::gemini::GeminiClient;
use crate::mailto::{MailtoLink, open_in_mail_client};
use crate::store::TicketStore;
use crate::ui;
use crate::workflow::{
    CompleteOptions, EmailMetadata, NewTicket, Ticket, TransitionEngine, Viewer, WorkflowTemplate,
    visibility,
};

pub async fn run(cli: Cli, config: OffboardConfig) -> Result<()> {
    let store_dir = cli.store.clone().unwrap_or_else(|| config.store_dir.clone());
    let store = TicketStore::open(&store_dir)
        .with_context(|| format!("opening ticket store {}", store_dir.display()))?;
    let engine = TransitionEngine::new();

    match cli.command {
        Command::Create {
            employee,
            manager,
            external_ref,
            role,
            due,
            template,
        } => {
            let template = load_template(template.as_deref().or(config.template_path.as_deref()))?;
            let request = NewTicket {
                employee_name: employee,
                manager_name: manager,
                external_ref_id: external_ref,
                role,
                due_date: end_of_day(due),
            };
            let ticket = engine.create_ticket(&request, &template)?;
            store.save(&ticket)?;
            info!(ticket = %ticket.id, "ticket opened");
            println!("Created ticket {}", ticket.id);
            ui::print_ticket(&ticket, Viewer::Admin);
        }

        Command::List => {
            let tickets = store.list()?;
            if tickets.is_empty() {
                println!("No tickets yet. Run `offboard create` first.");
            }
            for ticket in &tickets {
                ui::print_summary(ticket);
            }
        }

        Command::Show { ticket, viewer } => {
            let ticket = store.find(&ticket)?;
            ui::print_ticket(&ticket, viewer);
        }

        Command::Input {
            ticket,
            step,
            value,
        } => {
            let ticket = store.find(&ticket)?;
            let updated = engine.record_input(&ticket, &step, &value)?;
            store.save(&updated)?;
            println!("Saved input for {step}; complete the step to log it.");
        }

        Command::Complete {
            ticket,
            step,
            viewer,
            input,
            to,
            cc,
            body_file,
            open,
        } => {
            let ticket = store.find(&ticket)?;
            ensure_can_interact(&ticket, &step, viewer)?;

            let email = completion_email(to, &cc, body_file.as_deref())?;
            if open && email.is_none() {
                bail!("--open needs an email: pass --to, --cc or --body-file");
            }

            let options = CompleteOptions {
                input_value: input,
                email: email.as_ref().map(|(to, draft)| EmailMetadata {
                    to: to.clone(),
                    cc: cc.clone(),
                    body: draft.history_snapshot(),
                }),
            };
            let updated = engine.complete_step(&ticket, &step, &viewer.to_string(), options)?;
            store.save(&updated)?;

            if let Some((to, draft)) = &email {
                let uri = MailtoLink::from_draft(to, &cc, draft).to_uri();
                println!("{uri}");
                if open {
                    open_in_mail_client(&uri).context("opening mail client")?;
                }
            }
            report_progress(&updated);
        }

        Command::Skip {
            ticket,
            step,
            reason,
        } => {
            let ticket = store.find(&ticket)?;
            let updated = engine.skip_step(&ticket, &step, &Viewer::Admin.to_string(), &reason)?;
            store.save(&updated)?;
            report_progress(&updated);
        }

        Command::Archive { ticket } => {
            let ticket = store.find(&ticket)?;
            let updated = engine.archive_ticket(&ticket, &Viewer::Admin.to_string())?;
            store.save(&updated)?;
            println!("Archived ticket {}", updated.id);
        }

        Command::Draft {
            ticket,
            to,
            cc,
            save,
            open,
        } => {
            let ticket = store.find(&ticket)?;
            draft(&config, &ticket, &to, &cc, save.as_deref(), open).await?;
        }
    }

    Ok(())
}

/// An email accompanies the completion when any of recipient, CC or body is given.
fn completion_email(
    to: Option<String>,
    cc: &str,
    body_file: Option<&Path>,
) -> Result<Option<(String, EmailDraft)>> {
    if to.is_none() && body_file.is_none() && cc.trim().is_empty() {
        return Ok(None);
    }
    let draft = match body_file {
        Some(path) => EmailDraft::parse(
            &std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?,
        ),
        None => EmailDraft::empty(),
    };
    Ok(Some((to.unwrap_or_default(), draft)))
}

fn load_template(path: Option<&Path>) -> Result<WorkflowTemplate> {
    match path {
        Some(path) => WorkflowTemplate::load(path)
            .with_context(|| format!("loading step template {}", path.display())),
        None => Ok(WorkflowTemplate::offboarding()),
    }
}

/// Due dates are given as calendar days; the ticket is due at the end of it.
fn end_of_day(date: NaiveDate) -> chrono::DateTime<Utc> {
    let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
    Utc.from_utc_datetime(&date.and_time(end))
}

fn ensure_can_interact(ticket: &Ticket, step_id: &str, viewer: Viewer) -> Result<()> {
    let Some(step) = ticket.step(step_id) else {
        bail!("ticket {} has no step {step_id}", ticket.id);
    };
    if !visibility(step, ticket.current_step_id(), viewer).can_interact {
        bail!(
            "{viewer} cannot act on step {step_id} (owned by {}, status {})",
            step.department,
            step.status
        );
    }
    Ok(())
}

fn report_progress(ticket: &Ticket) {
    match ticket.current_step() {
        Some(next) => println!(
            "Next step: {} ({}) owned by {}",
            next.title, next.id, next.department
        ),
        None => println!(
            "{} Ticket {} is {}",
            Style::new().green().bold().apply_to("✓"),
            ticket.id,
            ticket.status
        ),
    }
}

async fn draft(
    config: &OffboardConfig,
    ticket: &Ticket,
    to: &str,
    cc: &str,
    save: Option<&Path>,
    open: bool,
) -> Result<()> {
    let Some(step) = ticket.current_step() else {
        bail!("ticket {} has no current step", ticket.id);
    };
    let Some(template) = step.email_template else {
        bail!("step {} has no email template", step.id);
    };

    let draft = if config.has_api_key() {
        let client = GeminiClient::with_base_url(
            config.api_key.clone(),
            config.model.clone(),
            config.api_base_url.clone(),
        )?;
        let gateway = DraftGateway::new(client, config.draft_timeout());
        let request = DraftRequest::for_ticket(ticket, template);

        let spinner = ui::DraftSpinner::start(&step.title);
        let result = gateway
            .draft_until(&request, async {
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            })
            .await;
        spinner.finish();

        match result {
            Ok(draft) => draft,
            Err(GatewayError::Cancelled) => {
                println!("Draft cancelled.");
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, "falling back to an empty draft");
                println!("Could not generate email draft ({e}); write it by hand.");
                EmailDraft::empty()
            }
        }
    } else {
        warn!("{API_KEY_ENV} is not set; skipping draft generation");
        EmailDraft::empty()
    };

    ui::print_draft(&draft);
    if let Some(path) = save {
        write_draft(path, &draft)?;
        println!("\nDraft saved to {}", path.display());
    }

    let uri = MailtoLink::from_draft(to, cc, &draft).to_uri();
    println!("\n{uri}");
    if open {
        open_in_mail_client(&uri).context("opening mail client")?;
    }
    Ok(())
}

fn write_draft(path: &Path, draft: &EmailDraft) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, draft.history_snapshot())
        .with_context(|| format!("writing {}", path.display()))
}
