use chrono::{Duration, Utc};
use offboard::drafting::{DraftRequest, EmailDraft};
use offboard::mailto::MailtoLink;
use offboard::store::TicketStore;
use offboard::workflow::{
    CompleteOptions, Department, EmailMetadata, EventKind, NewTicket, StepStatus, TicketStatus,
    TransitionEngine, Viewer, WorkflowTemplate, visibility,
};
use tempfile::TempDir;

fn request() -> NewTicket {
    NewTicket {
        employee_name: "Alex Moreno".into(),
        manager_name: "Priya Shah".into(),
        external_ref_id: "RITM0042".into(),
        role: "P-Card Holder".into(),
        due_date: Utc::now() + Duration::days(30),
    }
}

#[test]
fn full_offboarding_through_the_store() {
    let dir = TempDir::new().unwrap();
    let store = TicketStore::open(dir.path()).unwrap();
    let engine = TransitionEngine::new();

    let ticket = engine
        .create_ticket(&request(), &WorkflowTemplate::offboarding())
        .unwrap();
    store.save(&ticket).unwrap();

    let mut id = ticket.id.clone();
    loop {
        let ticket = store.load(&id).unwrap();
        let Some(step) = ticket.current_step().cloned() else {
            break;
        };
        let owner = Viewer::Department(step.department);
        assert!(visibility(&step, ticket.current_step_id(), owner).can_interact);

        let mut options = CompleteOptions::default();
        if step.requires_input {
            let typed = engine.record_input(&ticket, &step.id, "Jane Doe").unwrap();
            store.save(&typed).unwrap();
        }
        if let Some(template) = step.email_template {
            let current = store.load(&id).unwrap();
            let req = DraftRequest::for_ticket(&current, template);
            assert_eq!(req.ticket_id, "RITM0042");
            let draft = EmailDraft::parse(&format!("Subject: {}\n\nBody for {}", step.title, step.id));
            let link = MailtoLink::from_draft("team@example.com", "", &draft);
            assert!(link.to_uri().starts_with("mailto:team@example.com?subject="));
            options.email = Some(EmailMetadata {
                to: link.to,
                cc: link.cc,
                body: draft.history_snapshot(),
            });
        }

        let current = store.load(&id).unwrap();
        let updated = engine
            .complete_step(&current, &step.id, owner.to_string().as_str(), options)
            .unwrap();
        assert!(updated.is_valid_transition_target());
        assert!(updated.history.len() > current.history.len());
        store.save(&updated).unwrap();
        id = updated.id.clone();
    }

    let done = store.load(&id).unwrap();
    assert_eq!(done.status, TicketStatus::Completed);
    assert!(done.steps.iter().all(|s| s.status == StepStatus::Completed));
    assert_eq!(done.replacement_name.as_deref(), Some("Jane Doe"));
    assert_eq!(done.catering_confirmed, Some(true));

    let emails = done
        .history
        .iter()
        .filter(|e| e.kind == EventKind::EmailSent)
        .count();
    assert_eq!(emails, 9);
    assert_eq!(done.history.last().unwrap().kind, EventKind::StatusChange);

    let newest = done.history_newest_first();
    assert_eq!(newest[0].kind, EventKind::StatusChange);
    assert_eq!(newest.last().unwrap().kind, EventKind::TicketCreated);
}

#[test]
fn manager_sees_osi_step_only_while_current() {
    let engine = TransitionEngine::new();
    let ticket = engine
        .create_ticket(&request(), &WorkflowTemplate::offboarding())
        .unwrap();
    let manager = Viewer::Department(Department::Manager);
    let osi_step = ticket.step("retire-delegate").unwrap().clone();

    let before = visibility(&osi_step, ticket.current_step_id(), manager);
    assert!(!before.show_details && !before.can_interact);

    let ticket = engine
        .complete_step(&ticket, "notify-osi", "Manager", CompleteOptions::default())
        .unwrap();
    let during = visibility(ticket.current_step().unwrap(), ticket.current_step_id(), manager);
    assert!(during.show_details && !during.can_interact);

    let admin = visibility(ticket.current_step().unwrap(), ticket.current_step_id(), Viewer::Admin);
    assert!(admin.can_interact);
}
