//! Prompt text for each [`EmailTemplate`].

use serde::{Deserialize, Serialize};

use super::GatewayError;
use crate::workflow::{EmailTemplate, Ticket};

/// Everything the generation service needs to write one email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRequest {
    pub template: EmailTemplate,
    pub employee_name: String,
    pub manager_name: String,
    pub replacement_name: Option<String>,
    pub ticket_id: String,
}

impl DraftRequest {
    /// Draft request for `template`, filled from the ticket. `ticket_id` is the
    /// external reference people quote in email.
    pub fn for_ticket(ticket: &Ticket, template: EmailTemplate) -> Self {
        Self {
            template,
            employee_name: ticket.employee_name.clone(),
            manager_name: ticket.manager_name.clone(),
            replacement_name: ticket.replacement_name.clone(),
            ticket_id: ticket.external_ref_id.clone(),
        }
    }
}

/// Templates written to or about the replacement card holder.
fn needs_replacement(template: EmailTemplate) -> bool {
    matches!(
        template,
        EmailTemplate::VerificationCatering
            | EmailTemplate::AbcMgrDelegates
            | EmailTemplate::MdApproval
            | EmailTemplate::GfsConfig
            | EmailTemplate::TrainingConfirmation
    )
}

pub fn build_prompt(req: &DraftRequest) -> Result<String, GatewayError> {
    let employee = &req.employee_name;
    let manager = &req.manager_name;
    let ticket = &req.ticket_id;
    let replacement = match req.replacement_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ if needs_replacement(req.template) => {
            return Err(GatewayError::MissingContext("replacement name"));
        }
        _ => "",
    };

    let (audience, subject, context, action, tone) = match req.template {
        EmailTemplate::ManagerNotifyOsi => (
            format!("from {manager} to the OSI/PayIt support team"),
            format!("Personnel Change Notification: {employee}"),
            format!("{employee} is leaving their One Team role (ticket {ticket})."),
            "Start offboarding, flag the ABC delegates for removal and make the required XPo (GFS) configuration changes.".to_string(),
            "professional and informative",
        ),
        EmailTemplate::GfsRetire => (
            "to the GFS (Global Financial Services) team".to_string(),
            format!("Retire Delegate Relationship for {employee}"),
            format!("{employee} has left the One Team role (ticket {ticket})."),
            "Retire their delegate relationships and update the XPo configuration.".to_string(),
            "professional and concise",
        ),
        EmailTemplate::ManagerReplacementReq => (
            format!("to {manager}"),
            format!("P-Card Holder Replacement for {employee}"),
            format!("The departure of {employee} is being processed."),
            "Provide the name of the replacement P-Card holder, or confirm that no replacement is needed.".to_string(),
            "helpful and direct",
        ),
        EmailTemplate::VerificationCatering => (
            format!("to the P-Card holder nominee {replacement}"),
            "Confirmation of Catering Duties Required for P-Card Issuance".to_string(),
            format!("{replacement} has been nominated to replace {employee}."),
            "Confirm that you charge catering on your card and that your role is not limited to facilities or other One Team duties without catering. Delegate setup waits on this confirmation.".to_string(),
            "urgent but polite",
        ),
        EmailTemplate::AbcMgrDelegates => (
            "to the ABC manager".to_string(),
            format!("Delegate Assignment for {replacement}"),
            format!("{replacement} is the new P-Card holder."),
            "List the ABC delegates who need access to support this card holder.".to_string(),
            "professional",
        ),
        EmailTemplate::MdApproval => (
            "to the Expense MD leader".to_string(),
            format!("Approval Required: Delegate Relationship for {replacement}"),
            format!("{replacement} is being set up as a new P-Card holder."),
            "Approve establishing the delegate relationship in XPo.".to_string(),
            "formal",
        ),
        EmailTemplate::GfsConfig => (
            "to the GFS team".to_string(),
            format!("XPo Configuration Request for {replacement}"),
            format!("MD approval has been received for {replacement}."),
            "Configure the new delegate relationships in XPo.".to_string(),
            "technical and brief",
        ),
        EmailTemplate::TrainingConfirmation => (
            format!("to {replacement}"),
            "P-Card POS Support Process Training".to_string(),
            "Your P-Card setup is complete.".to_string(),
            "Attend the mandatory POS support process training and confirm receipt of the invite.".to_string(),
            "welcoming and informative",
        ),
        EmailTemplate::DelegateTrainingConfirmation => (
            "to the ABC delegate".to_string(),
            "Delegate Training Confirmation for P-Card Support".to_string(),
            format!("The delegate has completed the training required to support the P-Card holder (ticket {ticket})."),
            "Confirm their authorised status and point them to the support documentation.".to_string(),
            "professional and encouraging",
        ),
    };

    Ok(format!(
        "Draft an email {audience}.\n\
         Start with a line of the form \"Subject: {subject}\".\n\
         Context: {context}\n\
         Action: {action}\n\
         Tone: {tone}."
    ))
}
