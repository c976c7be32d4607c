//! Step templates: the ordered sequence a new ticket is built from.
//!
//! The built-in [`WorkflowTemplate::offboarding`] covers the P-Card holder
//! offboarding process. Other sequences can be supplied as TOML:
//!
//! ```toml
//! [[steps]]
//! id = "notify-osi"
//! title = "Notify OSI"
//! description = "Manager informs OSI of the departure."
//! department = "Manager"
//! kind = "email_draft"
//! email_template = "manager_notify_osi"
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::model::{CapturedField, Department, EmailTemplate, StepKind, StepStatus, WorkflowStep};
use crate::error::{OffboardError, WorkflowError};

/// Blueprint for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTemplate {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub department: Department,
    pub kind: StepKind,
    #[serde(default)]
    pub email_template: Option<EmailTemplate>,
    #[serde(default)]
    pub requires_input: bool,
    #[serde(default)]
    pub input_label: Option<String>,
    #[serde(default)]
    pub captures: Option<CapturedField>,
}

impl StepTemplate {
    /// Materialises a fresh, pending step.
    pub fn instantiate(&self) -> WorkflowStep {
        WorkflowStep {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            department: self.department,
            status: StepStatus::Pending,
            kind: self.kind,
            email_template: self.email_template,
            requires_input: self.requires_input,
            input_label: self.input_label.clone(),
            input_value: None,
            captures: self.captures,
            completed_at: None,
        }
    }
}

/// An ordered list of step blueprints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub steps: Vec<StepTemplate>,
}

impl WorkflowTemplate {
    pub fn new(steps: Vec<StepTemplate>) -> Self {
        Self { steps }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, OffboardError> {
        let template: WorkflowTemplate = toml::from_str(s)?;
        template.validate()?;
        Ok(template)
    }

    pub fn load(path: &Path) -> Result<Self, OffboardError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Rejects templates the engine could not run: no steps, blank or
    /// duplicate ids, or an input step without a label.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.steps.is_empty() {
            return Err(WorkflowError::Validation(
                "step template must contain at least one step".into(),
            ));
        }
        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.id.trim().is_empty() {
                return Err(WorkflowError::Validation("step id must not be blank".into()));
            }
            if !seen.insert(step.id.as_str()) {
                return Err(WorkflowError::Validation(format!(
                    "duplicate step id: {}",
                    step.id
                )));
            }
            if step.requires_input
                && step.input_label.as_deref().is_none_or(|l| l.trim().is_empty())
            {
                return Err(WorkflowError::Validation(format!(
                    "step {} requires input but has no input label",
                    step.id
                )));
            }
        }
        Ok(())
    }

    /// The P-Card holder offboarding sequence.
    pub fn offboarding() -> Self {
        fn step(
            id: &str,
            title: &str,
            description: &str,
            department: Department,
            kind: StepKind,
            email_template: Option<EmailTemplate>,
        ) -> StepTemplate {
            StepTemplate {
                id: id.into(),
                title: title.into(),
                description: description.into(),
                department,
                kind,
                email_template,
                requires_input: false,
                input_label: None,
                captures: None,
            }
        }

        let mut replacement = step(
            "request-replacement",
            "Provide Replacement Name",
            "Manager names the replacement P-Card holder, or confirms none is needed.",
            Department::Manager,
            StepKind::Input,
            Some(EmailTemplate::ManagerReplacementReq),
        );
        replacement.requires_input = true;
        replacement.input_label = Some("Replacement P-Card holder".into());
        replacement.captures = Some(CapturedField::ReplacementName);

        let mut catering = step(
            "verify-catering",
            "Verify Catering Duties",
            "Replacement confirms they charge catering and their role is not facilities-only.",
            Department::NewHolder,
            StepKind::Approval,
            Some(EmailTemplate::VerificationCatering),
        );
        catering.captures = Some(CapturedField::CateringConfirmed);

        let mut delegates = step(
            "assign-delegates",
            "Assign ABC Delegates",
            "ABC manager lists the delegates who will support the new card holder.",
            Department::Abc,
            StepKind::EmailDraft,
            Some(EmailTemplate::AbcMgrDelegates),
        );
        delegates.requires_input = true;
        delegates.input_label = Some("ABC delegates".into());

        Self::new(vec![
            step(
                "notify-osi",
                "Notify OSI",
                "Manager notifies the OSI/PayIt support team of the personnel change.",
                Department::Manager,
                StepKind::EmailDraft,
                Some(EmailTemplate::ManagerNotifyOsi),
            ),
            step(
                "retire-delegate",
                "Retire Delegate Relationship",
                "OSI flags ABC delegates for removal and asks GFS to retire the relationship in XPo.",
                Department::Osi,
                StepKind::EmailDraft,
                Some(EmailTemplate::GfsRetire),
            ),
            replacement,
            catering,
            delegates,
            step(
                "md-approval",
                "MD Approval",
                "Expense MD leader approves the new delegate relationship.",
                Department::Md,
                StepKind::Approval,
                Some(EmailTemplate::MdApproval),
            ),
            step(
                "gfs-config",
                "Configure XPo",
                "GFS configures the new delegate relationships in XPo.",
                Department::Gfs,
                StepKind::EmailDraft,
                Some(EmailTemplate::GfsConfig),
            ),
            step(
                "holder-training",
                "Card Holder Training",
                "New card holder confirms attendance at POS support process training.",
                Department::NewHolder,
                StepKind::EmailDraft,
                Some(EmailTemplate::TrainingConfirmation),
            ),
            step(
                "delegate-training",
                "Delegate Training",
                "ABC delegate training is confirmed and support documentation shared.",
                Department::Abc,
                StepKind::EmailDraft,
                Some(EmailTemplate::DelegateTrainingConfirmation),
            ),
        ])
    }
}

impl Default for WorkflowTemplate {
    fn default() -> Self {
        Self::offboarding()
    }
}
