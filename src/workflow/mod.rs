pub mod clock;
mod engine;
mod model;
mod policy;
mod template;

pub use clock::{Clock, SystemClock};
pub use engine::{CompleteOptions, EmailMetadata, NewTicket, TransitionEngine};
pub use model::{
    CapturedField, Department, EmailTemplate, EventKind, EventMetadata, HistoryEvent, StepKind,
    StepStatus, Ticket, TicketStatus, WorkflowStep,
};
pub use policy::{Viewer, Visibility, visibility};
pub use template::{StepTemplate, WorkflowTemplate};
