//! Directory-backed ticket store: one JSON document per ticket.
//!
//! Saves are whole-document and last-write-wins; there is no conflict
//! detection between concurrent writers.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::OffboardError;
use crate::workflow::Ticket;

pub struct TicketStore {
    dir: PathBuf,
}

impl TicketStore {
    /// Opens (and creates if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, OffboardError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Writes to a temporary file and renames it into place.
    pub fn save(&self, ticket: &Ticket) -> Result<(), OffboardError> {
        let path = self.path_for(&ticket.id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(ticket)?)?;
        fs::rename(&tmp, &path)?;
        info!(ticket = %ticket.id, status = %ticket.status, "ticket saved");
        Ok(())
    }

    pub fn load(&self, id: &str) -> Result<Ticket, OffboardError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(OffboardError::TicketNotFound(id.to_string()));
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Loads by full id, or by a unique id prefix.
    pub fn find(&self, id_or_prefix: &str) -> Result<Ticket, OffboardError> {
        let id_or_prefix = id_or_prefix.trim();
        if id_or_prefix.is_empty() {
            return Err(OffboardError::TicketNotFound("(empty id)".to_string()));
        }
        if self.path_for(id_or_prefix).exists() {
            return self.load(id_or_prefix);
        }
        let matches: Vec<Ticket> = self
            .list()?
            .into_iter()
            .filter(|t| t.id.starts_with(id_or_prefix))
            .collect();
        match <[Ticket; 1]>::try_from(matches) {
            Ok([ticket]) => Ok(ticket),
            Err(matches) if matches.is_empty() => {
                Err(OffboardError::TicketNotFound(id_or_prefix.to_string()))
            }
            Err(matches) => Err(OffboardError::AmbiguousTicket {
                prefix: id_or_prefix.to_string(),
                count: matches.len(),
            }),
        }
    }

    /// All tickets, oldest first.
    pub fn list(&self) -> Result<Vec<Ticket>, OffboardError> {
        let mut tickets = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let contents = fs::read_to_string(&path)?;
                tickets.push(serde_json::from_str::<Ticket>(&contents)?);
            }
        }
        tickets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(tickets)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::workflow::{NewTicket, TransitionEngine, WorkflowTemplate};

    fn make_ticket(name: &str) -> Ticket {
        TransitionEngine::new()
            .create_ticket(
                &NewTicket {
                    employee_name: name.into(),
                    manager_name: "Priya Shah".into(),
                    external_ref_id: "RITM0042".into(),
                    role: "P-Card Holder".into(),
                    due_date: Utc::now() + Duration::days(14),
                },
                &WorkflowTemplate::offboarding(),
            )
            .unwrap()
    }

    #[test]
    fn save_then_load_is_lossless() {
        let dir = TempDir::new().unwrap();
        let store = TicketStore::open(dir.path()).unwrap();
        let ticket = make_ticket("Alex Moreno");

        store.save(&ticket).unwrap();
        assert_eq!(store.load(&ticket.id).unwrap(), ticket);
    }

    #[test]
    fn load_missing_ticket() {
        let dir = TempDir::new().unwrap();
        let store = TicketStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.load("nope"),
            Err(OffboardError::TicketNotFound(_))
        ));
    }

    #[test]
    fn find_by_prefix() {
        let dir = TempDir::new().unwrap();
        let store = TicketStore::open(dir.path()).unwrap();
        let ticket = make_ticket("Alex Moreno");
        store.save(&ticket).unwrap();

        let found = store.find(&ticket.id[..8]).unwrap();
        assert_eq!(found.id, ticket.id);
    }

    #[test]
    fn list_returns_every_ticket() {
        let dir = TempDir::new().unwrap();
        let store = TicketStore::open(dir.path().join("nested")).unwrap();
        store.save(&make_ticket("One")).unwrap();
        store.save(&make_ticket("Two")).unwrap();

        let tickets = store.list().unwrap();
        assert_eq!(tickets.len(), 2);
        assert!(!dir.path().join("nested").join("x.json.tmp").exists());
    }

    #[test]
    fn blank_id_is_rejected_even_with_one_ticket() {
        let dir = TempDir::new().unwrap();
        let store = TicketStore::open(dir.path()).unwrap();
        store.save(&make_ticket("Alex Moreno")).unwrap();

        assert!(matches!(store.find(""), Err(OffboardError::TicketNotFound(_))));
        assert!(matches!(store.find("  "), Err(OffboardError::TicketNotFound(_))));
    }

    #[test]
    fn shared_prefix_is_reported_as_ambiguous() {
        let dir = TempDir::new().unwrap();
        let store = TicketStore::open(dir.path()).unwrap();
        let mut one = make_ticket("One");
        one.id = "abc-111".into();
        let mut two = make_ticket("Two");
        two.id = "abc-222".into();
        store.save(&one).unwrap();
        store.save(&two).unwrap();

        match store.find("abc") {
            Err(OffboardError::AmbiguousTicket { prefix, count }) => {
                assert_eq!(prefix, "abc");
                assert_eq!(count, 2);
            }
            other => panic!("expected AmbiguousTicket, got {other:?}"),
        }
        assert_eq!(store.find("abc-2").unwrap().id, "abc-222");
        assert!(matches!(store.find("zzz"), Err(OffboardError::TicketNotFound(_))));
    }
}
