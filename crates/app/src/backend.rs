//! Gateways the commands run against.

use std::{fs, path::Path, sync::Arc};

use api_types::{
    announcement::Announcement, bug_ticket::BugTicket, person::Person, suggestion::Suggestion,
};
use engine::{Gateway, MemoryStore, SubmitGateway, UpdateGateway};
use serde::{Deserialize, Serialize};
use store_client::{Collection, DocumentStoreClient};

use crate::{config::AppConfig, error::Result};

/// One gateway per collection.
pub trait Backend {
    type BugTickets: SubmitGateway<BugTicket> + UpdateGateway<BugTicket>;
    type Persons: SubmitGateway<Person> + UpdateGateway<Person>;
    type Suggestions: SubmitGateway<Suggestion>;
    type Announcements: Gateway<Announcement>;

    fn bug_tickets(&self) -> Arc<Self::BugTickets>;
    fn persons(&self) -> Arc<Self::Persons>;
    fn suggestions(&self) -> Arc<Self::Suggestions>;
    fn announcements(&self) -> Arc<Self::Announcements>;

    /// Called once the command is done.
    fn persist(&self) -> Result<()> {
        Ok(())
    }
}

pub struct HttpBackend {
    bug_tickets: Arc<Collection<BugTicket>>,
    persons: Arc<Collection<Person>>,
    suggestions: Arc<Collection<Suggestion>>,
    announcements: Arc<Collection<Announcement>>,
}

impl HttpBackend {
    pub fn new(settings: &AppConfig) -> Result<Self> {
        let client =
            DocumentStoreClient::new(&settings.base_url)?.with_poll_interval(settings.poll_interval());
        tracing::info!(base_url = %client.base_url(), "using http document store");
        Ok(Self {
            bug_tickets: Arc::new(client.collection()),
            persons: Arc::new(client.collection()),
            suggestions: Arc::new(client.collection()),
            announcements: Arc::new(client.collection()),
        })
    }
}

impl Backend for HttpBackend {
    type BugTickets = Collection<BugTicket>;
    type Persons = Collection<Person>;
    type Suggestions = Collection<Suggestion>;
    type Announcements = Collection<Announcement>;

    fn bug_tickets(&self) -> Arc<Self::BugTickets> {
        Arc::clone(&self.bug_tickets)
    }

    fn persons(&self) -> Arc<Self::Persons> {
        Arc::clone(&self.persons)
    }

    fn suggestions(&self) -> Arc<Self::Suggestions> {
        Arc::clone(&self.suggestions)
    }

    fn announcements(&self) -> Arc<Self::Announcements> {
        Arc::clone(&self.announcements)
    }
}

/// Content of the seed file of the memory store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub bug_tickets: Vec<BugTicket>,
    pub persons: Vec<Person>,
    pub suggestions: Vec<Suggestion>,
    pub announcements: Vec<Announcement>,
}

impl Seed {
    pub fn load(path: &str) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }
}

/// In-process stores, optionally loaded from and saved back to a seed file.
pub struct MemoryBackend {
    seed_path: Option<String>,
    bug_tickets: Arc<MemoryStore<BugTicket>>,
    persons: Arc<MemoryStore<Person>>,
    suggestions: Arc<MemoryStore<Suggestion>>,
    announcements: Arc<MemoryStore<Announcement>>,
}

impl MemoryBackend {
    pub fn new(seed_path: Option<String>) -> Result<Self> {
        let seed = match &seed_path {
            Some(path) => Seed::load(path)?,
            None => Seed::default(),
        };
        tracing::info!(seed = ?seed_path, "using memory document store");
        Ok(Self::from_seed(seed_path, seed))
    }

    pub(crate) fn from_seed(seed_path: Option<String>, seed: Seed) -> Self {
        Self {
            seed_path,
            bug_tickets: Arc::new(MemoryStore::with_documents(seed.bug_tickets)),
            persons: Arc::new(MemoryStore::with_documents(seed.persons)),
            suggestions: Arc::new(MemoryStore::with_documents(seed.suggestions)),
            announcements: Arc::new(MemoryStore::with_documents(seed.announcements)),
        }
    }

    pub fn snapshot(&self) -> Seed {
        Seed {
            bug_tickets: self.bug_tickets.documents(),
            persons: self.persons.documents(),
            suggestions: self.suggestions.documents(),
            announcements: self.announcements.documents(),
        }
    }
}

impl Backend for MemoryBackend {
    type BugTickets = MemoryStore<BugTicket>;
    type Persons = MemoryStore<Person>;
    type Suggestions = MemoryStore<Suggestion>;
    type Announcements = MemoryStore<Announcement>;

    fn bug_tickets(&self) -> Arc<Self::BugTickets> {
        Arc::clone(&self.bug_tickets)
    }

    fn persons(&self) -> Arc<Self::Persons> {
        Arc::clone(&self.persons)
    }

    fn suggestions(&self) -> Arc<Self::Suggestions> {
        Arc::clone(&self.suggestions)
    }

    fn announcements(&self) -> Arc<Self::Announcements> {
        Arc::clone(&self.announcements)
    }

    fn persist(&self) -> Result<()> {
        if let Some(path) = &self.seed_path {
            self.snapshot().save(path)?;
            tracing::debug!(path, "memory store saved");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_seed_file_is_empty() {
        let seed = Seed::load("does/not/exist.json").unwrap();
        assert!(seed.bug_tickets.is_empty());
        assert!(seed.announcements.is_empty());
    }

    #[test]
    fn seed_documents_get_identifiers() {
        let seed: Seed = serde_json::from_str(
            r#"{ "suggestions": [{ "subject": "Dark mode", "body": "please" }] }"#,
        )
        .unwrap();
        let backend = MemoryBackend::from_seed(None, seed);
        let suggestions = backend.snapshot().suggestions;
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].id.is_some());
    }

    #[test]
    fn seed_round_trips_through_a_file() {
        let path = std::env::temp_dir().join(format!("si2g_seed_{}.json", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let backend = MemoryBackend::from_seed(
            Some(path.clone()),
            Seed {
                persons: vec![Person {
                    firstname: Some("Marie".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            },
        );
        backend.persist().unwrap();

        let reloaded = Seed::load(&path).unwrap();
        assert_eq!(reloaded.persons, backend.snapshot().persons);
        let _ = fs::remove_file(&path);
    }
}
