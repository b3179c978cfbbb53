//! Client core of SI2G Assistant.
//!
//! The crate holds the screen state holders of the application and the
//! contract they need from the remote document store. The holders are one
//! generic state machine ([`Holder`]) specialised by a [`Draft`] per entity:
//! bug tickets, persons and suggestions. The greetings screen reuses the same
//! list machinery for its read-only announcement feed.
//!
//! The crate never talks to the network itself: a [`Gateway`] is handed in,
//! either the in-process [`MemoryStore`] or an HTTP client living in another
//! crate.

pub use api_types::{
    announcement::Announcement,
    bug_ticket::{BugTicket, BugTicketCategory, BugTicketPriority},
    person::{Person, PersonRole},
    suggestion::Suggestion,
    user::User,
};
pub use bug_tickets::{BugTicketDraft, BugTicketEdit, BugTicketField, ResolutionForm};
pub use error::GatewayError;
pub use gateway::{
    Gateway, LoadResult, LoadSender, LoadStream, SubmitGateway, UpdateGateway,
    memory::MemoryStore,
};
pub use greetings::{Greeting, GreetingsHolder, GreetingsState};
pub use holder::{
    DEFAULT_LOADING_DELAY, Draft, Filter, FormState, Holder, HolderOptions, ListPhase, ListState,
    Scope, Submission, UiState, WriteStatus,
};
pub use persons::{PersonDraft, PersonEdit, PersonField};
pub use record::Record;
pub use session::{Audit, Clock, Session};
pub use suggestions::{SuggestionDraft, SuggestionEdit, SuggestionField};
pub use validate::ValidationReport;

pub mod bug_tickets;
mod error;
pub mod gateway;
pub mod greetings;
pub mod holder;
pub mod persons;
mod record;
mod session;
pub mod suggestions;
pub mod validate;

pub type BugTicketsHolder<G> = Holder<BugTicketDraft, G>;
pub type PersonsHolder<G> = Holder<PersonDraft, G>;
pub type SuggestionsHolder<G> = Holder<SuggestionDraft, G>;
