//! Subcommand handlers: each one drives a holder through its intents and
//! renders the snapshot it settles on.

use std::{collections::BTreeMap, fmt::Debug, sync::Arc};

use api_types::{bug_ticket::BugTicket, person::Person, suggestion::Suggestion};
use chrono_tz::Tz;
use engine::{
    BugTicketDraft, BugTicketEdit, Draft, Filter, Gateway, GreetingsHolder, Holder, ListPhase,
    PersonDraft, PersonEdit, Session, Submission, SubmitGateway, SuggestionDraft, SuggestionEdit,
    UiState, UpdateGateway, WriteStatus,
};

use crate::{
    backend::Backend,
    config::{AppConfig, BugsCommand, Command, PersonsCommand, SuggestionsCommand},
    error::{AppError, Result},
    render,
};

pub async fn run<B: Backend>(backend: &B, settings: &AppConfig, command: Command) -> Result<String> {
    let tz = settings.timezone()?;
    let session = settings.session();
    tracing::debug!(?command, "running command");

    let output = match command {
        Command::Greet { search } => greet(backend, settings, &session, search, tz).await?,
        Command::Bugs(command) => {
            bugs(backend.bug_tickets(), settings, session, command, tz).await?
        }
        Command::Persons(command) => {
            persons(backend.persons(), settings, session, command, tz).await?
        }
        Command::Suggestions(command) => {
            suggestions(backend.suggestions(), settings, session, command, tz).await?
        }
    };

    backend.persist()?;
    Ok(output)
}

fn submit_status<D: Draft>(state: &UiState<D>) -> &WriteStatus {
    &state.form.submit
}

fn update_status<D: Draft>(state: &UiState<D>) -> &WriteStatus {
    &state.update
}

/// Wait for the first list outcome.
async fn listed<D, G>(holder: &Holder<D, G>) -> Result<UiState<D>>
where
    D: Draft,
    G: Gateway<D::Record>,
{
    let state = holder
        .wait_for(|s| s.list.phase() != ListPhase::Loading)
        .await;
    match &state.list.failure {
        Some(failure) => Err(AppError::Store(failure.clone())),
        None => Ok(state),
    }
}

/// Wait for the running write picked by `status`, returns the written id.
async fn written<D, G>(
    holder: &Holder<D, G>,
    status: fn(&UiState<D>) -> &WriteStatus,
) -> Result<String>
where
    D: Draft,
    G: Gateway<D::Record>,
{
    let state = holder.wait_for(|s| !status(s).is_loading).await;
    let status = status(&state);
    match (&status.failure, &status.last_written) {
        (Some(failure), _) => Err(AppError::Store(failure.clone())),
        (None, Some(id)) => Ok(id.clone()),
        (None, None) => Err(AppError::Store("write returned no identifier".to_string())),
    }
}

fn rejected<F: Debug>(errors: &BTreeMap<F, String>) -> AppError {
    AppError::Rejected(render::field_errors(errors))
}

async fn greet<B: Backend>(
    backend: &B,
    settings: &AppConfig,
    session: &Session,
    search: Option<String>,
    tz: Tz,
) -> Result<String> {
    let announcements = backend.announcements();
    let mut holder =
        GreetingsHolder::new(announcements.as_ref(), session, settings.holder_options(false));
    if let Some(search) = search {
        holder.on_filter_change(Filter::Search(search));
    }
    let state = holder
        .wait_for(|s| s.feed.phase() != ListPhase::Loading)
        .await;
    Ok(render::greetings(&state, tz))
}

async fn bugs<G>(
    gateway: Arc<G>,
    settings: &AppConfig,
    session: Session,
    command: BugsCommand,
    tz: Tz,
) -> Result<String>
where
    G: SubmitGateway<BugTicket> + UpdateGateway<BugTicket>,
{
    match command {
        BugsCommand::List { search, mine } => {
            let mut holder =
                Holder::<BugTicketDraft, _>::new(gateway, session, settings.holder_options(mine));
            if let Some(search) = search {
                holder.on_filter_change(Filter::Search(search));
            }
            let state = listed(&holder).await?;
            Ok(render::bug_tickets(&state.list, tz))
        }
        BugsCommand::Report {
            category,
            priority,
            short_description,
            description,
        } => {
            let mut holder =
                Holder::<BugTicketDraft, _>::new(gateway, session, settings.holder_options(false));
            if let Some(category) = category {
                holder.on_field_change(BugTicketEdit::Category(category));
            }
            if let Some(priority) = priority {
                holder.on_field_change(BugTicketEdit::Priority(priority));
            }
            holder.on_field_change(BugTicketEdit::ShortDescription(short_description));
            holder.on_field_change(BugTicketEdit::Description(description));

            if holder.on_submit() != Submission::Started {
                return Err(rejected(&holder.snapshot().form.field_errors));
            }
            let id = written(&holder, submit_status).await?;
            Ok(format!("bug ticket {id} reported"))
        }
        BugsCommand::Resolve { id, comment } => {
            let mut holder =
                Holder::<BugTicketDraft, _>::new(gateway, session, settings.holder_options(false));
            listed(&holder).await?;
            holder.on_select(Some(&id));
            if holder.snapshot().list.selected.is_none() {
                return Err(AppError::NotFound(id));
            }

            holder.on_resolved_comment_change(&comment);
            match holder.on_resolve() {
                Submission::Started => {}
                Submission::Invalid => {
                    let detail = holder.snapshot().detail;
                    return Err(AppError::Rejected(
                        detail.comment_error.unwrap_or_default(),
                    ));
                }
                Submission::Unchanged => {
                    return Err(AppError::Rejected(format!(
                        "bug ticket {id} is already resolved"
                    )));
                }
                other => return Err(AppError::Rejected(format!("{other:?}"))),
            }
            written(&holder, update_status).await?;
            // The list catches up with the update on the next emission of the store.
            let state = holder
                .wait_for(|s| s.list.selected.as_ref().is_some_and(|t| t.is_resolved))
                .await;
            let ticket = state.list.selected.unwrap_or_default();
            Ok(format!(
                "bug ticket {id} resolved\n{}",
                render::bug_ticket_detail(&ticket, tz)
            ))
        }
    }
}

async fn persons<G>(
    gateway: Arc<G>,
    settings: &AppConfig,
    session: Session,
    command: PersonsCommand,
    tz: Tz,
) -> Result<String>
where
    G: SubmitGateway<Person> + UpdateGateway<Person>,
{
    match command {
        PersonsCommand::List { search, mine } => {
            let mut holder =
                Holder::<PersonDraft, _>::new(gateway, session, settings.holder_options(mine));
            if let Some(search) = search {
                holder.on_filter_change(Filter::Search(search));
            }
            let state = listed(&holder).await?;
            Ok(render::persons(&state.list, tz))
        }
        PersonsCommand::Submit {
            role,
            firstname,
            lastname,
        } => {
            let mut holder =
                Holder::<PersonDraft, _>::new(gateway, session, settings.holder_options(true));
            if let Some(role) = role {
                holder.on_field_change(PersonEdit::Role(role));
            }
            holder.on_field_change(PersonEdit::Firstname(firstname));
            holder.on_field_change(PersonEdit::Lastname(lastname));

            if holder.on_submit() != Submission::Started {
                return Err(rejected(&holder.snapshot().form.field_errors));
            }
            let id = written(&holder, submit_status).await?;
            Ok(format!("person {id} submitted"))
        }
        PersonsCommand::Module {
            id,
            module,
            unchecked,
        } => {
            let mut holder =
                Holder::<PersonDraft, _>::new(gateway, session, settings.holder_options(false));
            listed(&holder).await?;
            holder.on_select(Some(&id));

            match holder.on_module_toggle(module, !unchecked) {
                Submission::Started => {}
                Submission::NothingSelected => return Err(AppError::NotFound(id)),
                other => return Err(AppError::Rejected(format!("{other:?}"))),
            }
            written(&holder, update_status).await?;
            let verb = if unchecked { "removed from" } else { "validated for" };
            Ok(format!("module {module} {verb} person {id}"))
        }
    }
}

async fn suggestions<G>(
    gateway: Arc<G>,
    settings: &AppConfig,
    session: Session,
    command: SuggestionsCommand,
    tz: Tz,
) -> Result<String>
where
    G: SubmitGateway<Suggestion>,
{
    match command {
        SuggestionsCommand::List { search, mine } => {
            let mut holder =
                Holder::<SuggestionDraft, _>::new(gateway, session, settings.holder_options(mine));
            if let Some(search) = search {
                holder.on_filter_change(Filter::Search(search));
            }
            let state = listed(&holder).await?;
            Ok(render::suggestions(&state.list, tz))
        }
        SuggestionsCommand::Submit { subject, body } => {
            let mut holder =
                Holder::<SuggestionDraft, _>::new(gateway, session, settings.holder_options(false));
            holder.on_field_change(SuggestionEdit::Subject(subject));
            holder.on_field_change(SuggestionEdit::Body(body));

            if holder.on_submit() != Submission::Started {
                return Err(rejected(&holder.snapshot().form.field_errors));
            }
            let id = written(&holder, submit_status).await?;
            Ok(format!("suggestion {id} submitted"))
        }
    }
}
