use std::time::Duration;

use api_types::{
    bug_ticket::{BugTicketCategory, BugTicketPriority},
    person::PersonRole,
    user::User,
};
use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use engine::{HolderOptions, Scope, Session};
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/si2g_assistant.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Http,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub store: StoreKind,
    /// JSON file holding the documents of the memory store.
    pub seed: Option<String>,
    pub mail: String,
    pub academy: Option<String>,
    pub user_id: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub timezone: String,
    pub level: String,
    pub poll_interval_ms: u64,
    pub loading_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            store: StoreKind::Http,
            seed: None,
            mail: String::new(),
            academy: None,
            user_id: None,
            firstname: None,
            lastname: None,
            timezone: "Europe/Paris".to_string(),
            level: "info".to_string(),
            poll_interval_ms: 5_000,
            loading_delay_ms: 500,
        }
    }
}

impl AppConfig {
    pub fn session(&self) -> Session {
        Session::new(User {
            id: self.user_id.clone(),
            mail: self.mail.clone(),
            academy: self.academy.clone(),
            firstname: self.firstname.clone(),
            lastname: self.lastname.clone(),
        })
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| AppError::Timezone(self.timezone.clone()))
    }

    pub fn holder_options(&self, mine: bool) -> HolderOptions {
        HolderOptions {
            loading_delay: Duration::from_millis(self.loading_delay_ms),
            scope: if mine { Scope::Mine } else { Scope::All },
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Parser)]
#[command(name = "si2g_assistant", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL of the document store.
    #[arg(long)]
    base_url: Option<String>,
    /// Override the mail of the signed-in user.
    #[arg(long)]
    mail: Option<String>,
    /// Override the academy of the signed-in user.
    #[arg(long)]
    academy: Option<String>,
    /// Document store to talk to.
    #[arg(long, value_enum)]
    store: Option<StoreKind>,
    /// Override timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Welcome line and latest announcements.
    Greet {
        #[arg(long)]
        search: Option<String>,
    },
    #[command(subcommand)]
    Bugs(BugsCommand),
    #[command(subcommand)]
    Persons(PersonsCommand),
    #[command(subcommand)]
    Suggestions(SuggestionsCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum BugsCommand {
    List {
        #[arg(long)]
        search: Option<String>,
        /// Only the tickets reported by the signed-in user.
        #[arg(long)]
        mine: bool,
    },
    Report {
        #[arg(long)]
        category: Option<BugTicketCategory>,
        #[arg(long)]
        priority: Option<BugTicketPriority>,
        #[arg(long, default_value = "")]
        short_description: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Resolve {
        id: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum PersonsCommand {
    List {
        #[arg(long)]
        search: Option<String>,
        /// Only the persons tracked by the signed-in user.
        #[arg(long)]
        mine: bool,
    },
    Submit {
        #[arg(long)]
        role: Option<PersonRole>,
        #[arg(long, default_value = "")]
        firstname: String,
        #[arg(long, default_value = "")]
        lastname: String,
    },
    /// Mark a training module as validated for a person.
    Module {
        id: String,
        module: u32,
        /// Remove the module instead.
        #[arg(long)]
        unchecked: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SuggestionsCommand {
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        mine: bool,
    },
    Submit {
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        body: String,
    },
}

pub fn load() -> Result<(AppConfig, Command)> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("SI2G"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(mail) = args.mail {
        settings.mail = mail;
    }
    if let Some(academy) = args.academy {
        settings.academy = Some(academy);
    }
    if let Some(store) = args.store {
        settings.store = store;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }

    Ok((settings, args.command))
}
