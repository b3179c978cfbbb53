//! Explicit session context handed to every holder.
//!
//! Writes are stamped with the values found here; none of them is editable
//! by the user.

use api_types::user::User;
use chrono::{DateTime, Utc};

/// Source of the wall-clock time used for audit stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => *at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    user: User,
    clock: Clock,
}

/// Audit values attached when a draft is finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audit {
    pub mail: String,
    pub academy: Option<String>,
    pub user_id: Option<String>,
    pub at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self {
            user,
            clock: Clock::System,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn audit(&self) -> Audit {
        Audit {
            mail: self.user.mail.clone(),
            academy: self.user.academy.clone(),
            user_id: self.user.id.clone(),
            at: self.now(),
        }
    }
}
