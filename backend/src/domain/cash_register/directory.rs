//! Classification of registers for the operator's register picker.

use crate::domain::UserId;

use super::{CashSession, Register, SessionOwnership};

/// A register together with its currently open session, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSnapshot {
    /// The register itself.
    pub register: Register,
    /// Its open session, if one exists.
    pub open_session: Option<CashSession>,
}

/// How a register appears to the calling operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterAvailability {
    /// This terminal holds the marker for the open session and the caller
    /// opened it.
    MineAndOpen,
    /// A session is open that this terminal does not own.
    OpenByOther,
    /// No session is open.
    ClosedAvailable,
}

impl RegisterAvailability {
    /// Classify a snapshot for `user` on a terminal holding `ownership`.
    #[must_use]
    pub fn classify(
        snapshot: &RegisterSnapshot,
        user: &UserId,
        ownership: Option<&SessionOwnership>,
    ) -> Self {
        let Some(session) = snapshot.open_session.as_ref() else {
            return Self::ClosedAvailable;
        };
        let marked = ownership
            .is_some_and(|marker| marker.matches(snapshot.register.id(), session.id()));
        if marked && session.is_owned_by(user) {
            Self::MineAndOpen
        } else {
            Self::OpenByOther
        }
    }

    /// Wire name of the availability.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MineAndOpen => "mine_and_open",
            Self::OpenByOther => "open_by_other",
            Self::ClosedAvailable => "closed_available",
        }
    }
}

/// Actions the caller may take on a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterActions {
    /// Open the register, or re-attach to the caller's own session.
    pub open: bool,
    /// Record an expense against the open session.
    pub add_expense: bool,
    /// Close the open session.
    pub close: bool,
}

/// A classified register row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSummary {
    /// The classified register.
    pub register: Register,
    /// Its open session, if one exists.
    pub open_session: Option<CashSession>,
    /// How the register appears to the caller.
    pub availability: RegisterAvailability,
    /// What the caller may do next.
    pub actions: RegisterActions,
}

impl RegisterSummary {
    /// Classify a snapshot and derive the permitted actions.
    ///
    /// An open session that the caller started on another terminal (or whose
    /// marker was lost) is reported as `OpenByOther`, but `open` stays
    /// permitted so the caller can re-attach to it.
    #[must_use]
    pub fn classify(
        snapshot: RegisterSnapshot,
        user: &UserId,
        ownership: Option<&SessionOwnership>,
    ) -> Self {
        let availability = RegisterAvailability::classify(&snapshot, user, ownership);
        let actions = match availability {
            RegisterAvailability::ClosedAvailable => RegisterActions {
                open: true,
                ..RegisterActions::default()
            },
            RegisterAvailability::MineAndOpen => RegisterActions {
                open: false,
                add_expense: true,
                close: true,
            },
            RegisterAvailability::OpenByOther => RegisterActions {
                open: snapshot
                    .open_session
                    .as_ref()
                    .is_some_and(|session| session.is_owned_by(user)),
                ..RegisterActions::default()
            },
        };
        Self {
            register: snapshot.register,
            open_session: snapshot.open_session,
            availability,
            actions,
        }
    }
}
