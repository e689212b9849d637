//! Reconciliation results.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Machine-readable disposition of one reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    EndpointOk,
    IncidentResolved,
    IncidentsNotConfigured,
    IncidentAlreadyExists,
    NotEnoughFailures,
    IncidentCreated,
    HandleNotFound,
    DbReadFailed,
    DbUpdateFailed,
    IncidentCreationFailed,
    IncidentResolutionFailed,
    IncidentCreatedDbFailed,
    IncidentResolvedDbFailed,
    PassOk,
    PartialFailure,
    ConfigurationError,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::EndpointOk => "endpoint ok",
            Tag::IncidentResolved => "incident resolved",
            Tag::IncidentsNotConfigured => "incidents not configured",
            Tag::IncidentAlreadyExists => "incident already exists",
            Tag::NotEnoughFailures => "not enough consequent failures",
            Tag::IncidentCreated => "incident created",
            Tag::HandleNotFound => "handle not found",
            Tag::DbReadFailed => "db read failed",
            Tag::DbUpdateFailed => "db update failed",
            Tag::IncidentCreationFailed => "incident creation failed",
            Tag::IncidentResolutionFailed => "incident resolution failed",
            Tag::IncidentCreatedDbFailed => "incident created, db update failed",
            Tag::IncidentResolvedDbFailed => "incident resolved, db update failed",
            Tag::PassOk => "ok",
            Tag::PartialFailure => "partial failure",
            Tag::ConfigurationError => "configuration error",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Success or failure of a reconciliation, never an error crossing the
/// engine boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok(Tag),
    Failed(Tag),
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn tag(&self) -> Tag {
        match self {
            Outcome::Ok(tag) | Outcome::Failed(tag) => *tag,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().as_str())
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Outcome", 2)?;
        s.serialize_field("ok", &self.is_ok())?;
        s.serialize_field("tag", &self.tag())?;
        s.end()
    }
}
