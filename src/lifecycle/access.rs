//! Role-scoped access control for tickets
//!
//! The whole authorization matrix lives in [`rule`]. Ownership is decided
//! against the profile resolved from the principal's identity, never against
//! an ID supplied with the request.

use crate::core::{Action, ClientId, Principal, Role, TechnicianId, Ticket, TicketScope};
use crate::error::{HelpdeskError, Result};
use crate::storage::IdentityResolver;
use tracing::{debug, warn};

/// Outcome of the role/action table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Permitted on any ticket
    Allow,
    /// Permitted only on tickets linked to the principal's own profile
    Owner,
    Deny,
}

/// The authorization matrix
#[must_use]
pub const fn rule(role: Role, action: Action) -> Rule {
    use Action::*;

    match (role, action) {
        (Role::Admin, _) => Rule::Allow,

        (Role::Technician, ReadOne | ReadCollection | UpdateStatus) => Rule::Owner,
        (Role::Technician, Create | UpdateFields | AssignTechnician | Delete) => Rule::Deny,

        (Role::Client, Create | ReadOne | ReadCollection) => Rule::Owner,
        (Role::Client, UpdateFields | UpdateStatus | AssignTechnician | Delete) => Rule::Deny,
    }
}

/// A principal resolved to the profile it acts through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Admin,
    Client(ClientId),
    Technician(TechnicianId),
}

impl Actor {
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Admin => Role::Admin,
            Self::Client(_) => Role::Client,
            Self::Technician(_) => Role::Technician,
        }
    }
}

/// What an action is performed on
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// A ticket about to be created
    NewTicket,
    Ticket(&'a Ticket),
    /// A collection read with the scope the caller asked for
    Collection(&'a TicketScope),
}

/// How a permitted action must proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// No restriction
    Full,
    /// Restricted to this client's tickets; creations are filed for this client
    AsClient(ClientId),
    /// Restricted to this technician's assigned tickets
    AsTechnician(TechnicianId),
}

impl Grant {
    /// The scope a collection read actually covers
    #[must_use]
    pub fn scope(&self, requested: &TicketScope) -> TicketScope {
        match self {
            Self::Full => *requested,
            Self::AsClient(id) => TicketScope::Client(*id),
            Self::AsTechnician(id) => TicketScope::Technician(*id),
        }
    }
}

/// Evaluate the matrix and ownership for an already-resolved actor
pub fn check(actor: &Actor, action: Action, resource: Resource<'_>) -> Result<Grant> {
    match rule(actor.role(), action) {
        Rule::Deny => Err(role_denied(actor.role(), action)),
        Rule::Allow => Ok(Grant::Full),
        Rule::Owner => check_ownership(actor, action, resource),
    }
}

fn check_ownership(actor: &Actor, action: Action, resource: Resource<'_>) -> Result<Grant> {
    let denied = |reason: &str| Err(HelpdeskError::forbidden(action, reason));

    match (actor, resource) {
        (Actor::Admin, _) => Ok(Grant::Full),

        (Actor::Client(me), Resource::NewTicket) => Ok(Grant::AsClient(*me)),
        (Actor::Client(me), Resource::Ticket(ticket)) if ticket.belongs_to(me) => {
            Ok(Grant::AsClient(*me))
        },
        (Actor::Client(_), Resource::Ticket(_)) => denied("You do not have access to this ticket"),
        (Actor::Client(me), Resource::Collection(TicketScope::All)) => Ok(Grant::AsClient(*me)),
        (Actor::Client(me), Resource::Collection(TicketScope::Client(id))) if id == me => {
            Ok(Grant::AsClient(*me))
        },
        (Actor::Client(_), Resource::Collection(_)) => denied("You can only see your own tickets"),

        (Actor::Technician(me), Resource::Ticket(ticket)) if ticket.is_assigned_to(me) => {
            Ok(Grant::AsTechnician(*me))
        },
        (Actor::Technician(_), Resource::Ticket(_)) => {
            denied("You can only access tickets assigned to you")
        },
        (Actor::Technician(me), Resource::Collection(TicketScope::All)) => {
            Ok(Grant::AsTechnician(*me))
        },
        (Actor::Technician(me), Resource::Collection(TicketScope::Technician(id))) if id == me => {
            Ok(Grant::AsTechnician(*me))
        },
        (Actor::Technician(_), Resource::Collection(_)) => {
            denied("You can only see tickets assigned to you")
        },
        (Actor::Technician(_), Resource::NewTicket) => Err(role_denied(Role::Technician, action)),
    }
}

fn role_denied(role: Role, action: Action) -> HelpdeskError {
    HelpdeskError::forbidden(action, format!("the {role} role may not {action}"))
}

/// Gatekeeper combining the matrix with identity-to-profile lookup
pub struct AccessAuthorizer<'a, R: ?Sized> {
    identities: &'a R,
}

impl<'a, R> AccessAuthorizer<'a, R>
where
    R: IdentityResolver + ?Sized,
{
    #[must_use]
    pub const fn new(identities: &'a R) -> Self {
        Self { identities }
    }

    /// Resolve the profile a principal acts through.
    ///
    /// A technician or client without a linked profile is forbidden, not
    /// "not found", so callers learn nothing about which records exist.
    pub async fn actor(&self, principal: &Principal) -> Result<Actor> {
        match principal.role {
            Role::Admin => Ok(Actor::Admin),
            Role::Client => self
                .identities
                .client_for_user(&principal.user_id)
                .await?
                .map(Actor::Client)
                .ok_or_else(|| {
                    HelpdeskError::forbidden("resolve profile", "No client profile is linked to this user")
                }),
            Role::Technician => self
                .identities
                .technician_for_user(&principal.user_id)
                .await?
                .map(Actor::Technician)
                .ok_or_else(|| {
                    HelpdeskError::forbidden(
                        "resolve profile",
                        "No technician profile is linked to this user",
                    )
                }),
        }
    }

    /// Role gate that runs before any record is loaded. Rejects denied cells
    /// outright, then resolves the actor.
    pub async fn admit(&self, principal: &Principal, action: Action) -> Result<Actor> {
        if rule(principal.role, action) == Rule::Deny {
            warn!(user = %principal.user_id, role = %principal.role, %action, "Role not permitted");
            return Err(role_denied(principal.role, action));
        }
        self.actor(principal).await
    }

    /// Full decision for a principal, an action and its target
    pub async fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        resource: Resource<'_>,
    ) -> Result<Grant> {
        let actor = self.admit(principal, action).await?;
        let grant = check(&actor, action, resource);
        match &grant {
            Ok(g) => debug!(user = %principal.user_id.short(), %action, grant = ?g, "Access granted"),
            Err(e) => warn!(user = %principal.user_id, %action, error = %e, "Access denied"),
        }
        grant
    }
}
