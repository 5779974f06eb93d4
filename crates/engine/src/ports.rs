//! Collaborator ports consumed from the surrounding system.
//!
//! The engine treats these as pure query interfaces: it never opens
//! transactions or manages locking over the underlying stores. Static
//! implementations ship for tests and embedded hosts.

use planforge_core::{Calendar, EngineResult, ProjectId, TeamMember, TenantId};

/// Read accessor for roster/team data.
pub trait RosterProvider: Send + Sync {
    fn roster(&self, tenant_id: TenantId, project_id: ProjectId) -> EngineResult<Vec<TeamMember>>;
}

/// Read accessor for calendar/holiday data.
pub trait CalendarProvider: Send + Sync {
    fn calendar(&self, tenant_id: TenantId) -> EngineResult<Calendar>;
}

/// Fixed roster, returned for every project.
#[derive(Debug, Clone, Default)]
pub struct StaticRoster {
    members: Vec<TeamMember>,
}

impl StaticRoster {
    pub fn new(members: Vec<TeamMember>) -> Self {
        Self { members }
    }
}

impl RosterProvider for StaticRoster {
    fn roster(&self, _: TenantId, _: ProjectId) -> EngineResult<Vec<TeamMember>> {
        Ok(self.members.clone())
    }
}

/// Fixed calendar, returned for every tenant.
#[derive(Debug, Clone)]
pub struct StaticCalendar {
    calendar: Calendar,
}

impl StaticCalendar {
    pub fn new(calendar: Calendar) -> Self {
        Self { calendar }
    }
}

impl Default for StaticCalendar {
    fn default() -> Self {
        Self::new(Calendar::standard())
    }
}

impl CalendarProvider for StaticCalendar {
    fn calendar(&self, _: TenantId) -> EngineResult<Calendar> {
        Ok(self.calendar.clone())
    }
}
