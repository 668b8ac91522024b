use crate::applications::repo_types::{ApplicationStatus, JobApplication};

/// Dashboard filter applied locally to a fetched list.
///
/// Status must match exactly; search is a case-insensitive substring match
/// over the free-text fields. Both conditions must hold.
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    pub search: Option<String>,
}

impl ApplicationFilter {
    pub fn new(status: Option<ApplicationStatus>, search: Option<&str>) -> Self {
        let search = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        Self { status, search }
    }

    pub fn matches(&self, app: &JobApplication) -> bool {
        if self.status.is_some_and(|s| s != app.status) {
            return false;
        }
        let Some(needle) = self.search.as_deref() else {
            return true;
        };
        [
            Some(app.company.as_str()),
            Some(app.role_title.as_str()),
            app.location.as_deref(),
            app.salary_range.as_deref(),
            app.notes.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
    }

    pub fn apply<'a>(&self, apps: &'a [JobApplication]) -> Vec<&'a JobApplication> {
        apps.iter().filter(|a| self.matches(a)).collect()
    }
}

/// Count per status, in lifecycle order, including zeros.
pub fn status_counts(apps: &[JobApplication]) -> Vec<(ApplicationStatus, usize)> {
    ApplicationStatus::ALL
        .into_iter()
        .map(|st| (st, apps.iter().filter(|a| a.status == st).count()))
        .collect()
}
