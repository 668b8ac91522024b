use std::fmt::Write as _;

use crate::{
    applications::repo_types::{ApplicationStatus, JobApplication},
    client::filter::status_counts,
};

/// One block per application: headline, location and salary, link, notes.
pub fn render_list(apps: &[&JobApplication]) -> String {
    if apps.is_empty() {
        return "No applications yet.\n".to_string();
    }
    let mut out = String::new();
    for app in apps {
        let _ = writeln!(
            out,
            "[{:<8}] {} - {}",
            app.status.as_str(),
            app.company,
            app.role_title
        );
        let mut line = app.location.clone().unwrap_or_else(|| "No location".into());
        if let Some(salary) = &app.salary_range {
            let _ = write!(line, " • {salary}");
        }
        let _ = writeln!(out, "           {line}");
        if let Some(url) = &app.url {
            let _ = writeln!(out, "           {url}");
        }
        if let Some(notes) = &app.notes {
            for note_line in notes.lines() {
                let _ = writeln!(out, "           > {note_line}");
            }
        }
        let _ = writeln!(out, "           id: {}", app.id);
    }
    out
}

/// e.g. `3 total | SAVED 1 | APPLIED 2`; statuses with no entries are skipped.
pub fn render_summary(all: &[JobApplication]) -> String {
    let mut parts = vec![format!("{} total", all.len())];
    parts.extend(
        status_counts(all)
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .map(|(st, n): (ApplicationStatus, usize)| format!("{st} {n}")),
    );
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn app(status: ApplicationStatus) -> JobApplication {
        JobApplication {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            company: "Acme".into(),
            role_title: "Engineer".into(),
            location: None,
            status,
            url: None,
            salary_range: Some("$90k-$110k".into()),
            notes: Some("line one\nline two".into()),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn empty_list_message() {
        assert_eq!(render_list(&[]), "No applications yet.\n");
    }

    #[test]
    fn renders_headline_and_details() {
        let a = app(ApplicationStatus::Phone);
        let out = render_list(&[&a]);
        assert!(out.starts_with("[PHONE   ] Acme - Engineer\n"));
        assert!(out.contains("No location • $90k-$110k"));
        assert!(out.contains("> line one\n"));
        assert!(out.contains("> line two\n"));
        assert!(out.contains(&Uuid::nil().to_string()));
    }

    #[test]
    fn summary_skips_empty_statuses() {
        let all = vec![
            app(ApplicationStatus::Saved),
            app(ApplicationStatus::Applied),
            app(ApplicationStatus::Applied),
        ];
        assert_eq!(render_summary(&all), "3 total | SAVED 1 | APPLIED 2");
        assert_eq!(render_summary(&[]), "0 total");
    }
}
