//! Job seeker dashboard: open jobs, own applications, and applying.

use super::forms;
use super::{day, settle, status_badge, truncate, OrFail, Screen, ViewError};
use crate::api::models::{Application, ApplyRequest, JobPost};
use crate::api::{ApiClient, ApiError};
use crate::session::User;

#[derive(Debug, Default)]
pub struct EmployeeDashboard {
    pub jobs: Vec<JobPost>,
    pub applications: Vec<Application>,
    pub notices: Vec<String>,
}

impl EmployeeDashboard {
    pub fn load(client: &ApiClient, user: &User) -> Result<Self, ApiError> {
        let mut notices = Vec::new();
        let loaded = (|| -> Result<_, ApiError> {
            Ok((
                client.jobs().all()?,
                client.applications().by_employee(&user.email)?,
            ))
        })();
        let (jobs, applications) = settle(loaded, "Error fetching data", &mut notices)?;
        Ok(Self {
            jobs,
            applications,
            notices,
        })
    }

    pub fn has_applied(&self, job_id: i64) -> bool {
        self.applications.iter().any(|a| a.job_id == Some(job_id))
    }

    fn count_with_status(&self, status: &str) -> usize {
        self.applications.iter().filter(|a| a.has_status(status)).count()
    }

    pub fn render(&self, user: &User, search: &str) -> String {
        let mut screen = Screen::new("Employee Dashboard");
        screen.line(&format!("Welcome, {}!", user.name));
        screen.notices(&self.notices);
        screen.blank();
        screen
            .stat("Available Jobs", self.jobs.len())
            .stat("My Applications", self.applications.len())
            .stat("Shortlisted", self.count_with_status("SHORTLISTED"));

        screen.section("My Applications");
        if self.applications.is_empty() {
            screen.line("No applications yet");
        }
        for app in &self.applications {
            let status = app.status.as_deref().unwrap_or("UNKNOWN");
            screen.line(&format!(
                "  Job ID: {:<6} Status: {} [{}]",
                app.job_id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
                status,
                status_badge(status)
            ));
        }

        let title = if search.trim().is_empty() {
            "Available Jobs".to_string()
        } else {
            format!("Available Jobs matching '{}'", search.trim())
        };
        screen.section(&title);
        let matching: Vec<&JobPost> = self.jobs.iter().filter(|j| j.matches(search)).collect();
        if matching.is_empty() {
            screen.line("No jobs found");
        }
        for job in matching {
            let applied = job.id.is_some_and(|id| self.has_applied(id));
            screen.line(&format!(
                "  #{} {} at {}",
                job.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
                job.job_title.as_deref().unwrap_or("Untitled"),
                job.company_name.as_deref().unwrap_or("Unknown company"),
            ));
            screen.line(&format!(
                "      Location: {}  Type: {}  Posted: {}",
                job.job_location.as_deref().unwrap_or("-"),
                job.job_type.as_deref().unwrap_or("-"),
                day(&job.posted_date),
            ));
            if let Some(desc) = &job.job_description {
                screen.line(&format!("      {}", truncate(desc, 100)));
            }
            screen.line(if applied {
                "      [Applied]"
            } else {
                "      Apply Now: /apply <job id>"
            });
        }
        screen.finish()
    }
}

/// Which job field a backend search matches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBy {
    Company,
    Title,
    Location,
}

impl SearchBy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "company" => Some(SearchBy::Company),
            "title" => Some(SearchBy::Title),
            "location" => Some(SearchBy::Location),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SearchBy::Company => "company",
            SearchBy::Title => "title",
            SearchBy::Location => "location",
        }
    }
}

/// Ask the backend for matching job posts
pub fn search(client: &ApiClient, by: SearchBy, term: &str) -> Result<String, ViewError> {
    let term = forms::require("search term", term)?;
    let jobs = client.jobs();
    let found = match by {
        SearchBy::Company => jobs.search_by_company(&term),
        SearchBy::Title => jobs.search_by_title(&term),
        SearchBy::Location => jobs.search_by_location(&term),
    }
    .or_fail("Error searching jobs")?;

    let mut screen = Screen::new(&format!("Jobs by {} '{}'", by.label(), term));
    if found.is_empty() {
        screen.line("No jobs found");
    }
    for job in &found {
        screen.line(&format!(
            "  #{} {} at {} ({})",
            job.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
            job.job_title.as_deref().unwrap_or("Untitled"),
            job.company_name.as_deref().unwrap_or("Unknown company"),
            job.job_location.as_deref().unwrap_or("-"),
        ));
    }
    Ok(screen.finish())
}

/// Submit an application for `job_id`
pub fn apply(client: &ApiClient, user: &User, job_id: &str) -> Result<String, ViewError> {
    let job_id = forms::id("job id", job_id)?;

    let existing = client
        .applications()
        .by_employee(&user.email)
        .or_fail("Failed to submit application")?;
    if existing.iter().any(|a| a.job_id == Some(job_id)) {
        return Err(ViewError::Refused(format!(
            "You have already applied to job {}",
            job_id
        )));
    }

    client
        .applications()
        .apply(&ApplyRequest {
            job_id,
            employee_email: user.email.clone(),
            resume_url: String::new(),
        })
        .or_fail("Failed to submit application")?;
    Ok("Application submitted successfully!".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::testing::FakeTransport;
    use crate::api::client::Body;
    use crate::session::Role;
    use serde_json::json;

    fn user() -> User {
        User {
            id: 2,
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            role: Role::Employee,
        }
    }

    fn client(t: &FakeTransport) -> ApiClient {
        ApiClient::new("http://x/api", Box::new(t.clone()))
    }

    #[test]
    fn test_load_and_render() {
        let t = FakeTransport::new();
        t.reply_json(
            200,
            json!([
                {"id": 1, "jobTitle": "Rust Engineer", "companyName": "Acme", "jobLocation": "Pune",
                 "jobType": "JOB", "postedDate": "2026-10-01"},
                {"id": 2, "jobTitle": "Data Intern", "companyName": "Globex", "jobLocation": "Delhi",
                 "jobType": "INTERNSHIP"}
            ]),
        )
        .reply_json(200, json!([{"id": 9, "jobId": 1, "status": "SHORTLISTED"}]));

        let dash = EmployeeDashboard::load(&client(&t), &user()).unwrap();
        assert_eq!(t.paths(), vec!["/jobposts", "/applications/job/asha%40example.com"]);
        assert!(dash.has_applied(1));
        assert!(!dash.has_applied(2));

        let text = dash.render(&user(), "");
        assert!(text.contains("Welcome, Asha!"));
        assert!(text.contains("Status: SHORTLISTED [success]"));
        assert!(text.contains("[Applied]"));
        assert!(text.contains("Data Intern"));

        let filtered = dash.render(&user(), "globex");
        assert!(filtered.contains("Data Intern"));
        assert!(!filtered.contains("Rust Engineer"));
    }

    #[test]
    fn test_load_failure_renders_empty_with_notice() {
        let t = FakeTransport::new();
        t.reply(200, "[]").reply(500, "");
        let dash = EmployeeDashboard::load(&client(&t), &user()).unwrap();
        assert!(dash.jobs.is_empty());
        assert_eq!(dash.notices, vec!["Error fetching data".to_string()]);
        assert!(dash.render(&user(), "").contains("! Error fetching data"));
    }

    #[test]
    fn test_load_unauthorized_propagates() {
        let t = FakeTransport::new();
        t.reply(401, "");
        assert!(matches!(
            EmployeeDashboard::load(&client(&t), &user()),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_backend_search() {
        let t = FakeTransport::new();
        t.reply_json(200, json!([{"id": 3, "jobTitle": "SRE", "companyName": "Initech", "jobLocation": "Austin"}]));
        let text = search(&client(&t), SearchBy::Location, "Austin").unwrap();
        assert_eq!(t.paths(), vec!["/jobposts/search/Austin"]);
        assert!(text.contains("#3 SRE at Initech (Austin)"));
        assert_eq!(SearchBy::parse("TITLE"), Some(SearchBy::Title));
        assert_eq!(SearchBy::parse("salary"), None);
    }

    #[test]
    fn test_apply_posts_application() {
        let t = FakeTransport::new();
        t.reply(200, "[]").reply(200, "");
        let msg = apply(&client(&t), &user(), "4").unwrap();
        assert!(msg.contains("submitted"));
        assert_eq!(
            t.last().body,
            Body::Json(json!({"jobId": 4, "employeeEmail": "asha@example.com", "resumeURL": ""}))
        );
    }

    #[test]
    fn test_apply_twice_is_refused_locally() {
        let t = FakeTransport::new();
        t.reply_json(200, json!([{"id": 1, "jobId": 4, "status": "APPLIED"}]));
        let err = apply(&client(&t), &user(), "4").unwrap_err();
        assert!(matches!(err, ViewError::Refused(_)));
        assert_eq!(t.sent.borrow().len(), 1);
    }

    #[test]
    fn test_apply_backend_failure_message() {
        let t = FakeTransport::new();
        t.reply(200, "[]").reply(500, "");
        let err = apply(&client(&t), &user(), "4").unwrap_err();
        assert_eq!(err.to_string(), "Failed to submit application");
    }
}
