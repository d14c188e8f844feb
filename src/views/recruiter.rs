//! Recruiter dashboard: own job posts, incoming applications, and triage.

use super::forms::{self, Form};
use super::{day, settle, status_badge, OrFail, Screen, ViewError};
use crate::api::models::{Application, JobPost, NewJobPost, StatusUpdate};
use crate::api::{ApiClient, ApiError};
use crate::session::User;
use chrono::Local;

const JOB_TYPES: &[&str] = &["JOB", "INTERNSHIP"];
const JOB_FIELDS: &[&str] = &[
    "jobTitle",
    "companyName",
    "jobLocation",
    "jobType",
    "jobDescription",
    "postedDate",
    "deadLineDate",
];

/// Status a recruiter can move an application to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Shortlist,
    Reject,
}

impl Verdict {
    pub fn status(&self) -> &'static str {
        match self {
            Verdict::Shortlist => "SHORTLISTED",
            Verdict::Reject => "REJECTED",
        }
    }
}

#[derive(Debug, Default)]
pub struct RecruiterDashboard {
    pub jobs: Vec<JobPost>,
    pub applications: Vec<Application>,
    pub notices: Vec<String>,
}

impl RecruiterDashboard {
    pub fn load(client: &ApiClient, user: &User) -> Result<Self, ApiError> {
        let mut notices = Vec::new();
        let loaded = (|| -> Result<_, ApiError> {
            Ok((
                client.jobs().by_recruiter(&user.email)?,
                client.applications().by_recruiter(&user.email)?,
            ))
        })();
        let (jobs, applications) = settle(loaded, "Error fetching data", &mut notices)?;
        Ok(Self {
            jobs,
            applications,
            notices,
        })
    }

    fn applications_for(&self, job_id: Option<i64>) -> usize {
        match job_id {
            Some(id) => self
                .applications
                .iter()
                .filter(|a| a.job_id == Some(id))
                .count(),
            None => 0,
        }
    }

    pub fn render(&self, user: &User) -> String {
        let mut screen = Screen::new("Recruiter Dashboard");
        screen.line(&format!("Welcome, {}!", user.name));
        screen.notices(&self.notices);
        screen.blank();
        screen
            .stat("Posted Jobs", self.jobs.len())
            .stat("Total Applications", self.applications.len())
            .stat(
                "Pending Review",
                self.applications
                    .iter()
                    .filter(|a| a.has_status("APPLIED"))
                    .count(),
            );

        screen.section("My Job Posts");
        screen.line("Post New Job: /post-job jobTitle=... companyName=... jobLocation=... deadLineDate=YYYY-MM-DD jobDescription=... [jobType=JOB|INTERNSHIP]");
        if self.jobs.is_empty() {
            screen.line("No job posts yet");
        }
        for job in &self.jobs {
            screen.line(&format!(
                "  #{} {} ({})",
                job.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
                job.job_title.as_deref().unwrap_or("Untitled"),
                job.company_name.as_deref().unwrap_or("-"),
            ));
            screen.line(&format!(
                "      Location: {}  Type: {}  Posted: {}  Deadline: {}  Applications: {}",
                job.job_location.as_deref().unwrap_or("-"),
                job.job_type.as_deref().unwrap_or("-"),
                day(&job.posted_date),
                day(&job.dead_line_date),
                self.applications_for(job.id),
            ));
        }

        screen.section("Applications");
        if self.applications.is_empty() {
            screen.line("No applications yet");
        }
        for app in &self.applications {
            let status = app.status.as_deref().unwrap_or("UNKNOWN");
            screen.line(&format!(
                "  Application #{} for Job ID {}: {} [{}]",
                app.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
                app.job_id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
                status,
                status_badge(status),
            ));
            screen.line(&format!(
                "      Applicant: {}",
                app.employee_email.as_deref().unwrap_or("-")
            ));
        }
        if !self.applications.is_empty() {
            screen.line("Triage: /shortlist <application id>, /reject <application id>");
        }
        screen.finish()
    }
}

/// Publish a new job post owned by `user`
pub fn post_job(client: &ApiClient, user: &User, form: &Form) -> Result<String, ViewError> {
    form.only(JOB_FIELDS)?;
    let today = Local::now().date_naive();
    let posted = match form.get("postedDate") {
        Some(v) if !v.is_empty() => forms::date("postedDate", v)?,
        _ => today,
    };
    let deadline = forms::date("deadLineDate", form.get("deadLineDate").unwrap_or(""))?;
    if deadline < posted {
        return Err(ViewError::Refused(
            "deadLineDate must not be before postedDate".to_string(),
        ));
    }

    let job = NewJobPost {
        job_title: form.required("jobTitle")?,
        company_name: form.required("companyName")?,
        job_location: form.required("jobLocation")?,
        job_type: forms::one_of("jobType", &form.or("jobType", "JOB"), JOB_TYPES)?,
        job_description: form.required("jobDescription")?,
        posted_date: posted.format("%Y-%m-%d").to_string(),
        dead_line_date: deadline.format("%Y-%m-%d").to_string(),
        recruiter_email: user.email.clone(),
    };
    client.jobs().create(&job).or_fail("Failed to post job")?;
    Ok("Job posted successfully!".to_string())
}

/// List applications received for one of the recruiter's own job posts
pub fn applicants(client: &ApiClient, user: &User, job_id: &str) -> Result<String, ViewError> {
    let job_id = forms::id("job id", job_id)?;
    let own = client
        .jobs()
        .by_recruiter(&user.email)
        .or_fail("Error fetching applications")?;
    let Some(job) = own.iter().find(|j| j.id == Some(job_id)) else {
        return Err(ViewError::Refused(format!(
            "Job {} is not one of your posts",
            job_id
        )));
    };
    let applications = client
        .applications()
        .by_job(job_id)
        .or_fail("Error fetching applications")?;

    let mut screen = Screen::new(&format!(
        "Applicants for #{} {}",
        job_id,
        job.job_title.as_deref().unwrap_or("Untitled")
    ));
    if applications.is_empty() {
        screen.line("No applications yet");
    }
    for app in &applications {
        let status = app.status.as_deref().unwrap_or("UNKNOWN");
        screen.line(&format!(
            "  #{} {} {} [{}]",
            app.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
            app.employee_email.as_deref().unwrap_or("-"),
            status,
            status_badge(status),
        ));
        if let Some(resume) = app.resume_url.as_deref().filter(|r| !r.is_empty()) {
            screen.line(&format!("      Resume: {}", resume));
        }
    }
    Ok(screen.finish())
}

/// Move one of the recruiter's applications to a new status
pub fn update_status(
    client: &ApiClient,
    user: &User,
    application_id: &str,
    verdict: Verdict,
) -> Result<String, ViewError> {
    let application_id = forms::id("application id", application_id)?;

    let applications = client
        .applications()
        .by_recruiter(&user.email)
        .or_fail("Failed to update status")?;
    let Some(current) = applications
        .iter()
        .find(|a| a.id == Some(application_id))
    else {
        return Err(ViewError::Refused(format!(
            "Application {} is not one of yours",
            application_id
        )));
    };
    if current.has_status(verdict.status()) {
        return Err(ViewError::Refused(format!(
            "Application {} is already {}",
            application_id,
            verdict.status()
        )));
    }

    client
        .applications()
        .update_status(&StatusUpdate {
            application_id,
            status: verdict.status().to_string(),
        })
        .or_fail("Failed to update status")?;
    Ok("Application status updated!".to_string())
}
