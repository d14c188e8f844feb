//! Typed wrappers over the backend's resource paths.
//!
//! Each resource is a thin borrow of the [`ApiClient`]; obtain one through
//! `client.jobs()`, `client.courses()` and so on.

use super::client::{segment, ApiClient, ApiRequest, Method};
use super::error::ApiError;
use super::models::*;
use super::multipart::{content_type_for, Multipart};
use serde_json::{Map, Value};
use std::path::Path;

pub struct Auth<'a>(&'a ApiClient);
pub struct Dashboard<'a>(&'a ApiClient);
pub struct Jobs<'a>(&'a ApiClient);
pub struct Applications<'a>(&'a ApiClient);
pub struct Employees<'a>(&'a ApiClient);
pub struct Recruiters<'a>(&'a ApiClient);
pub struct Courses<'a>(&'a ApiClient);
pub struct Subscriptions<'a>(&'a ApiClient);
pub struct Files<'a>(&'a ApiClient);
pub struct Notifications<'a>(&'a ApiClient);

impl ApiClient {
    pub fn auth(&self) -> Auth<'_> {
        Auth(self)
    }
    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard(self)
    }
    pub fn jobs(&self) -> Jobs<'_> {
        Jobs(self)
    }
    pub fn applications(&self) -> Applications<'_> {
        Applications(self)
    }
    pub fn employees(&self) -> Employees<'_> {
        Employees(self)
    }
    pub fn recruiters(&self) -> Recruiters<'_> {
        Recruiters(self)
    }
    pub fn courses(&self) -> Courses<'_> {
        Courses(self)
    }
    pub fn subscriptions(&self) -> Subscriptions<'_> {
        Subscriptions(self)
    }
    pub fn files(&self) -> Files<'_> {
        Files(self)
    }
    pub fn notifications(&self) -> Notifications<'_> {
        Notifications(self)
    }
}

impl Auth<'_> {
    pub fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        self.0.post("/auth/register", request)?;
        Ok(())
    }

    pub fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.0.post("/auth/login", request)?.json()
    }
}

impl Dashboard<'_> {
    pub fn job_stats(&self) -> Result<JobStats, ApiError> {
        self.0.get("/dashboard/jobs")?.json_or_default()
    }

    pub fn application_stats(&self) -> Result<ApplicationStats, ApiError> {
        self.0.get("/dashboard/applications")?.json_or_default()
    }

    pub fn user_stats(&self) -> Result<UserStats, ApiError> {
        self.0.get("/dashboard/users")?.json_or_default()
    }
}

impl Jobs<'_> {
    pub fn all(&self) -> Result<Vec<JobPost>, ApiError> {
        self.0.get_list("/jobposts")
    }

    pub fn by_recruiter(&self, email: &str) -> Result<Vec<JobPost>, ApiError> {
        self.0
            .get_list(format!("/jobposts/recruiters/{}", segment(email)))
    }

    pub fn create(&self, job: &NewJobPost) -> Result<(), ApiError> {
        self.0.post("/jobposts", job)?;
        Ok(())
    }

    // The backend serves company, title and location searches from one path.
    fn search(&self, term: &str) -> Result<Vec<JobPost>, ApiError> {
        self.0
            .get_list(format!("/jobposts/search/{}", segment(term)))
    }

    pub fn search_by_company(&self, company: &str) -> Result<Vec<JobPost>, ApiError> {
        self.search(company)
    }

    pub fn search_by_title(&self, title: &str) -> Result<Vec<JobPost>, ApiError> {
        self.search(title)
    }

    pub fn search_by_location(&self, location: &str) -> Result<Vec<JobPost>, ApiError> {
        self.search(location)
    }
}

impl Applications<'_> {
    pub fn apply(&self, request: &ApplyRequest) -> Result<(), ApiError> {
        self.0.post("/applications/apply", request)?;
        Ok(())
    }

    pub fn by_employee(&self, email: &str) -> Result<Vec<Application>, ApiError> {
        self.0
            .get_list(format!("/applications/job/{}", segment(email)))
    }

    /// Same path as [`Self::by_employee`]; the backend keys both on the email.
    pub fn by_recruiter(&self, email: &str) -> Result<Vec<Application>, ApiError> {
        self.0
            .get_list(format!("/applications/job/{}", segment(email)))
    }

    pub fn by_job(&self, job_id: i64) -> Result<Vec<Application>, ApiError> {
        self.0.get_list(format!("/applications/job/{}", job_id))
    }

    pub fn update_status(&self, update: &StatusUpdate) -> Result<(), ApiError> {
        self.0.put("/applications/status", update)?;
        Ok(())
    }
}

impl Employees<'_> {
    pub fn profile(&self, email: &str) -> Result<EmployeeProfile, ApiError> {
        self.0
            .get(format!("/employees/{}", segment(email)))?
            .json_or_default()
    }

    pub fn update(&self, profile: &EmployeeProfile) -> Result<(), ApiError> {
        self.0.post("/employees/update", profile)?;
        Ok(())
    }
}

impl Recruiters<'_> {
    pub fn profile(&self, email: &str) -> Result<RecruiterProfile, ApiError> {
        self.0
            .get(format!("/recruiters/{}", segment(email)))?
            .json_or_default()
    }

    pub fn save(&self, profile: &RecruiterProfile) -> Result<(), ApiError> {
        self.0.post("/recruiters/save", profile)?;
        Ok(())
    }
}

impl Courses<'_> {
    pub fn all(&self) -> Result<Vec<Course>, ApiError> {
        self.0.get_list("/courses")
    }

    pub fn add(&self, course: &NewCourse) -> Result<(), ApiError> {
        self.0.post("/courses/add", course)?;
        Ok(())
    }

    pub fn deactivate(&self, id: i64) -> Result<(), ApiError> {
        self.0.put_empty(format!("/courses/deactivate/{}", id))?;
        Ok(())
    }
}

impl Subscriptions<'_> {
    pub fn create(&self, fields: &Map<String, Value>) -> Result<(), ApiError> {
        self.0.post("/subscriptions", fields)?;
        Ok(())
    }

    pub fn by_user_email(&self, email: &str) -> Result<Vec<Subscription>, ApiError> {
        self.0
            .get_list(format!("/subscriptions/user/email/{}", segment(email)))
    }

    pub fn by_employee(&self, id: i64) -> Result<Vec<Subscription>, ApiError> {
        self.0.get_list(format!("/subscriptions/employee/{}", id))
    }

    pub fn by_recruiter(&self, id: i64) -> Result<Vec<Subscription>, ApiError> {
        self.0.get_list(format!("/subscriptions/recruiter/{}", id))
    }

    pub fn all(&self) -> Result<Vec<Subscription>, ApiError> {
        self.0.get_list("/subscriptions")
    }

    /// Raw invoice bytes, typically a PDF
    pub fn invoice(&self, id: i64) -> Result<Vec<u8>, ApiError> {
        Ok(self.0.get(format!("/subscriptions/invoice/{}", id))?.body)
    }
}

impl Files<'_> {
    /// Upload a resume; returns the URL the backend stored it under
    pub fn upload_resume(&self, filename: &str, data: &[u8]) -> Result<String, ApiError> {
        self.upload("/uploadFiles/resume", filename, data)
    }

    pub fn upload_image(&self, filename: &str, data: &[u8]) -> Result<String, ApiError> {
        self.upload("/uploadFiles/image", filename, data)
    }

    fn upload(&self, path: &str, filename: &str, data: &[u8]) -> Result<String, ApiError> {
        let (content_type, body) = Multipart::new()
            .file("file", filename, content_type_for(Path::new(filename)), data)
            .finish();
        let resp = self
            .0
            .execute(ApiRequest::new(Method::Post, path).raw(content_type, body))?;
        // The backend answers with the bare URL, sometimes JSON-quoted.
        let text = resp.text();
        let url = match serde_json::from_str::<Value>(&text) {
            Ok(Value::String(s)) => s,
            Ok(Value::Object(obj)) => obj
                .get("url")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| text.trim().to_string()),
            _ => text.trim().to_string(),
        };
        Ok(url)
    }
}

impl Notifications<'_> {
    pub fn send_email(&self, email: &EmailRequest) -> Result<(), ApiError> {
        self.0.post("/notifications/email", email)?;
        Ok(())
    }
}
