//! Wire types for the backend. Field names follow the backend's JSON exactly,
//! misspellings included.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub user_name: String,
    pub user_role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Counters and flags the backend may send as `null`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobStats {
    #[serde(deserialize_with = "null_as_default")]
    pub total_jobs: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_internships: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_full_time_jobs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationStats {
    #[serde(deserialize_with = "null_as_default")]
    pub total_applications: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_shortlisted: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_pending: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_rejected: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    #[serde(deserialize_with = "null_as_default")]
    pub total_jobseekers: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_recruiters: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_paid_users: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_block_users: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobPost {
    pub id: Option<i64>,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub job_location: Option<String>,
    pub job_type: Option<String>,
    pub job_description: Option<String>,
    pub posted_date: Option<String>,
    pub dead_line_date: Option<String>,
    pub recruiter_email: Option<String>,
}

impl JobPost {
    /// Case-insensitive match of `term` against title, company or location
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [&self.job_title, &self.company_name, &self.job_location]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJobPost {
    pub job_title: String,
    pub company_name: String,
    pub job_location: String,
    pub job_type: String,
    pub job_description: String,
    pub posted_date: String,
    pub dead_line_date: String,
    pub recruiter_email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Application {
    pub id: Option<i64>,
    pub job_id: Option<i64>,
    pub employee_email: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "resumeURL")]
    pub resume_url: Option<String>,
}

impl Application {
    pub fn has_status(&self, status: &str) -> bool {
        self.status.as_deref() == Some(status)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub job_id: i64,
    pub employee_email: String,
    #[serde(rename = "resumeURL")]
    pub resume_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    #[serde(rename = "applicatiionId")]
    pub application_id: i64,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeeProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub qualification: Option<String>,
    #[serde(rename = "resumeURL")]
    pub resume_url: Option<String>,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    /// Fields the client does not interpret but must send back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecruiterProfile {
    pub recruiter_name: Option<String>,
    pub recruiter_email: Option<String>,
    pub company_name: Option<String>,
    pub recruiter_phone: Option<String>,
    pub designation: Option<String>,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Course {
    pub id: Option<i64>,
    pub course_title: Option<String>,
    pub course_description: Option<String>,
    pub course_catogory: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub course_title: String,
    pub course_description: String,
    pub course_catogory: String,
    pub admin_id: i64,
}

/// Subscription records are shown as-is; the client only relies on `id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Subscription {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_response_decodes() {
        let resp: LoginResponse = serde_json::from_value(json!({
            "token": "t", "userId": 5, "userName": "Ann", "userRole": "ROLE_EMPLOYEE"
        }))
        .unwrap();
        assert_eq!(resp.user_id, 5);
        assert_eq!(resp.user_role, "ROLE_EMPLOYEE");
    }

    #[test]
    fn test_status_update_uses_backend_field_name() {
        let v = serde_json::to_value(StatusUpdate {
            application_id: 9,
            status: "SHORTLISTED".to_string(),
        })
        .unwrap();
        assert_eq!(v, json!({"applicatiionId": 9, "status": "SHORTLISTED"}));
    }

    #[test]
    fn test_new_course_field_names() {
        let v = serde_json::to_value(NewCourse {
            course_title: "Rust".to_string(),
            course_description: "Ownership".to_string(),
            course_catogory: "Programming".to_string(),
            admin_id: 1,
        })
        .unwrap();
        assert_eq!(v["courseCatogory"], "Programming");
        assert_eq!(v["adminId"], 1);
    }

    #[test]
    fn test_job_matches_any_field() {
        let job = JobPost {
            job_title: Some("Backend Engineer".to_string()),
            company_name: Some("Acme".to_string()),
            job_location: Some("Pune".to_string()),
            ..Default::default()
        };
        assert!(job.matches("engineer"));
        assert!(job.matches("ACME"));
        assert!(job.matches("pun"));
        assert!(job.matches(""));
        assert!(!job.matches("berlin"));
    }

    #[test]
    fn test_profile_keeps_unknown_fields() {
        let p: EmployeeProfile = serde_json::from_value(json!({
            "id": 4, "name": "Ann", "resumeURL": "http://r", "skills": ["rust"]
        }))
        .unwrap();
        assert_eq!(p.resume_url.as_deref(), Some("http://r"));
        let back = serde_json::to_value(&p).unwrap();
        assert_eq!(back["id"], 4);
        assert_eq!(back["skills"], json!(["rust"]));
    }

    #[test]
    fn test_stats_default_missing_fields() {
        let s: JobStats = serde_json::from_value(json!({"totalJobs": 3})).unwrap();
        assert_eq!(s.total_jobs, 3);
        assert_eq!(s.total_internships, 0);
    }

    #[test]
    fn test_null_counters_and_flags_read_as_zero() {
        let s: JobStats = serde_json::from_value(json!({
            "totalJobs": 4, "totalInternships": null, "totalFullTimeJobs": 4
        }))
        .unwrap();
        assert_eq!(s.total_jobs, 4);
        assert_eq!(s.total_internships, 0);

        let u: UserStats = serde_json::from_value(json!({"totalPaidUsers": null})).unwrap();
        assert_eq!(u.total_paid_users, 0);

        let c: Course = serde_json::from_value(json!({"id": 2, "active": null})).unwrap();
        assert!(!c.active);
    }
}
