//! Administrator dashboard: platform statistics and the course catalogue.

use super::forms::{self, Form};
use super::{settle, OrFail, Screen, ViewError};
use crate::api::models::{ApplicationStats, Course, JobStats, NewCourse, UserStats};
use crate::api::{ApiClient, ApiError};
use crate::session::User;

const COURSE_FIELDS: &[&str] = &["courseTitle", "courseDescription", "courseCatogory"];

#[derive(Debug, Default)]
pub struct AdminDashboard {
    pub jobs: JobStats,
    pub applications: ApplicationStats,
    pub users: UserStats,
    pub courses: Vec<Course>,
    pub notices: Vec<String>,
}

impl AdminDashboard {
    pub fn load(client: &ApiClient) -> Result<Self, ApiError> {
        let mut notices = Vec::new();
        let loaded = (|| -> Result<_, ApiError> {
            let dashboard = client.dashboard();
            Ok((
                dashboard.job_stats()?,
                dashboard.application_stats()?,
                dashboard.user_stats()?,
                client.courses().all()?,
            ))
        })();
        let (jobs, applications, users, courses) =
            settle(loaded, "Error fetching data", &mut notices)?;
        Ok(Self {
            jobs,
            applications,
            users,
            courses,
            notices,
        })
    }

    pub fn render(&self, user: &User) -> String {
        let mut screen = Screen::new("Admin Dashboard");
        screen.line(&format!("Welcome, {}!", user.name));
        screen.notices(&self.notices);

        screen
            .section("Job Statistics")
            .stat("Total Jobs", self.jobs.total_jobs)
            .stat("Internships", self.jobs.total_internships)
            .stat("Full Time Jobs", self.jobs.total_full_time_jobs);

        screen
            .section("Application Statistics")
            .stat("Total Applications", self.applications.total_applications)
            .stat("Shortlisted", self.applications.total_shortlisted)
            .stat("Pending", self.applications.total_pending)
            .stat("Rejected", self.applications.total_rejected);

        screen
            .section("User Statistics")
            .stat("Job Seekers", self.users.total_jobseekers)
            .stat("Recruiters", self.users.total_recruiters)
            .stat("Paid Users", self.users.total_paid_users)
            .stat("Blocked Users", self.users.total_block_users);

        screen.section("Course Management");
        screen.line("Add Course: /add-course courseTitle=... courseCatogory=... courseDescription=...");
        if self.courses.is_empty() {
            screen.line("No courses yet");
        }
        for course in &self.courses {
            let state = if course.active { "Active" } else { "Inactive" };
            screen.line(&format!(
                "  #{} {} [{}] ({})",
                course.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
                course.course_title.as_deref().unwrap_or("Untitled"),
                course.course_catogory.as_deref().unwrap_or("-"),
                state,
            ));
            if let Some(desc) = &course.course_description {
                screen.line(&format!("      {}", desc));
            }
            if course.active {
                screen.line("      Deactivate: /deactivate-course <course id>");
            }
        }
        screen.finish()
    }
}

pub fn add_course(client: &ApiClient, user: &User, form: &Form) -> Result<String, ViewError> {
    form.only(COURSE_FIELDS)?;
    let course = NewCourse {
        course_title: form.required("courseTitle")?,
        course_description: form.required("courseDescription")?,
        course_catogory: form.required("courseCatogory")?,
        admin_id: user.id,
    };
    client.courses().add(&course).or_fail("Failed to add course")?;
    Ok("Course added successfully!".to_string())
}

/// Look up an active course before asking the user to confirm deactivation
pub fn find_active_course(client: &ApiClient, id: &str) -> Result<Course, ViewError> {
    let id = forms::id("course id", id)?;
    let courses = client.courses().all().or_fail("Failed to deactivate course")?;
    match courses.into_iter().find(|c| c.id == Some(id)) {
        Some(course) if course.active => Ok(course),
        Some(_) => Err(ViewError::Refused(format!(
            "Course {} is already inactive",
            id
        ))),
        None => Err(ViewError::Refused(format!("No course with id {}", id))),
    }
}

pub fn deactivate_course(client: &ApiClient, course: &Course) -> Result<String, ViewError> {
    let Some(id) = course.id else {
        return Err(ViewError::Refused("Course has no id".to_string()));
    };
    client
        .courses()
        .deactivate(id)
        .or_fail("Failed to deactivate course")?;
    Ok("Course deactivated successfully!".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::testing::FakeTransport;
    use crate::api::client::{Body, Method};
    use crate::session::Role;
    use serde_json::json;

    fn admin() -> User {
        User {
            id: 1,
            name: "Root".to_string(),
            email: "root@example.com".to_string(),
            role: Role::Admin,
        }
    }

    fn client(t: &FakeTransport) -> ApiClient {
        ApiClient::new("http://x/api", Box::new(t.clone()))
    }

    #[test]
    fn test_load_fans_in_all_sources() {
        let t = FakeTransport::new();
        t.reply_json(200, json!({"totalJobs": 12, "totalInternships": 4, "totalFullTimeJobs": 8}))
            .reply_json(200, json!({"totalApplications": 30, "totalPending": 10}))
            .reply_json(200, json!({"totalJobseekers": 100, "totalRecruiters": 9}))
            .reply_json(
                200,
                json!([
                    {"id": 1, "courseTitle": "Rust", "courseCatogory": "Programming", "active": true},
                    {"id": 2, "courseTitle": "COBOL", "courseCatogory": "Legacy", "active": false}
                ]),
            );
        let dash = AdminDashboard::load(&client(&t)).unwrap();
        assert_eq!(
            t.paths(),
            vec![
                "/dashboard/jobs",
                "/dashboard/applications",
                "/dashboard/users",
                "/courses"
            ]
        );
        let text = dash.render(&admin());
        assert!(text.contains("Total Jobs"));
        assert!(text.contains("12"));
        assert!(text.contains("#1 Rust [Programming] (Active)"));
        assert!(text.contains("#2 COBOL [Legacy] (Inactive)"));
    }

    #[test]
    fn test_one_failed_source_fails_whole_load() {
        let t = FakeTransport::new();
        t.reply_json(200, json!({"totalJobs": 12})).fail("timed out");
        let dash = AdminDashboard::load(&client(&t)).unwrap();
        assert_eq!(dash.jobs.total_jobs, 0);
        assert_eq!(dash.notices.len(), 1);
    }

    #[test]
    fn test_null_stats_keep_the_dashboard() {
        let t = FakeTransport::new();
        t.reply_json(200, json!({"totalJobs": 4, "totalInternships": null, "totalFullTimeJobs": 4}))
            .reply_json(200, json!({"totalApplications": 2, "totalRejected": null}))
            .reply_json(200, json!({"totalJobseekers": 5, "totalBlockUsers": null}))
            .reply_json(200, json!([{"id": 1, "courseTitle": "Rust", "active": null}]));
        let dash = AdminDashboard::load(&client(&t)).unwrap();
        assert!(dash.notices.is_empty());
        assert_eq!(dash.jobs.total_jobs, 4);
        assert_eq!(dash.jobs.total_internships, 0);
        assert!(dash.render(&admin()).contains("#1 Rust"));
        assert_eq!(t.sent.borrow().len(), 4);
    }

    #[test]
    fn test_add_course_uses_admin_id() {
        let t = FakeTransport::new();
        t.reply(200, "");
        let form = Form::parse(&[
            "courseTitle=Rust",
            "courseDescription=Ownership and borrowing",
            "courseCatogory=Programming",
        ])
        .unwrap();
        add_course(&client(&t), &admin(), &form).unwrap();
        assert_eq!(
            t.last().body,
            Body::Json(json!({
                "courseTitle": "Rust",
                "courseDescription": "Ownership and borrowing",
                "courseCatogory": "Programming",
                "adminId": 1
            }))
        );
    }

    #[test]
    fn test_deactivate_only_active_courses() {
        let t = FakeTransport::new();
        let courses = json!([
            {"id": 1, "courseTitle": "Rust", "active": true},
            {"id": 2, "courseTitle": "COBOL", "active": false}
        ]);
        t.reply_json(200, courses.clone())
            .reply_json(200, courses.clone())
            .reply_json(200, courses)
            .reply(200, "");
        let c = client(&t);
        assert!(find_active_course(&c, "2").is_err());
        assert!(find_active_course(&c, "3").is_err());
        let course = find_active_course(&c, "1").unwrap();
        deactivate_course(&c, &course).unwrap();
        let last = t.last();
        assert_eq!(last.method, Method::Put);
        assert_eq!(last.path, "/courses/deactivate/1");
    }
}
